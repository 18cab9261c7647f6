//! Integration tests for the memory service client

use memgate_client::{
    ClientError, ListMessagesQuery, MemoryClient, MemoryQuery, MemoryRetriever, NewMessage, NewUser,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn disable_system_proxy_for_tests() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        // Safety: set once for the process before any HTTP clients are built.
        unsafe {
            std::env::set_var("MEMGATE_DISABLE_SYSTEM_PROXY", "1");
        }
    });
}

#[tokio::test]
async fn get_session_decodes_envelope() {
    disable_system_proxy_for_tests();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sessions/get/sess-1"))
        .and(header("X-API-Key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": {
                "id": "sess-1",
                "customerUserID": "cust-1",
                "createdAt": "2024-05-01T12:00:00Z"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = MemoryClient::new("test-key").with_base_url(server.uri());
    let session = client.get_session("sess-1").await.unwrap().unwrap();

    assert_eq!(session.id, "sess-1");
    assert_eq!(session.customer_user_id.as_deref(), Some("cust-1"));
    assert!(session.created_at.is_some());
}

#[tokio::test]
async fn get_session_treats_404_as_absent() {
    disable_system_proxy_for_tests();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sessions/get/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "status": "error",
            "message": "session not found"
        })))
        .mount(&server)
        .await;

    let client = MemoryClient::new("test-key").with_base_url(server.uri());
    assert!(client.get_session("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn get_session_treats_transport_failure_as_absent() {
    disable_system_proxy_for_tests();
    // Nothing listens here; the connection is refused.
    let client = MemoryClient::new("test-key").with_base_url("http://127.0.0.1:1");
    assert!(client.get_session("sess-1").await.unwrap().is_none());
}

#[tokio::test]
async fn create_session_posts_customer_user_id() {
    disable_system_proxy_for_tests();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sessions/create"))
        .and(header("X-API-Key", "test-key"))
        .and(body_json(json!({ "customerUserID": "cust-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": { "id": "sess-new", "customerUserID": "cust-1" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = MemoryClient::new("test-key").with_base_url(server.uri());
    let session = client.create_session("cust-1", None).await.unwrap();
    assert_eq!(session.id, "sess-new");
}

#[tokio::test]
async fn create_session_includes_metadata_when_given() {
    disable_system_proxy_for_tests();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sessions/create"))
        .and(body_json(json!({
            "customerUserID": "cust-1",
            "metadata": { "channel": "voice" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": { "id": "sess-new" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = MemoryClient::new("test-key").with_base_url(server.uri());
    client
        .create_session("cust-1", Some(json!({ "channel": "voice" })))
        .await
        .unwrap();
}

#[tokio::test]
async fn create_message_round_trips_record() {
    disable_system_proxy_for_tests();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/messages/create"))
        .and(body_json(json!({
            "content": "hello",
            "role": "user",
            "sessionID": "sess-1",
            "customerUserID": "cust-1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": {
                "id": "msg-1",
                "content": "hello",
                "role": "user",
                "sessionID": "sess-1"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = MemoryClient::new("test-key").with_base_url(server.uri());
    let message = NewMessage::new("hello", "user", "sess-1").with_customer("cust-1");
    let record = client.create_message(&message).await.unwrap();

    assert_eq!(record.id.as_deref(), Some("msg-1"));
    assert_eq!(record.role.as_deref(), Some("user"));
}

#[tokio::test]
async fn list_messages_sends_filters_and_decodes_page() {
    disable_system_proxy_for_tests();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/messages/list"))
        .and(query_param("sessionID", "sess-1"))
        .and(query_param("limit", "5"))
        .and(query_param("nextToken", "tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": {
                "messages": [
                    { "id": "msg-1", "content": "hi", "role": "user" },
                    { "id": "msg-2", "content": "hello", "role": "assistant" }
                ],
                "nextToken": "tok-2",
                "totalCount": 12
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = MemoryClient::new("test-key").with_base_url(server.uri());
    let query = ListMessagesQuery::new()
        .with_session("sess-1")
        .with_limit(5)
        .with_next_token("tok-1");
    let page = client.list_messages(&query).await.unwrap();

    assert_eq!(page.messages.len(), 2);
    assert_eq!(page.next_token.as_deref(), Some("tok-2"));
    assert!(page.previous_token.is_none());
    assert_eq!(page.total_count, 12);
}

#[tokio::test]
async fn retrieve_memory_decodes_bare_object() {
    disable_system_proxy_for_tests();
    let server = MockServer::start().await;

    // The retrieval endpoint answers with the object itself, no envelope.
    Mock::given(method("GET"))
        .and(path("/memory/"))
        .and(query_param("query", "who called"))
        .and(query_param("memoryID", "mem-1"))
        .and(query_param("assisted", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "payload": "Alice called on Tuesday.",
            "facts": [{ "text": "Alice called", "relevance": 0.92 }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = MemoryClient::new("test-key").with_base_url(server.uri());
    let query = MemoryQuery::new("who called").with_memory_id("mem-1");
    let retrieval = client.retrieve_memory(&query).await.unwrap();

    assert_eq!(retrieval.payload_text(), Some("Alice called on Tuesday."));
    assert_eq!(retrieval.facts.len(), 1);
}

#[tokio::test]
async fn retriever_trait_delegates_to_memory_endpoint() {
    disable_system_proxy_for_tests();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/memory/"))
        .and(query_param("query", "recent orders"))
        .and(query_param("memoryID", "mem-2"))
        .and(query_param("assisted", "false"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "payload": "two orders" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = MemoryClient::new("test-key").with_base_url(server.uri());
    let retrieval = client
        .retrieve("recent orders", "mem-2", false)
        .await
        .unwrap();
    assert_eq!(retrieval.payload_text(), Some("two orders"));
}

#[tokio::test]
async fn create_user_passes_response_through() {
    disable_system_proxy_for_tests();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users/create"))
        .and(body_json(json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "ada@example.com"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": { "id": "user-1", "firstName": "Ada" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = MemoryClient::new("test-key").with_base_url(server.uri());
    let user = NewUser::new("Ada", "Lovelace").with_email("ada@example.com");
    let response = client.create_user(&user).await.unwrap();

    assert_eq!(response["data"]["id"], "user-1");
}

#[tokio::test]
async fn api_errors_carry_upstream_status_and_message() {
    disable_system_proxy_for_tests();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/messages/create"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "status": "error",
            "message": "content is required"
        })))
        .mount(&server)
        .await;

    let client = MemoryClient::new("test-key").with_base_url(server.uri());
    let message = NewMessage::new("", "user", "sess-1");
    let err = client.create_message(&message).await.unwrap_err();

    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 422);
            assert_eq!(message, "content is required");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn api_errors_fall_back_to_raw_body() {
    disable_system_proxy_for_tests();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/messages/list"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let client = MemoryClient::new("test-key").with_base_url(server.uri());
    let err = client
        .list_messages(&ListMessagesQuery::new())
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert!(err.to_string().contains("upstream exploded"));
}

#[tokio::test]
async fn long_multibyte_error_bodies_truncate_cleanly() {
    disable_system_proxy_for_tests();
    let server = MockServer::start().await;

    // A two-byte char straddles the 512-byte truncation point.
    let body = format!("{}é{}", "a".repeat(511), "b".repeat(100));
    Mock::given(method("GET"))
        .and(path("/messages/list"))
        .respond_with(ResponseTemplate::new(500).set_body_string(body))
        .mount(&server)
        .await;

    let client = MemoryClient::new("test-key").with_base_url(server.uri());
    let err = client
        .list_messages(&ListMessagesQuery::new())
        .await
        .unwrap_err();

    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, format!("{}... [truncated]", "a".repeat(511)));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}
