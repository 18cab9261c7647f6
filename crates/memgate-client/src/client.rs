//! Memory service REST client.

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ClientError, Result};
use crate::http_client::build_http_client;
use crate::types::{Envelope, MessageRecord, MessagesPage, NewMessage, NewUser, Retrieval, Session};

/// Default base URL of the hosted memory service.
pub const DEFAULT_BASE_URL: &str = "https://api.duohub.ai";

const API_KEY_HEADER: &str = "X-API-Key";

// Truncate error bodies to prevent leaking large or sensitive responses.
const MAX_ERROR_BODY: usize = 512;

/// Cap an error body at `MAX_ERROR_BODY` bytes, cutting on a char boundary.
fn truncate_body(body: String) -> String {
    if body.len() <= MAX_ERROR_BODY {
        return body;
    }
    let mut cut = MAX_ERROR_BODY;
    while !body.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}... [truncated]", &body[..cut])
}

/// Parameters for a memory retrieval call.
#[derive(Debug, Clone)]
pub struct MemoryQuery {
    query: String,
    memory_id: Option<String>,
    assisted: bool,
    facts: bool,
}

impl MemoryQuery {
    /// Create a retrieval query; assisted mode is on by default.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            memory_id: None,
            assisted: true,
            facts: false,
        }
    }

    /// Scope the retrieval to one memory graph.
    pub fn with_memory_id(mut self, memory_id: impl Into<String>) -> Self {
        self.memory_id = Some(memory_id.into());
        self
    }

    /// Toggle assisted retrieval.
    pub fn assisted(mut self, assisted: bool) -> Self {
        self.assisted = assisted;
        self
    }

    /// Request supporting facts alongside the payload.
    pub fn with_facts(mut self, facts: bool) -> Self {
        self.facts = facts;
        self
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("query", self.query.clone())];
        if let Some(memory_id) = &self.memory_id {
            params.push(("memoryID", memory_id.clone()));
        }
        params.push(("assisted", self.assisted.to_string()));
        if self.facts {
            params.push(("facts", "true".to_string()));
        }
        params
    }
}

/// Filters and pagination cursors for listing messages.
#[derive(Debug, Clone)]
pub struct ListMessagesQuery {
    session_id: Option<String>,
    customer_user_id: Option<String>,
    role: Option<String>,
    limit: u32,
    next_token: Option<String>,
    previous_token: Option<String>,
}

impl Default for ListMessagesQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl ListMessagesQuery {
    /// Page size used when the caller does not set one.
    pub const DEFAULT_LIMIT: u32 = 20;

    pub fn new() -> Self {
        Self {
            session_id: None,
            customer_user_id: None,
            role: None,
            limit: Self::DEFAULT_LIMIT,
            next_token: None,
            previous_token: None,
        }
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_customer(mut self, customer_user_id: impl Into<String>) -> Self {
        self.customer_user_id = Some(customer_user_id.into());
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_next_token(mut self, token: impl Into<String>) -> Self {
        self.next_token = Some(token.into());
        self
    }

    pub fn with_previous_token(mut self, token: impl Into<String>) -> Self {
        self.previous_token = Some(token.into());
        self
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(session_id) = &self.session_id {
            params.push(("sessionID", session_id.clone()));
        }
        if let Some(customer_user_id) = &self.customer_user_id {
            params.push(("customerUserID", customer_user_id.clone()));
        }
        if let Some(role) = &self.role {
            params.push(("role", role.clone()));
        }
        params.push(("limit", self.limit.to_string()));
        if let Some(token) = &self.next_token {
            params.push(("nextToken", token.clone()));
        }
        if let Some(token) = &self.previous_token {
            params.push(("previousToken", token.clone()));
        }
        params
    }
}

/// Client for the memory service REST API.
///
/// Covers sessions, messages, users, and memory retrieval. Every request
/// authenticates with a per-request `X-API-Key` header.
#[derive(Debug, Clone)]
pub struct MemoryClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl MemoryClient {
    /// Create a client against the hosted service.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: build_http_client(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
        }
    }

    /// Point the client at a different deployment.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Look up a session. Any failure reads as "no session": the chat flow
    /// falls back to creating one rather than surfacing lookup errors.
    pub async fn get_session(&self, session_id: &str) -> Result<Option<Session>> {
        let request = self
            .http
            .get(self.url(&format!("/sessions/get/{session_id}")))
            .header(API_KEY_HEADER, &self.api_key);

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::debug!(error = %err, session_id, "session lookup failed");
                return Ok(None);
            }
        };

        if !response.status().is_success() {
            return Ok(None);
        }

        match response.json::<Envelope<Session>>().await {
            Ok(envelope) => Ok(Some(envelope.data)),
            Err(err) => {
                tracing::debug!(error = %err, session_id, "session payload did not decode");
                Ok(None)
            }
        }
    }

    /// Create a session for a customer user.
    pub async fn create_session(
        &self,
        customer_user_id: &str,
        metadata: Option<Value>,
    ) -> Result<Session> {
        let mut body = serde_json::json!({ "customerUserID": customer_user_id });
        if let Some(metadata) = metadata {
            body["metadata"] = metadata;
        }

        let response = self
            .http
            .post(self.url("/sessions/create"))
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await?;

        let envelope: Envelope<Session> = Self::decode(response).await?;
        Ok(envelope.data)
    }

    /// Persist one message.
    pub async fn create_message(&self, message: &NewMessage) -> Result<MessageRecord> {
        let response = self
            .http
            .post(self.url("/messages/create"))
            .header(API_KEY_HEADER, &self.api_key)
            .json(message)
            .send()
            .await?;

        let envelope: Envelope<MessageRecord> = Self::decode(response).await?;
        Ok(envelope.data)
    }

    /// List messages matching the query.
    pub async fn list_messages(&self, query: &ListMessagesQuery) -> Result<MessagesPage> {
        let response = self
            .http
            .get(self.url("/messages/list"))
            .header(API_KEY_HEADER, &self.api_key)
            .query(&query.params())
            .send()
            .await?;

        let envelope: Envelope<MessagesPage> = Self::decode(response).await?;
        Ok(envelope.data)
    }

    /// Query the memory graph.
    pub async fn retrieve_memory(&self, query: &MemoryQuery) -> Result<Retrieval> {
        let response = self
            .http
            .get(self.url("/memory/"))
            .header(API_KEY_HEADER, &self.api_key)
            .query(&query.params())
            .send()
            .await?;

        Self::decode(response).await
    }

    /// Create a user. The service response passes through untyped so callers
    /// can forward it verbatim.
    pub async fn create_user(&self, user: &NewUser) -> Result<Value> {
        let response = self
            .http
            .post(self.url("/users/create"))
            .header(API_KEY_HEADER, &self.api_key)
            .json(user)
            .send()
            .await?;

        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        Ok(response.json().await?)
    }

    /// Turn a non-success response into an `Api` error, preferring the
    /// service's own `message`/`error` field over the raw body.
    async fn api_error(response: Response) -> ClientError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|value| {
                value
                    .get("message")
                    .or_else(|| value.get("error"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_else(|| truncate_body(body));

        ClientError::Api { status, message }
    }
}
