//! Memory-augmented chat endpoint
//!
//! One round trip: resolve the session, persist the user message, retrieve
//! memory context, assemble the prompt from listed history, complete, and
//! persist the assistant reply.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use memgate_ai::{CompletionRequest, Role, Turn, TurnContent, Window};
use memgate_client::{ListMessagesQuery, MemoryQuery, NewMessage};

use crate::api::error::ApiError;
use crate::api::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(rename = "memoryID", default)]
    pub memory_id: Option<String>,
    #[serde(rename = "customerUserID", default)]
    pub customer_user_id: Option<String>,
    #[serde(rename = "sessionID", default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(default = "default_assisted")]
    pub assisted: bool,
}

fn default_assisted() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(rename = "sessionID")]
    pub session_id: String,
}

pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let (Some(content), Some(memory_id), Some(customer_user_id)) = (
        request.content.filter(|v| !v.is_empty()),
        request.memory_id.filter(|v| !v.is_empty()),
        request.customer_user_id.filter(|v| !v.is_empty()),
    ) else {
        return Err(ApiError::bad_request(
            "Missing required parameters: content, memoryID, or customerUserID",
        ));
    };

    // Reuse the caller's session when it still exists, otherwise create one.
    let mut session = None;
    if let Some(id) = request.session_id.as_deref().filter(|id| !id.is_empty()) {
        session = state.memory.get_session(id).await?;
    }
    let session = match session {
        Some(session) => session,
        None => {
            state
                .memory
                .create_session(&customer_user_id, request.metadata)
                .await?
        }
    };
    let session_id = session.id;
    tracing::debug!(%session_id, "chat session resolved");

    let user_message = NewMessage::new(content.clone(), "user", session_id.clone())
        .with_customer(customer_user_id.clone());
    state.memory.create_message(&user_message).await?;

    let retrieval = state
        .memory
        .retrieve_memory(
            &MemoryQuery::new(content)
                .with_memory_id(memory_id)
                .assisted(request.assisted),
        )
        .await?;

    // Listed pages arrive newest first; the prompt wants oldest first.
    let mut page = state
        .memory
        .list_messages(&ListMessagesQuery::new().with_session(session_id.clone()))
        .await?;
    page.messages.sort_by_key(|message| message.updated_at);

    let history = page
        .messages
        .into_iter()
        .map(|message| {
            Turn::new(
                Role::from(message.role.as_deref().unwrap_or("user")),
                Some(TurnContent::from(message.content.unwrap_or_default())),
            )
        })
        .collect();

    let window = Window::new(state.memory.clone())
        .with_system_prompt(retrieval.payload.unwrap_or_default())
        .with_history(history);

    let completion = state
        .llm
        .complete(CompletionRequest::from_window(&window))
        .await?;
    let response = completion.content.unwrap_or_default();

    let assistant_message = NewMessage::new(response.clone(), "assistant", session_id.clone())
        .with_customer(customer_user_id);
    state.memory.create_message(&assistant_message).await?;

    Ok(Json(ChatResponse {
        response,
        session_id,
    }))
}
