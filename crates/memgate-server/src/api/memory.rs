//! Direct memory query endpoint
//!
//! Always answers with the same envelope so callers can branch on `success`
//! without inspecting status codes.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use memgate_client::{Fact, MemoryQuery};

use crate::api::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MemoryQueryRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(rename = "memoryID", default)]
    pub memory_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MemoryQueryResponse {
    pub success: bool,
    pub message: String,
    pub answer: String,
    pub facts: Vec<Fact>,
}

impl MemoryQueryResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            answer: String::new(),
            facts: Vec::new(),
        }
    }
}

pub async fn query_memory(
    State(state): State<AppState>,
    Json(request): Json<MemoryQueryRequest>,
) -> (StatusCode, Json<MemoryQueryResponse>) {
    let Some(query) = request.query.filter(|q| !q.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(MemoryQueryResponse::failure("Query parameter is required")),
        );
    };

    let mut memory_query = MemoryQuery::new(query).with_facts(true);
    if let Some(memory_id) = request.memory_id.filter(|id| !id.is_empty()) {
        memory_query = memory_query.with_memory_id(memory_id);
    }

    match state.memory.retrieve_memory(&memory_query).await {
        Ok(retrieval) => (
            StatusCode::OK,
            Json(MemoryQueryResponse {
                success: true,
                message: "Query executed successfully.".to_string(),
                answer: retrieval.payload.unwrap_or_default(),
                facts: retrieval.facts,
            }),
        ),
        Err(err) => {
            tracing::error!(error = %err, "memory query failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(MemoryQueryResponse::failure(format!("Error: {err}"))),
            )
        }
    }
}
