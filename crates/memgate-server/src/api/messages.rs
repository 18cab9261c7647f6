//! Message listing endpoint
//!
//! Requires a session or customer filter, validates the role, and degrades
//! bad limits to the default instead of rejecting them. When both pagination
//! cursors arrive the forward cursor wins.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use memgate_client::{ClientError, ListMessagesQuery, MessageRecord};

use crate::api::error::ApiError;
use crate::api::state::AppState;

const VALID_ROLES: [&str; 3] = ["user", "assistant", "system"];

#[derive(Debug, Deserialize)]
pub struct ListMessagesParams {
    #[serde(rename = "sessionID", default)]
    pub session_id: Option<String>,
    #[serde(rename = "customerUserID", default)]
    pub customer_user_id: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    /// Kept as text so junk and out-of-range values degrade to the default.
    #[serde(default)]
    pub limit: Option<String>,
    #[serde(rename = "nextToken", default)]
    pub next_token: Option<String>,
    #[serde(rename = "previousToken", default)]
    pub previous_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListMessagesResponse {
    pub messages: Vec<MessageRecord>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct Pagination {
    #[serde(rename = "nextToken")]
    pub next_token: Option<String>,
    #[serde(rename = "previousToken")]
    pub previous_token: Option<String>,
    #[serde(rename = "totalCount")]
    pub total_count: u64,
}

fn parse_limit(raw: Option<&str>) -> u32 {
    let Some(raw) = raw else {
        return ListMessagesQuery::DEFAULT_LIMIT;
    };
    match raw.parse::<i64>() {
        Ok(limit) if (1..=100).contains(&limit) => limit as u32,
        _ => ListMessagesQuery::DEFAULT_LIMIT,
    }
}

pub async fn list_messages(
    State(state): State<AppState>,
    Query(params): Query<ListMessagesParams>,
) -> Result<Json<ListMessagesResponse>, ApiError> {
    let session_id = params.session_id.filter(|v| !v.is_empty());
    let customer_user_id = params.customer_user_id.filter(|v| !v.is_empty());
    if session_id.is_none() && customer_user_id.is_none() {
        return Err(ApiError::bad_request(
            "Either sessionID or customerUserID must be provided",
        ));
    }

    let role = params.role.filter(|v| !v.is_empty());
    if let Some(role) = role.as_deref()
        && !VALID_ROLES.contains(&role)
    {
        return Err(ApiError::bad_request(
            "Invalid role. Must be one of: user, assistant, system",
        ));
    }

    let next_token = params.next_token.filter(|v| !v.is_empty());
    let mut previous_token = params.previous_token.filter(|v| !v.is_empty());
    if next_token.is_some() {
        previous_token = None;
    }

    let mut query = ListMessagesQuery::new().with_limit(parse_limit(params.limit.as_deref()));
    if let Some(session_id) = session_id {
        query = query.with_session(session_id);
    }
    if let Some(customer_user_id) = customer_user_id {
        query = query.with_customer(customer_user_id);
    }
    if let Some(role) = role {
        query = query.with_role(role);
    }
    if let Some(token) = next_token {
        query = query.with_next_token(token);
    }
    if let Some(token) = previous_token {
        query = query.with_previous_token(token);
    }

    match state.memory.list_messages(&query).await {
        Ok(page) => Ok(Json(ListMessagesResponse {
            messages: page.messages,
            pagination: Pagination {
                next_token: page.next_token,
                previous_token: page.previous_token,
                total_count: page.total_count,
            },
        })),
        Err(ClientError::Api { status, message }) => Err(ApiError::upstream(status, message)),
        Err(err) => Err(ApiError::internal(format!("Internal server error: {err}"))),
    }
}
