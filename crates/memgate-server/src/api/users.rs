//! User creation endpoint
//!
//! Validates the request before it reaches the memory service and passes
//! upstream error statuses through unchanged.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::Value;

use memgate_client::{ClientError, NewUser};

use crate::api::error::ApiError;
use crate::api::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    #[serde(rename = "firstName", default)]
    pub first_name: Option<String>,
    #[serde(rename = "lastName", default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

fn valid_email(email: &str) -> bool {
    if !email.contains('@') {
        return false;
    }
    // Only the segment between the first two '@'s counts as the domain.
    email
        .split('@')
        .nth(1)
        .is_some_and(|domain| domain.contains('.'))
}

fn valid_phone(phone: &str) -> bool {
    let stripped: String = phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '+'))
        .collect();
    stripped.len() >= 10
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<Json<Value>, ApiError> {
    let (Some(first_name), Some(last_name)) = (
        request.first_name.filter(|v| !v.is_empty()),
        request.last_name.filter(|v| !v.is_empty()),
    ) else {
        return Err(ApiError::bad_request(
            "Missing required fields: firstName and lastName are required",
        ));
    };

    if let Some(email) = request.email.as_deref()
        && !email.is_empty()
        && !valid_email(email)
    {
        return Err(ApiError::bad_request("Invalid email format"));
    }

    if let Some(phone) = request.phone.as_deref()
        && !phone.is_empty()
        && !valid_phone(phone)
    {
        return Err(ApiError::bad_request(
            "Invalid phone format. Must be at least 10 digits",
        ));
    }

    let mut user = NewUser::new(first_name, last_name);
    if let Some(id) = request.id.filter(|v| !v.is_empty()) {
        user = user.with_id(id);
    }
    if let Some(email) = request.email.filter(|v| !v.is_empty()) {
        user = user.with_email(email);
    }
    if let Some(phone) = request.phone.filter(|v| !v.is_empty()) {
        user = user.with_phone(phone);
    }

    match state.memory.create_user(&user).await {
        Ok(response) => Ok(Json(response)),
        Err(ClientError::Api { status, message }) => Err(ApiError::upstream(status, message)),
        Err(err) => Err(ApiError::internal(format!("Internal server error: {err}"))),
    }
}
