//! Wire types for the memory service REST API.
//!
//! The service envelopes most payloads as `{ "status": ..., "data": ... }`;
//! the memory retrieval endpoint returns its object directly. Field names on
//! the wire use the service's `...ID` casing, which `rename_all = "camelCase"`
//! cannot produce, so the renames are spelled out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Response envelope wrapping the actual payload under `data`.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub status: Option<String>,
    pub data: T,
}

/// A conversation session owned by the memory service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    #[serde(
        rename = "organisationID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub organisation_id: Option<String>,
    #[serde(
        rename = "customerUserID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub customer_user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(rename = "endedAt", default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
}

/// One stored message as the message endpoints return it.
///
/// `role` is a plain string passed through without validation, and fields this
/// client does not model survive a round-trip via `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(
        rename = "sessionID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub session_id: Option<String>,
    #[serde(
        rename = "customerUserID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub customer_user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One page of listed messages with pagination cursors.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessagesPage {
    #[serde(default)]
    pub messages: Vec<MessageRecord>,
    #[serde(rename = "nextToken", default)]
    pub next_token: Option<String>,
    #[serde(rename = "previousToken", default)]
    pub previous_token: Option<String>,
    #[serde(rename = "totalCount", default)]
    pub total_count: u64,
}

/// Result of a memory retrieval call.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Retrieval {
    #[serde(default)]
    pub payload: Option<String>,
    #[serde(default)]
    pub facts: Vec<Fact>,
}

impl Retrieval {
    /// Payload text, treating an absent or empty payload as "no context".
    pub fn payload_text(&self) -> Option<&str> {
        self.payload.as_deref().filter(|payload| !payload.is_empty())
    }
}

/// A supporting fact returned alongside a retrieval payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fact {
    pub text: String,
    #[serde(default)]
    pub relevance: f64,
}

/// Payload for persisting one message.
#[derive(Debug, Clone, Serialize)]
pub struct NewMessage {
    pub content: String,
    pub role: String,
    #[serde(rename = "sessionID")]
    pub session_id: String,
    #[serde(
        rename = "customerUserID",
        skip_serializing_if = "Option::is_none"
    )]
    pub customer_user_id: Option<String>,
}

impl NewMessage {
    /// Message payload without a customer user attribution.
    pub fn new(
        content: impl Into<String>,
        role: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            content: content.into(),
            role: role.into(),
            session_id: session_id.into(),
            customer_user_id: None,
        }
    }

    /// Attribute the message to a customer user.
    pub fn with_customer(mut self, customer_user_id: impl Into<String>) -> Self {
        self.customer_user_id = Some(customer_user_id.into());
        self
    }
}

/// Payload for creating a user.
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl NewUser {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            id: None,
            email: None,
            phone: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}
