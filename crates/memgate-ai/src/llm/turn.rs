//! Chat turn types shared by the window and the provider clients.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{AiError, Result};

/// Chat turn role.
///
/// Unknown roles are carried verbatim rather than rejected; stored history can
/// contain roles this crate does not model yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
            Role::Other(role) => role,
        }
    }
}

impl From<&str> for Role {
    fn from(role: &str) -> Self {
        match role {
            "system" => Role::System,
            "user" => Role::User,
            "assistant" => Role::Assistant,
            "tool" => Role::Tool,
            other => Role::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let role = String::deserialize(deserializer)?;
        Ok(Role::from(role.as_str()))
    }
}

/// Bytes of binary content shown before the ellipsis marker.
const BINARY_PREVIEW_BYTES: usize = 8;

/// Content of one chat turn.
///
/// Binary content (audio buffers and the like) never serializes as raw bytes:
/// it renders as a short hex preview so transport and log output stay bounded.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnContent {
    Text(String),
    Binary(Vec<u8>),
    /// Structured content (e.g. multimodal parts) passed through untouched.
    Data(Value),
}

impl TurnContent {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            TurnContent::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Text rendering for logs. Binary renders as its preview, structured
    /// content as compact JSON.
    pub fn display_text(&self) -> String {
        match self {
            TurnContent::Text(text) => text.clone(),
            TurnContent::Binary(bytes) => Self::preview(bytes),
            TurnContent::Data(value) => value.to_string(),
        }
    }

    fn preview(bytes: &[u8]) -> String {
        let end = bytes.len().min(BINARY_PREVIEW_BYTES);
        format!("{}...", hex::encode(&bytes[..end]))
    }
}

impl From<&str> for TurnContent {
    fn from(text: &str) -> Self {
        TurnContent::Text(text.to_string())
    }
}

impl From<String> for TurnContent {
    fn from(text: String) -> Self {
        TurnContent::Text(text)
    }
}

impl Serialize for TurnContent {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            TurnContent::Text(text) => serializer.serialize_str(text),
            TurnContent::Binary(bytes) => serializer.serialize_str(&Self::preview(bytes)),
            TurnContent::Data(value) => value.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for TurnContent {
    fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::String(text) => TurnContent::Text(text),
            other => TurnContent::Data(other),
        })
    }
}

/// One unit of conversation. Immutable once appended to a window.
///
/// Fields this crate does not model (tool call ids, provider extensions) ride
/// along in `extra` and survive serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<TurnContent>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Turn {
    pub fn new(role: Role, content: Option<TurnContent>) -> Self {
        Self {
            role,
            content,
            extra: Map::new(),
        }
    }

    /// Create a system turn
    pub fn system(content: impl Into<TurnContent>) -> Self {
        Self::new(Role::System, Some(content.into()))
    }

    /// Create a user turn
    pub fn user(content: impl Into<TurnContent>) -> Self {
        Self::new(Role::User, Some(content.into()))
    }

    /// Create an assistant turn
    pub fn assistant(content: impl Into<TurnContent>) -> Self {
        Self::new(Role::Assistant, Some(content.into()))
    }

    /// Build a turn from a loose role/content record.
    ///
    /// The record must carry a role; everything else is optional, and keys
    /// beyond `role` and `content` are kept in `extra`.
    pub fn from_value(record: &Value) -> Result<Self> {
        let Some(role) = record.get("role").and_then(Value::as_str) else {
            return Err(AiError::InvalidTurn("missing role".to_string()));
        };

        let content = match record.get("content") {
            None | Some(Value::Null) => None,
            Some(Value::String(text)) => Some(TurnContent::Text(text.clone())),
            Some(other) => Some(TurnContent::Data(other.clone())),
        };

        let mut extra = Map::new();
        if let Some(object) = record.as_object() {
            for (key, value) in object {
                if key != "role" && key != "content" {
                    extra.insert(key.clone(), value.clone());
                }
            }
        }

        Ok(Self {
            role: Role::from(role),
            content,
            extra,
        })
    }

    pub fn text(&self) -> Option<&str> {
        self.content.as_ref().and_then(TurnContent::as_text)
    }
}

/// Presence marker for optional provider configuration.
///
/// Completion APIs distinguish an omitted field from an empty one; some reject
/// an empty-but-present tool list outright. `NotGiven` means the field is left
/// off the wire entirely.
#[derive(Debug, Clone, PartialEq)]
pub enum Given<T> {
    NotGiven,
    Value(T),
}

impl<T> Given<T> {
    pub fn is_given(&self) -> bool {
        matches!(self, Given::Value(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Given::Value(value) => Some(value),
            Given::NotGiven => None,
        }
    }
}

impl<T> Default for Given<T> {
    fn default() -> Self {
        Given::NotGiven
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn role_round_trips_unknown_values() {
        let role: Role = serde_json::from_value(json!("developer")).unwrap();
        assert_eq!(role, Role::Other("developer".to_string()));
        assert_eq!(serde_json::to_value(&role).unwrap(), json!("developer"));
    }

    #[test]
    fn turn_serializes_role_and_content() {
        let turn = Turn::user("hello");
        let value = serde_json::to_value(&turn).unwrap();
        assert_eq!(value, json!({ "role": "user", "content": "hello" }));
    }

    #[test]
    fn turn_without_content_omits_the_field() {
        let turn = Turn::new(Role::Assistant, None);
        let value = serde_json::to_value(&turn).unwrap();
        assert_eq!(value, json!({ "role": "assistant" }));
    }

    #[test]
    fn binary_content_serializes_as_hex_preview() {
        let bytes = vec![0xde, 0xad, 0xbe, 0xef, 0x00, 0x11, 0x22, 0x33, 0x44, 0x55];
        let turn = Turn::new(Role::User, Some(TurnContent::Binary(bytes)));
        let value = serde_json::to_value(&turn).unwrap();
        assert_eq!(value["content"], "deadbeef00112233...");
    }

    #[test]
    fn short_binary_content_previews_what_there_is() {
        let turn = Turn::new(Role::User, Some(TurnContent::Binary(vec![0xab, 0xcd])));
        let value = serde_json::to_value(&turn).unwrap();
        assert_eq!(value["content"], "abcd...");
    }

    #[test]
    fn from_value_requires_a_role() {
        let err = Turn::from_value(&json!({ "content": "orphan" })).unwrap_err();
        assert!(matches!(err, AiError::InvalidTurn(_)));
    }

    #[test]
    fn from_value_keeps_extra_keys() {
        let turn = Turn::from_value(&json!({
            "role": "tool",
            "content": "42",
            "tool_call_id": "call-1"
        }))
        .unwrap();

        assert_eq!(turn.role, Role::Tool);
        assert_eq!(turn.text(), Some("42"));
        assert_eq!(turn.extra["tool_call_id"], "call-1");

        let back = serde_json::to_value(&turn).unwrap();
        assert_eq!(back["tool_call_id"], "call-1");
    }

    #[test]
    fn from_value_treats_null_content_as_absent() {
        let turn = Turn::from_value(&json!({ "role": "assistant", "content": null })).unwrap();
        assert!(turn.content.is_none());
    }

    #[test]
    fn structured_content_round_trips() {
        let turn = Turn::from_value(&json!({
            "role": "user",
            "content": [{ "type": "text", "text": "hi" }]
        }))
        .unwrap();

        assert!(matches!(turn.content, Some(TurnContent::Data(_))));
        let back = serde_json::to_value(&turn).unwrap();
        assert_eq!(back["content"][0]["type"], "text");
    }

    #[test]
    fn given_defaults_to_not_given() {
        let given: Given<Vec<String>> = Given::default();
        assert!(!given.is_given());
        assert!(given.value().is_none());
    }
}
