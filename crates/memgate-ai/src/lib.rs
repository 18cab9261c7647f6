//! Memgate AI - conversation window and completion provider clients
//!
//! This crate provides:
//! - A conversation window with a bounded view and memory-graph augmentation
//! - An OpenAI chat completions client
//! - A deterministic mock client for tests

pub mod error;
mod http_client;
pub mod llm;
pub mod window;

// Re-export commonly used types
pub use error::{AiError, Result};
pub use llm::{
    CompletionRequest, CompletionResponse, FinishReason, Given, LlmClient, MockLlmClient,
    MockStep, OpenAIClient, Role, TokenUsage, ToolCall, ToolSchema, Turn, TurnContent,
};
pub use window::{DEFAULT_SYSTEM_PROMPT, VIEW_HISTORY_LIMIT, Window};
