//! LLM provider clients and chat types

pub mod client;
pub mod mock;
pub mod openai;
pub mod turn;

pub use client::{
    CompletionRequest, CompletionResponse, FinishReason, LlmClient, TokenUsage, ToolCall,
    ToolSchema,
};
pub use mock::{MockLlmClient, MockStep};
pub use openai::OpenAIClient;
pub use turn::{Given, Role, Turn, TurnContent};
