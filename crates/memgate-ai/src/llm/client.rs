//! LLM client trait and completion types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::llm::turn::{Given, Turn};
use crate::window::Window;

/// Description of one tool offered to the completion provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Tool call request from the LLM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

/// LLM completion request
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub messages: Vec<Turn>,
    pub tools: Given<Vec<ToolSchema>>,
    pub tool_choice: Given<Value>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    /// Create a new completion request
    pub fn new(messages: Vec<Turn>) -> Self {
        Self {
            messages,
            tools: Given::NotGiven,
            tool_choice: Given::NotGiven,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Build a request from a window's materialized view and tool
    /// configuration.
    pub fn from_window(window: &Window) -> Self {
        Self {
            messages: window.messages(),
            tools: window.tools().clone(),
            tool_choice: window.tool_choice().clone(),
            temperature: None,
            max_tokens: None,
        }
    }

    /// Offer tools to the provider. An empty list reads as "not given".
    pub fn with_tools(mut self, tools: Vec<ToolSchema>) -> Self {
        self.tools = if tools.is_empty() {
            Given::NotGiven
        } else {
            Given::Value(tools)
        };
        self
    }

    /// Set the tool choice
    pub fn with_tool_choice(mut self, tool_choice: Value) -> Self {
        self.tool_choice = Given::Value(tool_choice);
        self
    }

    /// Set temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set max tokens
    pub fn with_max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }
}

/// LLM completion response
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCall>,
    pub finish_reason: FinishReason,
    pub usage: Option<TokenUsage>,
}

/// Reason for completion
#[derive(Debug, Clone, PartialEq)]
pub enum FinishReason {
    Stop,
    ToolCalls,
    MaxTokens,
    Error,
}

/// Token usage statistics
#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// LLM client trait
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Get provider name
    fn provider(&self) -> &str;

    /// Get model name
    fn model(&self) -> &str;

    /// Complete a chat request
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;
}
