use std::sync::Arc;

use memgate_ai::LlmClient;
use memgate_client::MemoryClient;

/// Application state shared across all API handlers
#[derive(Clone)]
pub struct AppState {
    pub memory: Arc<MemoryClient>,
    pub llm: Arc<dyn LlmClient>,
}

impl AppState {
    pub fn new(memory: Arc<MemoryClient>, llm: Arc<dyn LlmClient>) -> Self {
        Self { memory, llm }
    }
}
