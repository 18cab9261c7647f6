//! Conversation window with memory augmentation
//!
//! Holds the ordered turn history for one conversation plus the tool
//! configuration offered to the completion provider. History storage is
//! unbounded; the cap applies to the materialized view sent to the provider,
//! which is always the system turn followed by the most recent history.
//!
//! Ingesting a user turn queries the memory service when the window is bound
//! to a memory graph, and a retrieval hit injects a synthetic system turn
//! right after the user turn. Retrieval failures never surface to the caller.
//!
//! A window lives for one conversation turn cycle. Durable conversation state
//! belongs to the memory service, not to this structure, and one instance must
//! not be shared across concurrent turns.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use memgate_ai::window::Window;
//! use memgate_client::NoopRetriever;
//!
//! let window = Window::new(Arc::new(NoopRetriever))
//!     .with_system_prompt("You are a support agent.");
//! assert_eq!(window.messages().len(), 1);
//! ```

use std::fmt;
use std::sync::Arc;

use serde_json::{Value, json};

use memgate_client::MemoryRetriever;

use crate::error::Result;
use crate::llm::{Given, Role, ToolSchema, Turn, TurnContent};

/// History turns included in the materialized view.
pub const VIEW_HISTORY_LIMIT: usize = 10;

/// System prompt used when the caller does not set one.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Content prefix length for log output.
const LOG_PREVIEW_CHARS: usize = 50;

/// Prefix for synthetic system turns carrying retrieved context.
const CONTEXT_PREFIX: &str = "Context from graph: ";

/// Bounded conversation view over an append-only turn history.
pub struct Window {
    system_prompt: String,
    history: Vec<Turn>,
    tools: Given<Vec<ToolSchema>>,
    tool_choice: Given<Value>,
    memory_id: Option<String>,
    retriever: Arc<dyn MemoryRetriever>,
}

impl Window {
    /// Create an empty window. The retriever is a borrowed capability; the
    /// window never builds one from raw configuration.
    pub fn new(retriever: Arc<dyn MemoryRetriever>) -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            history: Vec::new(),
            tools: Given::NotGiven,
            tool_choice: Given::NotGiven,
            memory_id: None,
            retriever,
        }
    }

    /// Set the system prompt
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Bind the window to a memory graph, enabling augmentation on user turns.
    pub fn with_memory_id(mut self, memory_id: impl Into<String>) -> Self {
        self.memory_id = Some(memory_id.into());
        self
    }

    /// Seed history with existing turns. No ingestion side effects fire; use
    /// [`Window::from_messages`] to replay records through ingestion.
    pub fn with_history(mut self, turns: Vec<Turn>) -> Self {
        self.history = turns;
        self
    }

    /// Offer tools to the provider. An empty list reads as "not given".
    pub fn with_tools(mut self, tools: Vec<ToolSchema>) -> Self {
        self.set_tools(Given::Value(tools));
        self
    }

    /// Set the tool choice
    pub fn with_tool_choice(mut self, tool_choice: Value) -> Self {
        self.tool_choice = Given::Value(tool_choice);
        self
    }

    /// Build a window by replaying stored records through ingestion, in order.
    ///
    /// Ingestion side effects apply to every record: each user-role record
    /// triggers its own retrieval lookup, exactly as a newly arriving turn
    /// would. Seeding N user records costs N retrieval calls.
    pub async fn from_messages(
        records: &[Value],
        memory_id: Option<String>,
        retriever: Arc<dyn MemoryRetriever>,
    ) -> Result<Self> {
        tracing::debug!(count = records.len(), "seeding window from stored messages");

        let mut window = Window::new(retriever);
        if let Some(memory_id) = memory_id {
            window = window.with_memory_id(memory_id);
        }
        for record in records {
            window.push_record(record).await?;
        }
        Ok(window)
    }

    /// Append one turn to history.
    ///
    /// A user turn on a memory-bound window additionally queries the memory
    /// service with the turn's text; a retrieval hit appends a synthetic
    /// system turn directly after it. A failed or empty retrieval leaves
    /// history with just the user turn and raises nothing.
    pub async fn push(&mut self, turn: Turn) {
        tracing::debug!(role = %turn.role, "adding turn to history");

        let is_user = turn.role == Role::User;
        let query = turn.text().map(str::to_string);
        self.history.push(turn);

        if !is_user {
            return;
        }
        let Some(memory_id) = self.memory_id.clone() else {
            return;
        };
        let Some(query) = query else {
            return;
        };

        match self.retriever.retrieve(&query, &memory_id, true).await {
            Ok(retrieval) => {
                if let Some(payload) = retrieval.payload_text() {
                    tracing::info!(%memory_id, "adding retrieved context to history");
                    self.history.push(Turn::system(format!("{CONTEXT_PREFIX}{payload}")));
                }
            }
            Err(err) => {
                // Augmentation must not abort the conversation.
                tracing::warn!(error = %err, %memory_id, "memory retrieval failed");
            }
        }

        tracing::debug!(total = self.history.len(), "history after ingestion");
    }

    /// Validate a loose record into a [`Turn`] and ingest it.
    ///
    /// A record without a role fails with [`AiError::InvalidTurn`] and leaves
    /// history untouched.
    ///
    /// [`AiError::InvalidTurn`]: crate::error::AiError::InvalidTurn
    pub async fn push_record(&mut self, record: &Value) -> Result<()> {
        let turn = Turn::from_value(record)?;
        self.push(turn).await;
        Ok(())
    }

    /// Materialized view: the system turn followed by the most recent history,
    /// capped at [`VIEW_HISTORY_LIMIT`] entries in original order.
    pub fn messages(&self) -> Vec<Turn> {
        let tail = self.history.len().saturating_sub(VIEW_HISTORY_LIMIT);
        let mut messages = Vec::with_capacity(1 + self.history.len() - tail);
        messages.push(Turn::system(self.system_prompt.clone()));
        messages.extend(self.history[tail..].iter().cloned());
        messages
    }

    /// Serialize the materialized view for transport. Binary content degrades
    /// to its hex preview, so this never fails on non-text payloads.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.messages())?)
    }

    /// Logging-safe view: role verbatim, content capped to a short prefix.
    /// Turns with no content (or empty text) log a null content marker.
    pub fn for_logging(&self) -> Vec<Value> {
        self.messages().iter().map(log_entry).collect()
    }

    /// Replace the tool choice. Consistency with the configured tool set is
    /// the caller's responsibility.
    pub fn set_tool_choice(&mut self, tool_choice: Given<Value>) {
        self.tool_choice = tool_choice;
    }

    /// Replace the tool set. An empty list normalizes to "not given" so
    /// downstream completion calls omit the field instead of sending an
    /// empty array.
    pub fn set_tools(&mut self, tools: Given<Vec<ToolSchema>>) {
        self.tools = match tools {
            Given::Value(tools) if tools.is_empty() => Given::NotGiven,
            other => other,
        };
    }

    pub fn tools(&self) -> &Given<Vec<ToolSchema>> {
        &self.tools
    }

    pub fn tool_choice(&self) -> &Given<Value> {
        &self.tool_choice
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn memory_id(&self) -> Option<&str> {
        self.memory_id.as_deref()
    }

    /// Raw history, uncapped.
    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    /// Number of turns in history (the view adds the system turn on top).
    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

impl fmt::Debug for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window")
            .field("system_prompt", &self.system_prompt)
            .field("history", &self.history)
            .field("tools", &self.tools)
            .field("tool_choice", &self.tool_choice)
            .field("memory_id", &self.memory_id)
            .finish_non_exhaustive()
    }
}

impl<'a> IntoIterator for &'a Window {
    type Item = Turn;
    type IntoIter = std::vec::IntoIter<Turn>;

    /// Iterate over the materialized view, freshly produced per call.
    fn into_iter(self) -> Self::IntoIter {
        self.messages().into_iter()
    }
}

fn log_entry(turn: &Turn) -> Value {
    let content = match &turn.content {
        None => Value::Null,
        Some(content) => {
            let text = content.display_text();
            if text.is_empty() {
                Value::Null
            } else {
                let preview: String = text.chars().take(LOG_PREVIEW_CHARS).collect();
                Value::String(format!("{preview}..."))
            }
        }
    };

    json!({ "role": turn.role.as_str(), "content": content })
}
