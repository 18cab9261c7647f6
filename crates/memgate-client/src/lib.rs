//! Memgate memory service client
//!
//! This crate provides:
//! - REST client for sessions, messages, users, and memory retrieval
//! - Query builders for retrieval and message listing
//! - A retriever trait so pipelines can swap the memory backend in tests

pub mod client;
pub mod error;
mod http_client;
pub mod retriever;
pub mod types;

// Re-export commonly used types
pub use client::{DEFAULT_BASE_URL, ListMessagesQuery, MemoryClient, MemoryQuery};
pub use error::{ClientError, Result};
pub use retriever::{MemoryRetriever, NoopRetriever};
pub use types::{
    Envelope, Fact, MessageRecord, MessagesPage, NewMessage, NewUser, Retrieval, Session,
};
