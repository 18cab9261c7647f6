//! HTTP dispatch layer for the memgate stack
//!
//! Exposes the memory-augmented chat flow and the surrounding memory
//! service operations as a small REST API:
//! - `POST /chat` - session resolution, persistence, retrieval, completion
//! - `POST /users` - validated user creation, upstream status passthrough
//! - `GET /messages` - filtered history listing with cursor pagination
//! - `POST /memory/query` - direct memory lookup with a stable envelope

pub mod api;
pub mod config;
