pub mod chat;
pub mod error;
pub mod memory;
pub mod messages;
pub mod state;
pub mod users;

use axum::{
    Router,
    routing::{get, post},
};

pub use error::ApiError;
pub use state::AppState;

#[derive(serde::Serialize)]
struct Health {
    status: String,
}

async fn health() -> axum::Json<Health> {
    axum::Json(Health {
        status: "memgate is working!".to_string(),
    })
}

/// Build the dispatch router over shared state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/chat", post(chat::chat))
        .route("/users", post(users::create_user))
        .route("/messages", get(messages::list_messages))
        .route("/memory/query", post(memory::query_memory))
        .with_state(state)
}
