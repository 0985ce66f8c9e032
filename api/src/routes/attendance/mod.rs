use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

mod common;
mod get;
mod post;

pub use get::{list_sessions, session_records};
pub use post::upload_session;

/// Mobile attendance API. The whole group sits behind the bearer-token
/// guard (see `routes::routes`); every handler still re-verifies ownership.
pub fn attendance_routes() -> Router<AppState> {
    Router::new()
        .route("/session", post(upload_session))
        .route("/sessions/{lecturer_id}", get(list_sessions))
        .route("/session/{session_id}/records", get(session_records))
}
