use axum::{Router, routing::get};

use crate::state::AppState;

mod get;

pub use get::course_roster;

pub fn students_routes() -> Router<AppState> {
    Router::new().route("/{course_id}", get(course_roster))
}
