use axum::{Router, middleware::from_fn_with_state, routing::post};

use crate::auth::guards::require_lecturer_token;
use crate::state::AppState;


pub use post::seed_students;

/// Development/test-only routes; never mounted when `APP_ENV=production`.
pub fn test_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/students/seed/{course_id}", post(seed_students))
        .route_layer(from_fn_with_state(
            app_state.clone(),
            require_lecturer_token,
        ))
        .with_state(app_state)
}
