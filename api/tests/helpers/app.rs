use axum::Router;

use api::routes::routes;
use api::state::AppState;

/// Builds the full router on a fresh in-memory database. Environment
/// overrides make configuration deterministic; callers run `#[serial]`
/// because of the env mutation.
pub async fn make_test_app() -> (Router, AppState) {
    unsafe {
        std::env::set_var("APP_ENV", "test");
        std::env::set_var("DATABASE_PATH", "unused-in-tests.db");
        std::env::set_var("JWT_SECRET", "test-secret-key");
    }
    common::config::AppConfig::reset();

    let db = db::test_utils::setup_test_db().await;
    let state = AppState::new(db);
    let app = Router::new().nest("/api", routes(state.clone()));

    (app, state)
}
