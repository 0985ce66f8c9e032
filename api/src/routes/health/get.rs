use axum::response::Response;

use crate::routes::common::ok;
use common::config;

/// GET /api/health
///
/// Liveness probe; reports the project name so deployments are
/// distinguishable.
pub async fn health() -> Response {
    ok(serde_json::json!({ "name": config::project_name() }), "ok")
}
