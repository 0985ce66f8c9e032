use axum::{extract::State, response::Response};

use crate::routes::common::{ok, service_error_response};
use crate::state::AppState;

/// GET /api/admin/departments
///
/// All departments ordered by name.
pub async fn list_departments(State(state): State<AppState>) -> Response {
    match services::departments::list_departments(state.db()).await {
        Ok(departments) => ok(departments, "Departments retrieved"),
        Err(e) => service_error_response(e),
    }
}
