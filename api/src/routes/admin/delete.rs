use axum::{
    extract::{Path, State},
    response::Response,
};

use crate::response::Empty;
use crate::routes::common::{ok, service_error_response};
use crate::state::AppState;

/// DELETE /api/admin/departments/{department_id}
///
/// Deletes a department and its user accounts. Refused while the department
/// still owns stages or students, since scan history hangs off both.
///
/// ### Responses
/// - `200 OK`
/// - `404 Not Found` — unknown department
/// - `409 Conflict` — department still owns stages or students
pub async fn delete_department(
    State(state): State<AppState>,
    Path(department_id): Path<i64>,
) -> Response {
    match services::departments::delete_department(state.db(), department_id).await {
        Ok(()) => ok(Empty, "Department deleted successfully!"),
        Err(e) => service_error_response(e),
    }
}
