use axum::{
    Json,
    extract::{Path, State},
    response::Response,
};
use validator::Validate;

use common::format_validation_errors;
use services::departments::DepartmentUpdate;

use super::common::UpdateDepartmentRequest;
use crate::routes::common::{bad_request, ok, service_error_response};
use crate::state::AppState;

/// PUT /api/admin/departments/{department_id}
///
/// Updates a department's name/code and optionally resets the department
/// user's password.
///
/// ### Responses
/// - `200 OK` — the updated department
/// - `404 Not Found` — unknown department
/// - `409 Conflict` — code collides with another department
pub async fn update_department(
    State(state): State<AppState>,
    Path(department_id): Path<i64>,
    Json(req): Json<UpdateDepartmentRequest>,
) -> Response {
    if let Err(validation_errors) = req.validate() {
        return bad_request(format_validation_errors(&validation_errors));
    }

    let input = DepartmentUpdate {
        name: req.name,
        code: req.code,
        new_password: req.new_password,
    };

    match services::departments::update_department(state.db(), department_id, input).await {
        Ok(dept) => {
            let message = format!("Department '{}' updated successfully!", dept.name);
            ok(dept, message)
        }
        Err(e) => service_error_response(e),
    }
}
