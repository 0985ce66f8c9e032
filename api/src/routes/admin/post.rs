use axum::{Json, extract::State, response::Response};
use validator::Validate;

use common::format_validation_errors;
use services::departments::NewDepartment;

use super::common::CreateDepartmentRequest;
use crate::routes::common::{bad_request, created, service_error_response};
use crate::state::AppState;

/// POST /api/admin/departments
///
/// Creates a department and its paired department-user account.
///
/// ### Responses
/// - `201 Created` — the new department
/// - `400 Bad Request` — validation failure
/// - `409 Conflict` — duplicate department code or username
pub async fn create_department(
    State(state): State<AppState>,
    Json(req): Json<CreateDepartmentRequest>,
) -> Response {
    if let Err(validation_errors) = req.validate() {
        return bad_request(format_validation_errors(&validation_errors));
    }

    let input = NewDepartment {
        name: req.name,
        code: req.code,
        username: req.username,
        password: req.password,
    };

    match services::departments::create_department(state.db(), input).await {
        Ok(dept) => {
            let message = format!("Department '{}' created successfully!", dept.name);
            created(dept, message)
        }
        Err(e) => service_error_response(e),
    }
}
