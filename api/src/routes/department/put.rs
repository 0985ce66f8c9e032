use axum::{
    Extension, Json,
    extract::{Path, State},
    response::Response,
};
use validator::Validate;

use common::format_validation_errors;

use super::common::{ResetLecturerPasswordRequest, claimed_department_id};
use crate::auth::claims::AuthUser;
use crate::response::Empty;
use crate::routes::common::{bad_request, ok, service_error_response};
use crate::state::AppState;

/// PUT /api/department/courses/{course_id}/lecturer-password
///
/// Resets the password of the lecturer assigned to an owned course.
///
/// ### Responses
/// - `200 OK`
/// - `404 Not Found` — course not in this department, or no lecturer
pub async fn reset_lecturer_password(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Path(course_id): Path<i64>,
    Json(req): Json<ResetLecturerPasswordRequest>,
) -> Response {
    let department_id = match claimed_department_id(&claims) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    if let Err(validation_errors) = req.validate() {
        return bad_request(format_validation_errors(&validation_errors));
    }

    match services::departments::reset_lecturer_password(
        state.db(),
        department_id,
        course_id,
        &req.new_password,
    )
    .await
    {
        Ok(lecturer) => ok(
            Empty,
            format!(
                "Password for lecturer '{}' has been reset successfully!",
                lecturer.username
            ),
        ),
        Err(e) => service_error_response(e),
    }
}
