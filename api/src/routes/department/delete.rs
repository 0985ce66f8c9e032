use axum::{
    Extension,
    extract::{Path, State},
    response::Response,
};

use super::common::claimed_department_id;
use crate::auth::claims::AuthUser;
use crate::response::Empty;
use crate::routes::common::{ok, service_error_response};
use crate::state::AppState;

/// DELETE /api/department/stages/{stage_id}
///
/// Deletes an owned stage. A stage in another department reads as missing.
pub async fn delete_stage(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Path(stage_id): Path<i64>,
) -> Response {
    let department_id = match claimed_department_id(&claims) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services::departments::delete_stage(state.db(), department_id, stage_id).await {
        Ok(stage) => ok(
            Empty,
            format!("Stage '{}' deleted successfully!", stage.name),
        ),
        Err(e) => service_error_response(e),
    }
}

/// DELETE /api/department/courses/{course_id}
///
/// Deletes an owned course.
pub async fn delete_course(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Path(course_id): Path<i64>,
) -> Response {
    let department_id = match claimed_department_id(&claims) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services::departments::delete_course(state.db(), department_id, course_id).await {
        Ok(course) => ok(
            Empty,
            format!("Course '{}' deleted successfully!", course.name),
        ),
        Err(e) => service_error_response(e),
    }
}
