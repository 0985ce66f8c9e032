use axum::{Extension, Json, extract::State, response::Response};
use validator::Validate;

use common::format_validation_errors;
use services::departments::NewCourse;

use super::common::{
    CreateCourseRequest, CreateStageRequest, ImportStudentsRequest, ImportUnpaidRequest,
    claimed_department_id,
};
use crate::auth::claims::AuthUser;
use crate::routes::common::{bad_request, created, ok, service_error_response};
use crate::state::AppState;

/// POST /api/department/stages
///
/// Creates a stage in the caller's department.
///
/// ### Responses
/// - `201 Created`
/// - `409 Conflict` — the year already exists for this department
pub async fn create_stage(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Json(req): Json<CreateStageRequest>,
) -> Response {
    let department_id = match claimed_department_id(&claims) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    if let Err(validation_errors) = req.validate() {
        return bad_request(format_validation_errors(&validation_errors));
    }

    match services::departments::create_stage(state.db(), department_id, &req.name, req.year).await
    {
        Ok(stage) => {
            let message = format!("Stage '{}' created successfully!", stage.name);
            created(stage, message)
        }
        Err(e) => service_error_response(e),
    }
}

/// POST /api/department/courses
///
/// Creates a course under an owned stage together with its lecturer
/// account, and assigns the lecturer to the course.
///
/// ### Responses
/// - `201 Created`
/// - `404 Not Found` — stage not in this department
/// - `409 Conflict` — lecturer username already exists
pub async fn create_course(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Json(req): Json<CreateCourseRequest>,
) -> Response {
    let department_id = match claimed_department_id(&claims) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    if let Err(validation_errors) = req.validate() {
        return bad_request(format_validation_errors(&validation_errors));
    }

    let input = NewCourse {
        stage_id: req.stage_id,
        name: req.course_name,
        code: req.course_code,
        lecturer_username: req.lecturer_username,
        lecturer_password: req.lecturer_password,
    };

    match services::departments::create_course(state.db(), department_id, input).await {
        Ok(course) => {
            let message = format!(
                "Course '{}' and lecturer account created successfully!",
                course.name
            );
            created(course, message)
        }
        Err(e) => service_error_response(e),
    }
}

/// POST /api/department/students/import
///
/// Bulk roster import from parsed sheet rows. All-or-nothing: the first
/// invalid row aborts the batch with its sheet row number and nothing is
/// persisted.
///
/// ### Responses
/// - `200 OK` — `{ imported }`
/// - `400 Bad Request` — empty sheet, no stages yet, or a row error
pub async fn import_students(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Json(req): Json<ImportStudentsRequest>,
) -> Response {
    let department_id = match claimed_department_id(&claims) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    if req.rows.is_empty() {
        return bad_request("The file must contain at least a header row and one data row.");
    }

    let validated =
        match services::import::import_students(state.db(), department_id, &req.rows).await {
            Ok(validated) => validated,
            Err(e) => return service_error_response(e),
        };

    match services::import::persist_students(state.db(), validated).await {
        Ok(imported) => ok(
            serde_json::json!({ "imported": imported }),
            format!("Successfully uploaded {imported} students!"),
        ),
        Err(e) => service_error_response(e),
    }
}

/// POST /api/department/unpaid/import
///
/// Replaces the department's unpaid registry with the uploaded list. Blank
/// rows are skipped; an unknown student id aborts the batch; the stored set
/// is always exactly the last successful upload.
///
/// ### Responses
/// - `200 OK` — `{ count }`
/// - `400 Bad Request` — empty sheet or a row error
pub async fn import_unpaid(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Json(req): Json<ImportUnpaidRequest>,
) -> Response {
    let department_id = match claimed_department_id(&claims) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    if req.rows.is_empty() {
        return bad_request("The file must contain at least a header row and one data row.");
    }

    let ids = match services::import::import_unpaid(state.db(), department_id, &req.rows).await {
        Ok(ids) => ids,
        Err(e) => return service_error_response(e),
    };

    match services::import::replace_unpaid(state.db(), department_id, &ids).await {
        Ok(count) => ok(
            serde_json::json!({ "count": count }),
            format!("Successfully updated unpaid students list ({count} students)!"),
        ),
        Err(e) => service_error_response(e),
    }
}
