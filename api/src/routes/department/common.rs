use axum::response::Response;
use serde::Deserialize;
use validator::Validate;

use services::ServiceError;
use services::import::StudentRow;

use crate::auth::claims::Claims;
use crate::routes::common::service_error_response;

/// The department a web caller is scoped to, from their claims — never from
/// anything client-supplied. The role guard already requires the claim, so
/// a miss here is a defensive 403.
pub fn claimed_department_id(claims: &Claims) -> Result<i64, Response> {
    claims.department_id.ok_or_else(|| {
        service_error_response(ServiceError::forbidden("Department access required"))
    })
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateStageRequest {
    #[validate(length(min = 1, max = 100, message = "Stage name is required"))]
    pub name: String,

    #[validate(range(min = 1, message = "Year must be a positive number"))]
    pub year: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCourseRequest {
    pub stage_id: i64,

    #[validate(length(min = 1, max = 200, message = "Course name is required"))]
    pub course_name: String,

    #[validate(length(min = 1, max = 50, message = "Course code is required"))]
    pub course_code: String,

    #[validate(length(min = 3, message = "Lecturer username must be at least 3 characters"))]
    pub lecturer_username: String,

    #[validate(length(min = 8, message = "Lecturer password must be at least 8 characters"))]
    pub lecturer_password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResetLecturerPasswordRequest {
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

/// Parsed rows of a student sheet, in sheet order with the header already
/// skipped (cell extraction happens client-side against the documented
/// column contract).
#[derive(Debug, Deserialize)]
pub struct ImportStudentsRequest {
    pub rows: Vec<StudentRow>,
}

/// Parsed rows of an unpaid sheet: one student id per row, blanks allowed.
#[derive(Debug, Deserialize)]
pub struct ImportUnpaidRequest {
    pub rows: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReportsQuery {
    pub course_id: Option<i64>,
}
