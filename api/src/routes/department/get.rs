use axum::{
    Extension,
    extract::{Query, State},
    response::Response,
};
use serde::Serialize;

use services::attendance::SessionReport;
use services::departments::CourseWithStage;

use super::common::{ReportsQuery, claimed_department_id};
use crate::auth::claims::AuthUser;
use crate::routes::common::{ok, service_error_response};
use crate::state::AppState;

/// GET /api/department/
///
/// The caller's department with its stages and each stage's courses.
pub async fn overview(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> Response {
    let department_id = match claimed_department_id(&claims) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services::departments::department_overview(state.db(), department_id).await {
        Ok((department, stages)) => ok(
            serde_json::json!({ "department": department, "stages": stages }),
            "Department retrieved",
        ),
        Err(e) => service_error_response(e),
    }
}

/// GET /api/department/students
///
/// All students of the department, ordered by stage year then full name.
pub async fn department_students(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> Response {
    let department_id = match claimed_department_id(&claims) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services::students::department_students(state.db(), department_id).await {
        Ok(students) => ok(students, "Students retrieved"),
        Err(e) => service_error_response(e),
    }
}

#[derive(Debug, Serialize)]
struct ReportsResponse {
    courses: Vec<CourseWithStage>,
    selected_course_id: Option<i64>,
    sessions: Vec<SessionReport>,
}

/// GET /api/department/reports?course_id=
///
/// Attendance reports for one course of the department: sessions newest
/// first with counts and full record detail. Without a `course_id` the
/// session list is empty and the client prompts for a course; the course
/// picker data is always included.
pub async fn attendance_reports(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Query(query): Query<ReportsQuery>,
) -> Response {
    let department_id = match claimed_department_id(&claims) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let courses = match services::departments::list_department_courses(state.db(), department_id)
        .await
    {
        Ok(courses) => courses,
        Err(e) => return service_error_response(e),
    };

    match services::attendance::department_reports(state.db(), department_id, query.course_id)
        .await
    {
        Ok(sessions) => ok(
            ReportsResponse {
                courses,
                selected_course_id: query.course_id,
                sessions,
            },
            "Attendance reports retrieved",
        ),
        Err(e) => service_error_response(e),
    }
}
