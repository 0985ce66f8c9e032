use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::state::AppState;

mod common;
mod delete;
mod get;
mod post;
mod put;

pub use delete::{delete_course, delete_stage};
pub use get::{attendance_reports, department_students, overview};
pub use post::{create_course, create_stage, import_students, import_unpaid};
pub use put::reset_lecturer_password;

/// Department-user surface. Role-gated by `allow_department_user` at the
/// mount point; every operation is scoped by the department id claim.
pub fn department_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(overview))
        .route("/stages", post(create_stage))
        .route("/stages/{stage_id}", delete(delete_stage))
        .route("/courses", post(create_course))
        .route("/courses/{course_id}", delete(delete_course))
        .route(
            "/courses/{course_id}/lecturer-password",
            put(reset_lecturer_password),
        )
        .route("/students", get(department_students))
        .route("/students/import", post(import_students))
        .route("/unpaid/import", post(import_unpaid))
        .route("/reports", get(attendance_reports))
}
