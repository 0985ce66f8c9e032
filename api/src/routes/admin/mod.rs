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

pub use delete::delete_department;
pub use get::list_departments;
pub use post::create_department;
pub use put::update_department;

/// Super-admin surface: department administration. Role-gated by
/// `allow_super_admin` at the mount point.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/departments", get(list_departments))
        .route("/departments", post(create_department))
        .route("/departments/{department_id}", put(update_department))
        .route("/departments/{department_id}", delete(delete_department))
}
