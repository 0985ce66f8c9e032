//! HTTP route entry point for `/api/...`.
//!
//! Route groups:
//! - `/health` → liveness probe (public)
//! - `/auth` → mobile and web login (public)
//! - `/attendance`, `/students` → mobile API, bearer-token lecturers only
//! - `/admin` → department administration, super admins only
//! - `/department` → roster/course management and reports for the
//!   department user, scoped by the department claim
//! - `/test` → development-only seeding, mounted when env ≠ production

use axum::{Router, middleware::{from_fn, from_fn_with_state}};

use crate::auth::guards::{allow_department_user, allow_super_admin, require_lecturer_token};
use crate::state::AppState;
use ::common::config;

pub mod admin;
pub mod attendance;
pub mod auth;
pub mod common;
pub mod department;
pub mod health;
pub mod students;
pub mod test;

/// Builds the application router for all HTTP endpoints.
pub fn routes(app_state: AppState) -> Router {
    let mut router = Router::new()
        .nest("/health", health::health_routes())
        .nest("/auth", auth::auth_routes())
        .nest(
            "/attendance",
            attendance::attendance_routes().route_layer(from_fn_with_state(
                app_state.clone(),
                require_lecturer_token,
            )),
        )
        .nest(
            "/students",
            students::students_routes().route_layer(from_fn_with_state(
                app_state.clone(),
                require_lecturer_token,
            )),
        )
        .nest(
            "/admin",
            admin::admin_routes().route_layer(from_fn(allow_super_admin)),
        )
        .nest(
            "/department",
            department::department_routes().route_layer(from_fn(allow_department_user)),
        )
        .with_state(app_state.clone());

    // Development/test-only routes stay out of production builds of the
    // environment, not the binary.
    let env = config::env().to_lowercase();
    if env != "production" {
        router = router.nest("/test", test::test_routes(app_state));
        tracing::info!("[dev/test] Mounted /test routes (env = {env})");
    }

    router
}
