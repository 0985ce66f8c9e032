//! Route guards for the two authentication paths.
//!
//! JWT guards (`allow_super_admin`, `allow_department_user`) establish
//! identity and coarse role for the web surface; the bearer-token guard
//! (`require_lecturer_token`) resolves mobile tokens against the token
//! store. Resource-level ownership is always re-checked per operation by
//! the `services::authz` predicates — passing a guard never implies access
//! to a specific course or session.

use axum::{
    Json,
    body::Body,
    extract::{FromRequestParts, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::TypedHeader;
use headers::{Authorization, authorization::Bearer};

use db::models::user::Role;

use crate::auth::claims::{ApiUser, AuthUser};
use crate::response::{ApiResponse, Empty};
use crate::routes::common::service_error_response;
use crate::state::AppState;

lazy_static::lazy_static! {
    /// API tokens are 32 lowercase hex characters; anything else is
    /// rejected without a store lookup.
    static ref TOKEN_REGEX: regex::Regex = regex::Regex::new("^[0-9a-f]{32}$").unwrap();
}

/// Extracts and validates the JWT user, then re-inserts it into the request
/// extensions for downstream handlers.
async fn extract_and_insert_authuser(
    req: Request<Body>,
) -> Result<(Request<Body>, AuthUser), (StatusCode, Json<ApiResponse<Empty>>)> {
    let (mut parts, body) = req.into_parts();
    let user = AuthUser::from_request_parts(&mut parts, &())
        .await
        .map_err(|_| {
            (
                StatusCode::UNAUTHORIZED,
                Json(ApiResponse::error("Authentication required")),
            )
        })?;

    let mut req = Request::from_parts(parts, body);
    req.extensions_mut().insert(user.clone());
    Ok((req, user))
}

/// Super-admin-only guard for the department administration routes.
pub async fn allow_super_admin(
    req: Request<Body>,
    next: Next,
) -> Result<Response, (StatusCode, Json<ApiResponse<Empty>>)> {
    let (req, user) = extract_and_insert_authuser(req).await?;

    if user.0.role != Role::SuperAdmin {
        return Err((
            StatusCode::FORBIDDEN,
            Json(ApiResponse::error("Super admin access required")),
        ));
    }

    Ok(next.run(req).await)
}

/// Department-user guard. Also requires the department claim to be present;
/// an account with the role but no department cannot be scoped and is
/// denied.
pub async fn allow_department_user(
    req: Request<Body>,
    next: Next,
) -> Result<Response, (StatusCode, Json<ApiResponse<Empty>>)> {
    let (req, user) = extract_and_insert_authuser(req).await?;

    if user.0.role != Role::DepartmentUser || user.0.department_id.is_none() {
        return Err((
            StatusCode::FORBIDDEN,
            Json(ApiResponse::error("Department access required")),
        ));
    }

    Ok(next.run(req).await)
}

/// Bearer-token guard for the mobile API.
///
/// Missing/malformed header or unknown token → 401; expired tokens are
/// deleted on lookup and also 401; a valid token held by a non-lecturer →
/// 403. On success the resolved lecturer is attached to the request as
/// [`ApiUser`].
pub async fn require_lecturer_token(
    State(app_state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let (mut parts, body) = req.into_parts();

    let TypedHeader(Authorization(bearer)) =
        TypedHeader::<Authorization<Bearer>>::from_request_parts(&mut parts, &())
            .await
            .map_err(|_| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(ApiResponse::<Empty>::error(
                        "Authorization header missing or malformed.",
                    )),
                )
                    .into_response()
            })?;

    let token = bearer.token().trim();
    if !TOKEN_REGEX.is_match(token) {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::<Empty>::error("Invalid token.")),
        )
            .into_response());
    }

    let user = services::auth::authenticate_token(app_state.db(), token)
        .await
        .map_err(service_error_response)?;

    let mut req = Request::from_parts(parts, body);
    req.extensions_mut().insert(ApiUser(user));
    Ok(next.run(req).await)
}
