use axum::{Json, extract::State, response::Response};
use serde::{Deserialize, Serialize};
use validator::Validate;

use common::{config, format_validation_errors};
use services::auth::CourseInfo;

use crate::auth::generate_jwt;
use crate::routes::common::{bad_request, ok, service_error_response, unauthorized};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct MobileLoginResponse {
    pub user_id: i64,
    pub username: String,
    pub role: String,
    pub token: String,
    pub courses: Vec<CourseInfo>,
}

/// POST /api/auth/login
///
/// Mobile login for lecturers. Mints a fresh 30-day API token (prior tokens
/// stay valid until their own expiry) and returns the lecturer's courses.
///
/// ### Responses
/// - `200 OK` — `{ user_id, username, role, token, courses: [...] }`
/// - `400 Bad Request` — missing username or password
/// - `401 Unauthorized` — bad credentials, or a non-lecturer account
pub async fn login(State(state): State<AppState>, Json(req): Json<LoginRequest>) -> Response {
    if let Err(validation_errors) = req.validate() {
        return bad_request(format_validation_errors(&validation_errors));
    }

    let login = match services::auth::mobile_login(
        state.db(),
        &req.username,
        &req.password,
        config::api_token_days(),
    )
    .await
    {
        Ok(login) => login,
        Err(e) => return service_error_response(e),
    };

    let data = MobileLoginResponse {
        user_id: login.user.id,
        username: login.user.username,
        role: login.user.role.to_string(),
        token: login.token,
        courses: login.courses,
    };
    ok(data, "Login successful")
}

#[derive(Debug, Deserialize, Validate)]
pub struct WebLoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct WebLoginResponse {
    pub user_id: i64,
    pub username: String,
    pub role: String,
    pub department_id: Option<i64>,
    pub token: String,
    pub expires_at: String,
}

/// POST /api/auth/web-login
///
/// Web login for the administrative surface. Issues a JWT whose claims
/// carry the role and department id; the admin routers gate on those
/// claims.
///
/// ### Responses
/// - `200 OK` — `{ user_id, username, role, department_id, token, expires_at }`
/// - `400 Bad Request` — missing username or password
/// - `401 Unauthorized` — bad credentials
pub async fn web_login(
    State(state): State<AppState>,
    Json(req): Json<WebLoginRequest>,
) -> Response {
    if let Err(validation_errors) = req.validate() {
        return bad_request(format_validation_errors(&validation_errors));
    }

    let user = match services::auth::validate_credentials(state.db(), &req.username, &req.password)
        .await
    {
        Ok(Some(user)) => user,
        Ok(None) => return unauthorized("Invalid username or password."),
        Err(e) => return service_error_response(e),
    };

    let (token, expires_at) = generate_jwt(&user);
    let data = WebLoginResponse {
        user_id: user.id,
        username: user.username,
        role: user.role.to_string(),
        department_id: user.department_id,
        token,
        expires_at,
    };
    ok(data, "Login successful")
}
