use db::models::user::{self, Role};
use serde::{Deserialize, Serialize};

/// Claims carried by the web-session JWT. `department_id` is present for
/// department users and lecturers, absent for super admins.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: i64,
    pub exp: usize,
    pub role: Role,
    pub department_id: Option<i64>,
}

/// A JWT-authenticated caller (web path).
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

/// A bearer-token-authenticated lecturer (mobile path), resolved against
/// the token store by the route guard.
#[derive(Debug, Clone)]
pub struct ApiUser(pub user::Model);
