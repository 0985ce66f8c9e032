pub mod claims;
pub mod extractors;
pub mod guards;
pub mod middleware;

pub use claims::{ApiUser, AuthUser, Claims};

use chrono::{Duration, Utc};
use common::config;
use db::models::user;
use jsonwebtoken::{EncodingKey, Header, encode};

/// Generates a web-session JWT and its expiry timestamp for a user.
///
/// The claims carry the user's role and department so department scoping
/// never trusts a client-supplied id.
pub fn generate_jwt(user: &user::Model) -> (String, String) {
    let expiry = Utc::now() + Duration::minutes(config::jwt_duration_minutes() as i64);

    let claims = Claims {
        sub: user.id,
        exp: expiry.timestamp() as usize,
        role: user.role,
        department_id: user.department_id,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config::jwt_secret().as_bytes()),
    )
    .expect("Token encoding failed");

    (token, expiry.to_rfc3339())
}
