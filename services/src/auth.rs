//! Credential validation and the bearer-token side of the access gateway.
//!
//! Tokens are opaque 32-hex strings held in the `api_tokens` table. A login
//! always mints a fresh token; previously issued tokens stay valid until
//! their own expiry (no rotation, no single-session enforcement). Expired
//! tokens are deleted lazily on first use after expiry, so a second attempt
//! with the same token fails on the not-found path.

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use std::collections::HashMap;

use db::models::{api_token, course, stage, user};

use crate::error::ServiceError;

/// A course as presented to a freshly logged-in lecturer.
#[derive(Debug, Clone, Serialize)]
pub struct CourseInfo {
    pub course_id: i64,
    pub course_name: String,
    pub course_code: String,
    pub stage_name: String,
}

/// Everything the mobile login response needs.
#[derive(Debug)]
pub struct MobileLogin {
    pub user: user::Model,
    pub token: String,
    pub courses: Vec<CourseInfo>,
}

/// Checks a username/password pair. Unknown user and bad password are
/// indistinguishable to the caller.
pub async fn validate_credentials(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> Result<Option<user::Model>, ServiceError> {
    match user::Model::find_by_username(db, username).await? {
        Some(user) if user.verify_password(password) => Ok(Some(user)),
        _ => Ok(None),
    }
}

/// Mobile login: lecturers only. Mints a fresh API token and returns the
/// lecturer's assigned courses for course selection on the device.
pub async fn mobile_login(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
    token_lifetime_days: i64,
) -> Result<MobileLogin, ServiceError> {
    let user = validate_credentials(db, username, password)
        .await?
        .ok_or_else(|| ServiceError::unauthorized("Invalid username or password."))?;

    if user.role != user::Role::Lecturer {
        return Err(ServiceError::unauthorized(
            "Only lecturers can log in to the mobile app.",
        ));
    }

    let token = api_token::Model::create(db, user.id, token_lifetime_days).await?;
    let courses = lecturer_courses(db, user.id).await?;

    tracing::info!(user_id = user.id, "mobile login, api token issued");

    Ok(MobileLogin {
        user,
        token: token.token,
        courses,
    })
}

/// Resolves a bearer token to its lecturer.
///
/// Unknown token → `Unauthorized`; expired token → deleted, then
/// `Unauthorized`; a valid token held by a non-lecturer → `Forbidden`.
pub async fn authenticate_token(
    db: &DatabaseConnection,
    token: &str,
) -> Result<user::Model, ServiceError> {
    let row = api_token::Model::find_by_token(db, token)
        .await?
        .ok_or_else(|| ServiceError::unauthorized("Invalid token."))?;

    if row.is_expired() {
        let user_id = row.user_id;
        row.delete(db).await?;
        tracing::debug!(user_id, "deleted expired api token on use");
        return Err(ServiceError::unauthorized("Token expired."));
    }

    let user = user::Entity::find_by_id(row.user_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::unauthorized("Invalid token."))?;

    if user.role != user::Role::Lecturer {
        return Err(ServiceError::forbidden(
            "Only lecturer accounts may use the mobile API.",
        ));
    }

    Ok(user)
}

/// The courses assigned to a lecturer, each with its stage name.
pub async fn lecturer_courses(
    db: &DatabaseConnection,
    lecturer_id: i64,
) -> Result<Vec<CourseInfo>, ServiceError> {
    let courses = course::Entity::find()
        .filter(course::Column::LecturerId.eq(lecturer_id))
        .order_by_asc(course::Column::Name)
        .all(db)
        .await?;
    if courses.is_empty() {
        return Ok(Vec::new());
    }

    let stage_ids: Vec<i64> = {
        let mut ids: Vec<i64> = courses.iter().map(|c| c.stage_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    };
    let stage_names: HashMap<i64, String> = stage::Entity::find()
        .filter(stage::Column::Id.is_in(stage_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|s| (s.id, s.name))
        .collect();

    Ok(courses
        .into_iter()
        .map(|c| CourseInfo {
            stage_name: stage_names
                .get(&c.stage_id)
                .cloned()
                .unwrap_or_default(),
            course_id: c.id,
            course_name: c.name,
            course_code: c.code,
        })
        .collect())
}
