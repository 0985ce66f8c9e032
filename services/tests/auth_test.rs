mod common;

use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

use db::models::{api_token, user};
use db::test_utils::setup_test_db;
use services::auth;
use services::error::ServiceError;

use common::setup_campus;

#[tokio::test]
async fn mobile_login_issues_token_and_courses() {
    let db = setup_test_db().await;
    let campus = setup_campus(&db).await;

    let login = auth::mobile_login(&db, "lecturer1", "password123", 30)
        .await
        .unwrap();

    assert_eq!(login.user.id, campus.lecturer.id);
    assert_eq!(login.token.len(), 32);
    assert!(login.token.chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(login.courses.len(), 1);
    assert_eq!(login.courses[0].course_code, "DB201");
    assert_eq!(login.courses[0].stage_name, "Stage 2");
}

#[tokio::test]
async fn mobile_login_rejects_bad_credentials_and_non_lecturers() {
    let db = setup_test_db().await;
    let campus = setup_campus(&db).await;
    user::Model::create(
        &db,
        "deptuser",
        "password123",
        user::Role::DepartmentUser,
        Some(campus.department.id),
    )
    .await
    .unwrap();

    let err = auth::mobile_login(&db, "lecturer1", "wrong", 30)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Unauthorized(_)));

    let err = auth::mobile_login(&db, "ghost", "password123", 30)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Unauthorized(_)));

    // Department users exist but the mobile app is lecturer-only.
    let err = auth::mobile_login(&db, "deptuser", "password123", 30)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Unauthorized(_)));
}

#[tokio::test]
async fn valid_token_resolves_its_lecturer() {
    let db = setup_test_db().await;
    let campus = setup_campus(&db).await;

    let login = auth::mobile_login(&db, "lecturer1", "password123", 30)
        .await
        .unwrap();
    let resolved = auth::authenticate_token(&db, &login.token).await.unwrap();
    assert_eq!(resolved.id, campus.lecturer.id);
}

/// First use after expiry deletes the row and reports `Unauthorized`; the
/// second use fails again via the not-found path.
#[tokio::test]
async fn expired_token_is_deleted_on_first_use() {
    let db = setup_test_db().await;
    let campus = setup_campus(&db).await;
    let expired = api_token::Model::create(&db, campus.lecturer.id, -1)
        .await
        .unwrap();

    let err = auth::authenticate_token(&db, &expired.token)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Unauthorized(_)));

    let remaining = api_token::Entity::find()
        .filter(api_token::Column::Token.eq(expired.token.as_str()))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(remaining, 0, "expired token removed on lookup");

    let err = auth::authenticate_token(&db, &expired.token)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Unauthorized(_)));
}

#[tokio::test]
async fn unknown_token_is_unauthorized() {
    let db = setup_test_db().await;
    setup_campus(&db).await;

    let err = auth::authenticate_token(&db, "deadbeefdeadbeefdeadbeefdeadbeef")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Unauthorized(_)));
}

#[tokio::test]
async fn non_lecturer_token_is_forbidden() {
    let db = setup_test_db().await;
    let campus = setup_campus(&db).await;
    let admin_like = user::Model::create(
        &db,
        "deptuser",
        "password123",
        user::Role::DepartmentUser,
        Some(campus.department.id),
    )
    .await
    .unwrap();
    let token = api_token::Model::create(&db, admin_like.id, 30).await.unwrap();

    let err = auth::authenticate_token(&db, &token.token).await.unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));
}

/// Every login mints a fresh token; earlier tokens stay valid until their
/// own expiry.
#[tokio::test]
async fn repeated_logins_keep_prior_tokens_valid() {
    let db = setup_test_db().await;
    let campus = setup_campus(&db).await;

    let first = auth::mobile_login(&db, "lecturer1", "password123", 30)
        .await
        .unwrap();
    let second = auth::mobile_login(&db, "lecturer1", "password123", 30)
        .await
        .unwrap();
    assert_ne!(first.token, second.token);

    assert!(auth::authenticate_token(&db, &first.token).await.is_ok());
    assert!(auth::authenticate_token(&db, &second.token).await.is_ok());

    let count = api_token::Entity::find()
        .filter(api_token::Column::UserId.eq(campus.lecturer.id))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(count, 2);
}
