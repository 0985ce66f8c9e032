mod helpers;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use serial_test::serial;
use tower::ServiceExt;

use db::models::{api_token, user};
use helpers::app::make_test_app;
use helpers::data::{create_user, setup_campus};

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
#[serial]
async fn mobile_login_returns_token_and_courses() {
    let (app, state) = make_test_app().await;
    let campus = setup_campus(state.db()).await;

    let req = post_json(
        "/api/auth/login",
        json!({ "username": "lecturer1", "password": "password123" }),
    );
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    let data = &body["data"];
    assert_eq!(data["user_id"], campus.lecturer.id);
    assert_eq!(data["username"], "lecturer1");
    assert_eq!(data["role"], "lecturer");
    assert_eq!(data["token"].as_str().unwrap().len(), 32);

    let courses = data["courses"].as_array().unwrap();
    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0]["course_code"], "DB201");
    assert_eq!(courses[0]["stage_name"], "Stage 2");
}

#[tokio::test]
#[serial]
async fn mobile_login_rejects_bad_credentials_and_non_lecturers() {
    let (app, state) = make_test_app().await;
    let campus = setup_campus(state.db()).await;
    create_user(
        state.db(),
        "deptuser",
        user::Role::DepartmentUser,
        Some(campus.department.id),
    )
    .await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            json!({ "username": "lecturer1", "password": "wrong" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            json!({ "username": "deptuser", "password": "password123" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Missing fields fail validation before any lookup.
    let response = app
        .oneshot(post_json(
            "/api/auth/login",
            json!({ "username": "", "password": "" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[serial]
async fn web_login_carries_role_and_department_claims() {
    let (app, state) = make_test_app().await;
    let campus = setup_campus(state.db()).await;
    create_user(
        state.db(),
        "deptuser",
        user::Role::DepartmentUser,
        Some(campus.department.id),
    )
    .await;

    let response = app
        .oneshot(post_json(
            "/api/auth/web-login",
            json!({ "username": "deptuser", "password": "password123" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let data = &body["data"];
    assert_eq!(data["role"], "department_user");
    assert_eq!(data["department_id"], campus.department.id);
    assert!(data["token"].as_str().unwrap().len() > 32);
    assert!(data["expires_at"].as_str().is_some());
}

#[tokio::test]
#[serial]
async fn bearer_routes_reject_missing_and_unknown_tokens() {
    let (app, state) = make_test_app().await;
    let campus = setup_campus(state.db()).await;
    let uri = format!("/api/students/{}", campus.course.id);

    // No Authorization header at all.
    let req = Request::builder()
        .method("GET")
        .uri(&uri)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Shape is wrong: rejected before any store lookup.
    let req = Request::builder()
        .method("GET")
        .uri(&uri)
        .header(header::AUTHORIZATION, "Bearer not-a-token")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Well-formed but unknown.
    let req = Request::builder()
        .method("GET")
        .uri(&uri)
        .header(
            header::AUTHORIZATION,
            "Bearer deadbeefdeadbeefdeadbeefdeadbeef",
        )
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Expired tokens are deleted on first use; the second attempt fails on the
/// not-found path with the same status.
#[tokio::test]
#[serial]
async fn expired_bearer_token_is_removed_on_first_use() {
    let (app, state) = make_test_app().await;
    let campus = setup_campus(state.db()).await;
    let expired = api_token::Model::create(state.db(), campus.lecturer.id, -1)
        .await
        .unwrap();
    let uri = format!("/api/students/{}", campus.course.id);

    for expected_message in ["Token expired.", "Invalid token."] {
        let req = Request::builder()
            .method("GET")
            .uri(&uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", expired.token))
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["message"], expected_message);
    }
}

#[tokio::test]
#[serial]
async fn non_lecturer_bearer_token_is_forbidden() {
    let (app, state) = make_test_app().await;
    let campus = setup_campus(state.db()).await;
    let dept_user = create_user(
        state.db(),
        "deptuser",
        user::Role::DepartmentUser,
        Some(campus.department.id),
    )
    .await;
    let token = api_token::Model::create(state.db(), dept_user.id, 30)
        .await
        .unwrap();

    let req = Request::builder()
        .method("GET")
        .uri(format!("/api/students/{}", campus.course.id))
        .header(header::AUTHORIZATION, format!("Bearer {}", token.token))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
