mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{body_json, TestApp, EMPLOYEE_PASSWORD};

#[tokio::test]
async fn health_endpoints_are_public() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.request(Method::GET, "/health/ready", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_returns_token_and_profile() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/auth/login",
            Some(json!({"email": "employee@example.com", "password": EMPLOYEE_PASSWORD})),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert!(body["token"].as_str().unwrap().contains('.'));
    assert_eq!(body["expires_in"].as_i64().unwrap(), 12 * 60 * 60);
    assert_eq!(body["user"]["email"], "employee@example.com");
    assert_eq!(body["user"]["role"], "employee");
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn login_token_grants_api_access() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/auth/login",
            Some(json!({"email": "employee@example.com", "password": EMPLOYEE_PASSWORD})),
            None,
        )
        .await;
    let body = body_json(response).await;
    let token = body["token"].as_str().unwrap().to_string();

    let response = app
        .request(Method::GET, "/api/companies", None, Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn wrong_password_and_unknown_email_are_indistinguishable() {
    let app = TestApp::new().await;

    let wrong = app
        .request(
            Method::POST,
            "/api/auth/login",
            Some(json!({"email": "employee@example.com", "password": "wrong-password"})),
            None,
        )
        .await;
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    let wrong_body = body_json(wrong).await;

    let unknown = app
        .request(
            Method::POST,
            "/api/auth/login",
            Some(json!({"email": "nobody@example.com", "password": "whatever-pass"})),
            None,
        )
        .await;
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    let unknown_body = body_json(unknown).await;

    assert_eq!(wrong_body["code"], "INVALID_CREDENTIALS");
    assert_eq!(wrong_body, unknown_body);
}

#[tokio::test]
async fn blank_credentials_are_rejected_before_lookup() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/auth/login",
            Some(json!({"email": "", "password": ""})),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn inactive_accounts_cannot_login() {
    use sea_orm::{ActiveModelTrait, ActiveValue::Set, EntityTrait};

    let app = TestApp::new().await;

    let account = fieldvisit_api::entities::user::Entity::find_by_id(app.employee.id)
        .one(&*app.state.db)
        .await
        .unwrap()
        .unwrap();
    let mut active: fieldvisit_api::entities::user::ActiveModel = account.into();
    active.is_active = Set(false);
    active.update(&*app.state.db).await.unwrap();

    let response = app
        .request(
            Method::POST,
            "/api/auth/login",
            Some(json!({"email": "employee@example.com", "password": EMPLOYEE_PASSWORD})),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn protected_routes_require_a_credential() {
    let app = TestApp::new().await;

    let missing = app.request(Method::GET, "/api/companies", None, None).await;
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(missing).await;
    assert_eq!(body["code"], "UNAUTHENTICATED");

    let garbage = app
        .request(Method::GET, "/api/companies", None, Some("not.a.jwt"))
        .await;
    assert_eq!(garbage.status(), StatusCode::UNAUTHORIZED);

    let tampered = format!("{}x", app.employee.token);
    let tampered = app
        .request(Method::GET, "/api/companies", None, Some(&tampered))
        .await;
    assert_eq!(tampered.status(), StatusCode::UNAUTHORIZED);
}
