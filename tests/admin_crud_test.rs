mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{body_json, TestApp};

#[tokio::test]
async fn company_crud_and_listing() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/admin/companies",
            Some(json!({"name": "Acme"})),
            Some(&app.admin.token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let company = body_json(response).await;
    let company_id = company["id"].as_i64().unwrap();
    assert_eq!(company["name"], "Acme");

    let response = app
        .request(
            Method::PUT,
            &format!("/api/admin/companies/{company_id}"),
            Some(json!({"name": "Acme Retail"})),
            Some(&app.manager.token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["name"], "Acme Retail");

    // Visible to any authenticated role through the read endpoint.
    let response = app
        .request(Method::GET, "/api/companies", None, Some(&app.employee.token))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let companies = body_json(response).await;
    assert_eq!(companies.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn company_mutation_is_role_gated() {
    let app = TestApp::new().await;
    let company = app.seed_company("Acme").await;

    let response = app
        .request(
            Method::POST,
            "/api/admin/companies",
            Some(json!({"name": "Rogue Co"})),
            Some(&app.employee.token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Deleting a company is admin-only; managers are refused.
    let response = app
        .request(
            Method::DELETE,
            &format!("/api/admin/companies/{}", company.id),
            None,
            Some(&app.manager.token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/admin/companies/{}", company.id),
            None,
            Some(&app.admin.token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Idempotent: deleting again still succeeds.
    let response = app
        .request(
            Method::DELETE,
            &format!("/api/admin/companies/{}", company.id),
            None,
            Some(&app.admin.token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn branch_listing_filters_by_company() {
    let app = TestApp::new().await;
    let acme = app.seed_company("Acme").await;
    let globex = app.seed_company("Globex").await;
    app.seed_branch(acme.id, "Downtown").await;
    app.seed_branch(acme.id, "Airport").await;
    app.seed_branch(globex.id, "Harbor").await;

    let response = app
        .request(
            Method::GET,
            &format!("/api/branches?company_id={}", acme.id),
            None,
            Some(&app.employee.token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let branches = body_json(response).await;
    assert_eq!(branches.as_array().unwrap().len(), 2);

    let response = app
        .request(Method::GET, "/api/branches", None, Some(&app.employee.token))
        .await;
    let branches = body_json(response).await;
    assert_eq!(branches.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn admin_branch_listing_is_gated_and_filters_by_company() {
    let app = TestApp::new().await;
    let acme = app.seed_company("Acme").await;
    let globex = app.seed_company("Globex").await;
    app.seed_branch(acme.id, "Downtown").await;
    app.seed_branch(acme.id, "Airport").await;
    app.seed_branch(globex.id, "Harbor").await;

    let response = app
        .request(Method::GET, "/api/admin/branches", None, Some(&app.manager.token))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let branches = body_json(response).await;
    assert_eq!(branches.as_array().unwrap().len(), 3);

    let response = app
        .request(
            Method::GET,
            &format!("/api/admin/branches?company_id={}", acme.id),
            None,
            Some(&app.admin.token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let branches = body_json(response).await;
    assert_eq!(branches.as_array().unwrap().len(), 2);

    let response = app
        .request(Method::GET, "/api/admin/branches", None, Some(&app.employee.token))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn managers_can_manage_branches_and_recipients() {
    let app = TestApp::new().await;
    let company = app.seed_company("Acme").await;

    let response = app
        .request(
            Method::POST,
            "/api/admin/branches",
            Some(json!({"company_id": company.id, "name": "Downtown", "location": "Main St"})),
            Some(&app.manager.token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let branch = body_json(response).await;
    let branch_id = branch["id"].as_i64().unwrap();

    let response = app
        .request(
            Method::POST,
            "/api/admin/recipients",
            Some(json!({"branch_id": branch_id, "name": "Ops", "email": "ops@example.com"})),
            Some(&app.manager.token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let recipient = body_json(response).await;
    assert_eq!(recipient["notify_email"], true);
    let recipient_id = recipient["id"].as_i64().unwrap();

    let response = app
        .request(
            Method::PUT,
            &format!("/api/admin/recipients/{recipient_id}"),
            Some(json!({"branch_id": branch_id, "name": "Ops", "email": "ops@example.com", "notify_email": false})),
            Some(&app.manager.token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["notify_email"], false);

    // Deletes are admin-only even on this shared surface.
    let response = app
        .request(
            Method::DELETE,
            &format!("/api/admin/recipients/{recipient_id}"),
            None,
            Some(&app.manager.token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/admin/recipients/{recipient_id}"),
            None,
            Some(&app.admin.token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/admin/branches/{branch_id}"),
            None,
            Some(&app.admin.token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn recipient_with_implausible_email_is_rejected() {
    let app = TestApp::new().await;
    let company = app.seed_company("Acme").await;
    let branch = app.seed_branch(company.id, "Downtown").await;

    let response = app
        .request(
            Method::POST,
            "/api/admin/recipients",
            Some(json!({"branch_id": branch.id, "name": "Ops", "email": "nonsense"})),
            Some(&app.admin.token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn user_accounts_crud() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/admin/users",
            Some(json!({
                "full_name": "New Inspector",
                "email": "inspector@example.com",
                "password": "inspector-pass-123",
                "role": "employee"
            })),
            Some(&app.admin.token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let created = body_json(response).await;
    let user_id = created["id"].as_i64().unwrap();
    assert_eq!(created["role"], "employee");
    assert!(created.get("password_hash").is_none());

    // The fresh account can authenticate.
    let response = app
        .request(
            Method::POST,
            "/api/auth/login",
            Some(json!({"email": "inspector@example.com", "password": "inspector-pass-123"})),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Duplicate email is rejected.
    let response = app
        .request(
            Method::POST,
            "/api/admin/users",
            Some(json!({
                "full_name": "Duplicate",
                "email": "inspector@example.com",
                "password": "another-pass-123",
                "role": "employee"
            })),
            Some(&app.admin.token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Promote and reset the password in one update.
    let response = app
        .request(
            Method::PUT,
            &format!("/api/admin/users/{user_id}"),
            Some(json!({
                "full_name": "New Inspector",
                "email": "inspector@example.com",
                "role": "manager",
                "password": "rotated-pass-123"
            })),
            Some(&app.admin.token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["role"], "manager");

    let response = app
        .request(
            Method::POST,
            "/api/auth/login",
            Some(json!({"email": "inspector@example.com", "password": "rotated-pass-123"})),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Old password no longer works.
    let response = app
        .request(
            Method::POST,
            "/api/auth/login",
            Some(json!({"email": "inspector@example.com", "password": "inspector-pass-123"})),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Deleting accounts is admin-only.
    let response = app
        .request(
            Method::DELETE,
            &format!("/api/admin/users/{user_id}"),
            None,
            Some(&app.manager.token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/admin/users/{user_id}"),
            None,
            Some(&app.admin.token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn password_endpoint_rotates_credentials() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/admin/users",
            Some(json!({
                "full_name": "Rotating",
                "email": "rotating@example.com",
                "password": "first-pass-123",
                "role": "employee"
            })),
            Some(&app.admin.token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let user_id = body_json(response).await["id"].as_i64().unwrap();

    let response = app
        .request(
            Method::PUT,
            &format!("/api/admin/users/{user_id}/password"),
            Some(json!({"password": "short"})),
            Some(&app.manager.token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .request(
            Method::PUT,
            &format!("/api/admin/users/{user_id}/password"),
            Some(json!({"password": "second-pass-123"})),
            Some(&app.manager.token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request(
            Method::POST,
            "/api/auth/login",
            Some(json!({"email": "rotating@example.com", "password": "first-pass-123"})),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .request(
            Method::POST,
            "/api/auth/login",
            Some(json!({"email": "rotating@example.com", "password": "second-pass-123"})),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn short_passwords_are_rejected_on_create() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/admin/users",
            Some(json!({
                "full_name": "Weak",
                "email": "weak@example.com",
                "password": "short",
                "role": "employee"
            })),
            Some(&app.admin.token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn user_listing_never_exposes_hashes() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::GET, "/api/admin/users", None, Some(&app.manager.token))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let users = body_json(response).await;
    let users = users.as_array().unwrap();
    assert_eq!(users.len(), 3);
    for user in users {
        assert!(user.get("password_hash").is_none());
        assert!(user["email"].as_str().unwrap().contains('@'));
    }
}
