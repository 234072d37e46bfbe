mod common;

use axum::http::{header, Method, StatusCode};
use serde_json::json;

use common::{body_bytes, body_json, TestApp};

async fn seed_visit(app: &TestApp) -> i64 {
    let company = app.seed_company("Acme").await;
    let branch = app.seed_branch(company.id, "Downtown").await;

    let response = app
        .request(
            Method::POST,
            "/api/visits/start",
            Some(json!({"branch_id": branch.id})),
            Some(&app.employee.token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["id"].as_i64().unwrap()
}

#[tokio::test]
async fn pdf_endpoint_serves_inline_pdf() {
    let app = TestApp::new().await;
    let visit_id = seed_visit(&app).await;

    app.request(
        Method::PUT,
        &format!("/api/visits/{visit_id}/cash"),
        Some(json!({"system_balance": "500.00", "actual_balance": "480.00", "sales_amount": "120.00"})),
        Some(&app.employee.token),
    )
    .await;
    app.request(
        Method::POST,
        &format!("/api/visits/{visit_id}/inventory"),
        Some(json!({"items": [{"item_name": "shirt", "system_qty": 4, "actual_qty": 4}]})),
        Some(&app.employee.token),
    )
    .await;

    let response = app
        .request(
            Method::GET,
            &format!("/api/visits/{visit_id}/pdf"),
            None,
            Some(&app.employee.token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/pdf"
    );
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("inline"));

    let bytes = body_bytes(response).await;
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn pdf_for_missing_visit_is_not_found() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::GET, "/api/visits/999/pdf", None, Some(&app.manager.token))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn report_defaults_cash_to_zero_without_a_record() {
    let app = TestApp::new().await;
    let visit_id = seed_visit(&app).await;

    let report = app.state.services.reports.build(visit_id).await.unwrap();
    assert_eq!(report.cash.system_balance, rust_decimal::Decimal::ZERO);
    assert_eq!(report.cash.discrepancy(), rust_decimal::Decimal::ZERO);
    assert!(report.items.is_empty());
    assert_eq!(report.company_name, "Acme");
    assert_eq!(report.branch_name, "Downtown");
    assert_eq!(report.employee_name, "Evan Employee");
}

#[tokio::test]
async fn notes_appear_in_report_in_insertion_order() {
    let app = TestApp::new().await;
    let visit_id = seed_visit(&app).await;

    for text in ["first observation", "second observation"] {
        let response = app
            .request(
                Method::POST,
                &format!("/api/visits/{visit_id}/notes"),
                Some(json!({"text": text})),
                Some(&app.employee.token),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let report = app.state.services.reports.build(visit_id).await.unwrap();
    assert_eq!(report.notes, vec!["first observation", "second observation"]);
}
