use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use chrono::NaiveDate;
use ofroot_admin::{AppState, InvoiceActions, router};
use ofroot_core::FixedClock;
use ofroot_sandbox::InMemoryInvoiceApi;
use serde_json::{Value, json};
use tower::ServiceExt;

fn app() -> Router {
    let actions = InvoiceActions::with_clock(
        Arc::new(InMemoryInvoiceApi::new()),
        Arc::new(FixedClock(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())),
    );
    router(AppState::new(actions, "token"))
}

fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn draft() -> Value {
    json!({
        "currency": "USD",
        "due_date": "2024-01-15",
        "items": [
            { "description": "Work", "quantity": 2, "unit_amount": "10.00" },
            { "description": "", "quantity": 1, "unit_amount": "" }
        ],
        "tax_percent": 10,
        "discount_amount": "1.23"
    })
}

#[tokio::test]
async fn healthz_is_open() {
    let response = app()
        .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn preview_returns_totals_without_session() {
    let app = app();
    let (status, body) = call(
        &app,
        json_request("POST", "/actions/invoices/preview", None, draft()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], json!(true));
    assert_eq!(body["data"]["totals"]["total_cents"], json!(2077));
    assert_eq!(body["data"]["validation"]["valid"], json!(true));
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn missing_cookie_redirects_to_login() {
    let app = app();
    let (status, body) = call(
        &app,
        json_request("POST", "/actions/invoices", None, draft()),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["kind"], json!("unauthorized"));
    assert_eq!(body["redirect"], json!("/login"));
}

#[tokio::test]
async fn invalid_draft_is_unprocessable() {
    let app = app();
    let (status, body) = call(
        &app,
        json_request(
            "POST",
            "/actions/invoices",
            Some("token=abc"),
            json!({ "currency": "jpy", "items": [] }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], json!("validation"));
    assert!(body["field_errors"]["currency"].is_string());
    assert!(body["field_errors"]["items"].is_string());
}

#[tokio::test]
async fn create_send_and_confirm_payment_status() {
    let app = app();
    let cookie = Some("theme=dark; token=abc");

    let (status, body) = call(
        &app,
        json_request("POST", "/actions/invoices", cookie, draft()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["totals"]["total_cents"], json!(2077));

    let (status, _) = call(
        &app,
        json_request("POST", &format!("/actions/invoices/{id}/send"), cookie, Value::Null),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(
        &app,
        json_request(
            "POST",
            &format!("/actions/invoices/{id}/status"),
            cookie,
            json!({ "status": "paid" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], json!("confirmation_required"));

    let (status, _) = call(
        &app,
        json_request(
            "POST",
            &format!("/actions/invoices/{id}/payments"),
            cookie,
            json!({ "amount": "22.00" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let request = Request::get(format!("/actions/invoices/{id}"))
        .header(header::COOKIE, "token=abc")
        .body(Body::empty())
        .unwrap();
    let (status, body) = call(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["invoice"]["status"], json!("paid"));
    assert_eq!(body["data"]["amount_due_display"], json!("$0.00"));
}

#[tokio::test]
async fn backend_rejections_are_bad_gateway() {
    let app = app();
    let request = Request::get("/actions/invoices/404")
        .header(header::COOKIE, "token=abc")
        .body(Body::empty())
        .unwrap();

    let (status, body) = call(&app, request).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], json!("invoice 404 not found"));
}
