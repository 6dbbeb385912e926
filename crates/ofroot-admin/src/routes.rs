use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header::COOKIE},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use ofroot_billing::InvoiceDraft;
use ofroot_platform::{AuthContext, UpdateInvoiceRequest};
use serde::Serialize;
use serde_json::json;

use crate::actions::{ActionResult, ErrorKind, InvoiceActions, PaymentForm, StatusUpdateForm};

const LOGIN_PATH: &str = "/login";

#[derive(Clone)]
pub struct AppState {
    actions: Arc<InvoiceActions>,
    session_cookie: Arc<str>,
}

impl AppState {
    pub fn new(actions: InvoiceActions, session_cookie: &str) -> Self {
        Self {
            actions: Arc::new(actions),
            session_cookie: Arc::from(session_cookie),
        }
    }

    /// The session cookie is the only ambient input; it is lifted into an
    /// explicit context here and passed down.
    fn auth(&self, headers: &HeaderMap) -> AuthContext {
        let cookie_header = headers.get(COOKIE).and_then(|value| value.to_str().ok());
        AuthContext::from_cookie_header(cookie_header, &self.session_cookie)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/actions/invoices/preview", post(preview_invoice))
        .route(
            "/actions/invoices",
            get(list_invoices).post(create_invoice),
        )
        .route(
            "/actions/invoices/{invoice_id}",
            get(get_invoice).patch(update_invoice),
        )
        .route(
            "/actions/invoices/{invoice_id}/status",
            post(update_invoice_status),
        )
        .route(
            "/actions/invoices/{invoice_id}/payments",
            post(record_payment),
        )
        .route("/actions/invoices/{invoice_id}/send", post(send_invoice))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

fn respond<T: Serialize>(result: ActionResult<T>) -> Response {
    let status = match result.kind {
        None => StatusCode::OK,
        Some(ErrorKind::Unauthorized) => StatusCode::UNAUTHORIZED,
        Some(ErrorKind::Validation) => StatusCode::UNPROCESSABLE_ENTITY,
        Some(ErrorKind::ConfirmationRequired) => StatusCode::CONFLICT,
        Some(ErrorKind::Backend) => StatusCode::BAD_GATEWAY,
    };

    if result.kind == Some(ErrorKind::Unauthorized) {
        let body = json!({
            "ok": false,
            "error": result.error,
            "kind": result.kind,
            "redirect": LOGIN_PATH,
        });
        return (status, Json(body)).into_response();
    }

    (status, Json(result)).into_response()
}

async fn preview_invoice(
    State(state): State<AppState>,
    Json(draft): Json<InvoiceDraft>,
) -> Response {
    respond(state.actions.preview_invoice(&draft))
}

async fn create_invoice(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(draft): Json<InvoiceDraft>,
) -> Response {
    let auth = state.auth(&headers);
    respond(state.actions.create_invoice(&auth, &draft).await)
}

async fn list_invoices(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let auth = state.auth(&headers);
    respond(state.actions.list_invoices(&auth).await)
}

async fn get_invoice(
    State(state): State<AppState>,
    Path(invoice_id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    let auth = state.auth(&headers);
    respond(state.actions.get_invoice(&auth, invoice_id).await)
}

async fn update_invoice(
    State(state): State<AppState>,
    Path(invoice_id): Path<i64>,
    headers: HeaderMap,
    Json(patch): Json<UpdateInvoiceRequest>,
) -> Response {
    let auth = state.auth(&headers);
    respond(state.actions.update_invoice(&auth, invoice_id, &patch).await)
}

async fn update_invoice_status(
    State(state): State<AppState>,
    Path(invoice_id): Path<i64>,
    headers: HeaderMap,
    Json(form): Json<StatusUpdateForm>,
) -> Response {
    let auth = state.auth(&headers);
    respond(
        state
            .actions
            .update_invoice_status(&auth, invoice_id, &form)
            .await,
    )
}

async fn record_payment(
    State(state): State<AppState>,
    Path(invoice_id): Path<i64>,
    headers: HeaderMap,
    Json(form): Json<PaymentForm>,
) -> Response {
    let auth = state.auth(&headers);
    respond(state.actions.record_payment(&auth, invoice_id, &form).await)
}

async fn send_invoice(
    State(state): State<AppState>,
    Path(invoice_id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    let auth = state.auth(&headers);
    respond(state.actions.send_invoice(&auth, invoice_id).await)
}
