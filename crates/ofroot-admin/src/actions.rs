//! Admin invoice actions.
//!
//! Every action returns an [`ActionResult`]; failures are converted at this
//! boundary and never escape as panics or raw errors. Nothing is retried:
//! a failed submission is re-sent by the user.

use std::{collections::BTreeMap, sync::Arc};

use ofroot_billing::{
    InvoiceComposer, InvoiceDraft, InvoicePreview, RawAmount, StatusChange, StatusGateError,
    Totals, ValidationReport, major_to_cents, next_due_for, suggested_transitions,
};
use ofroot_core::{
    Clock, Currency, Invoice, InvoiceStatus, PaymentStatus, SystemClock, format_minor_units,
};
use ofroot_platform::{
    ApiError, AuthContext, InvoiceApi, RecordPaymentRequest, UpdateInvoiceRequest,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Unauthorized,
    Validation,
    ConfirmationRequired,
    Backend,
}

#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("{}", .0.summary())]
    Validation(ValidationReport),

    #[error(transparent)]
    Confirmation(#[from] StatusGateError),

    /// The backend's message, verbatim.
    #[error("{0}")]
    Backend(String),
}

impl ActionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ActionError::Unauthorized => ErrorKind::Unauthorized,
            ActionError::Validation(_) => ErrorKind::Validation,
            ActionError::Confirmation(_) => ErrorKind::ConfirmationRequired,
            ActionError::Backend(_) => ErrorKind::Backend,
        }
    }
}

impl From<ApiError> for ActionError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Unauthorized => ActionError::Unauthorized,
            other => ActionError::Backend(other.to_string()),
        }
    }
}

impl From<ValidationReport> for ActionError {
    fn from(report: ValidationReport) -> Self {
        ActionError::Validation(report)
    }
}

/// `{ "ok": true, "data": ... }` or `{ "ok": false, "error": "...", ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult<T> {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<BTreeMap<String, String>>,
}

impl<T> ActionResult<T> {
    pub fn success(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
            kind: None,
            field_errors: None,
        }
    }

    pub fn failure(err: &ActionError) -> Self {
        let field_errors = match err {
            ActionError::Validation(report) => Some(report.field_errors.clone()),
            _ => None,
        };

        Self {
            ok: false,
            data: None,
            error: Some(err.to_string()),
            kind: Some(err.kind()),
            field_errors,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedInvoiceView {
    pub id: i64,
    pub totals: Totals,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceView {
    pub invoice: Invoice,
    pub next_due: Option<String>,
    pub suggested_transitions: Vec<InvoiceStatus>,
    pub amount_display: String,
    pub amount_due_display: String,
}

impl From<Invoice> for InvoiceView {
    fn from(invoice: Invoice) -> Self {
        Self {
            next_due: next_due_for(&invoice),
            suggested_transitions: suggested_transitions(invoice.status),
            amount_display: format_minor_units(invoice.amount_cents, invoice.currency),
            amount_due_display: format_minor_units(invoice.amount_due_cents, invoice.currency),
            invoice,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdateForm {
    pub status: InvoiceStatus,
    #[serde(default)]
    pub confirmed: bool,
}

/// Manual payment entry. `amount` is in major units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentForm {
    pub amount: RawAmount,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub status: Option<PaymentStatus>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
}

impl PaymentForm {
    pub fn to_request(&self) -> Result<RecordPaymentRequest, ValidationReport> {
        let mut errors = BTreeMap::new();

        let amount_cents = self
            .amount
            .to_decimal()
            .and_then(major_to_cents)
            .filter(|cents| *cents > 0);
        if amount_cents.is_none() {
            errors.insert(
                "amount".to_string(),
                "payment amount must be greater than zero".to_string(),
            );
        }

        let currency = match non_blank(self.currency.as_deref()) {
            Some(code) => match code.parse::<Currency>() {
                Ok(currency) => Some(currency),
                Err(err) => {
                    errors.insert("currency".to_string(), err.to_string());
                    None
                }
            },
            None => None,
        };

        match amount_cents {
            Some(amount_cents) if errors.is_empty() => Ok(RecordPaymentRequest {
                amount_cents,
                currency,
                status: self.status,
                provider: non_blank(self.provider.as_deref()).map(str::to_string),
                reference: non_blank(self.reference.as_deref()).map(str::to_string),
            }),
            _ => Err(ValidationReport::from_errors(errors)),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

pub struct InvoiceActions {
    api: Arc<dyn InvoiceApi>,
    composer: InvoiceComposer<Arc<dyn Clock>>,
}

impl InvoiceActions {
    pub fn new(api: Arc<dyn InvoiceApi>) -> Self {
        Self::with_clock(api, Arc::new(SystemClock))
    }

    pub fn with_clock(api: Arc<dyn InvoiceApi>, clock: Arc<dyn Clock>) -> Self {
        Self {
            api,
            composer: InvoiceComposer::new(clock),
        }
    }

    /// Totals, validation and next-due preview for the editor. Pure; no
    /// session needed.
    pub fn preview_invoice(&self, draft: &InvoiceDraft) -> ActionResult<InvoicePreview> {
        ActionResult::success(self.composer.preview(draft))
    }

    pub async fn create_invoice(
        &self,
        auth: &AuthContext,
        draft: &InvoiceDraft,
    ) -> ActionResult<CreatedInvoiceView> {
        let result = async {
            auth.require_token()?;
            let composed = self.composer.compose(draft)?;
            let created = self.api.create_invoice(auth, &composed.request).await?;
            Ok::<_, ActionError>(CreatedInvoiceView {
                id: created.id,
                totals: composed.totals,
            })
        }
        .await;

        finish("create_invoice", result)
    }

    pub async fn update_invoice_status(
        &self,
        auth: &AuthContext,
        invoice_id: i64,
        form: &StatusUpdateForm,
    ) -> ActionResult<()> {
        let result = async {
            auth.require_token()?;
            let change = StatusChange::request(form.status, form.confirmed)?;
            self.api
                .update_invoice(auth, invoice_id, &UpdateInvoiceRequest::status(change.target()))
                .await?;
            Ok::<_, ActionError>(())
        }
        .await;

        finish("update_invoice_status", result)
    }

    /// Reassigns tenant/user or replaces `meta`. Status changes go through
    /// [`Self::update_invoice_status`] so the confirmation gate applies.
    pub async fn update_invoice(
        &self,
        auth: &AuthContext,
        invoice_id: i64,
        patch: &UpdateInvoiceRequest,
    ) -> ActionResult<()> {
        let result = async {
            auth.require_token()?;
            if let Some(status) = patch.status {
                StatusChange::request(status, false)?;
            }
            if patch.is_empty() {
                return Err(ActionError::Validation(ValidationReport::single(
                    "invoice",
                    "nothing to update",
                )));
            }
            self.api.update_invoice(auth, invoice_id, patch).await?;
            Ok::<_, ActionError>(())
        }
        .await;

        finish("update_invoice", result)
    }

    pub async fn record_payment(
        &self,
        auth: &AuthContext,
        invoice_id: i64,
        form: &PaymentForm,
    ) -> ActionResult<()> {
        let result = async {
            auth.require_token()?;
            let request = form.to_request()?;
            self.api.record_payment(auth, invoice_id, &request).await?;
            Ok::<_, ActionError>(())
        }
        .await;

        finish("record_payment", result)
    }

    pub async fn send_invoice(&self, auth: &AuthContext, invoice_id: i64) -> ActionResult<()> {
        let result = async {
            auth.require_token()?;
            self.api.send_invoice(auth, invoice_id).await?;
            Ok::<_, ActionError>(())
        }
        .await;

        finish("send_invoice", result)
    }

    pub async fn get_invoice(&self, auth: &AuthContext, invoice_id: i64) -> ActionResult<InvoiceView> {
        let result = async {
            auth.require_token()?;
            let invoice = self.api.get_invoice(auth, invoice_id).await?;
            Ok::<_, ActionError>(InvoiceView::from(invoice))
        }
        .await;

        finish("get_invoice", result)
    }

    pub async fn list_invoices(&self, auth: &AuthContext) -> ActionResult<Vec<InvoiceView>> {
        let result = async {
            auth.require_token()?;
            let invoices = self.api.list_invoices(auth).await?;
            Ok::<_, ActionError>(invoices.into_iter().map(InvoiceView::from).collect())
        }
        .await;

        finish("list_invoices", result)
    }
}

fn finish<T>(action: &'static str, result: Result<T, ActionError>) -> ActionResult<T> {
    match result {
        Ok(data) => {
            info!(action, "invoice action succeeded");
            ActionResult::success(data)
        }
        Err(err) => {
            warn!(action, kind = ?err.kind(), "invoice action failed: {err}");
            ActionResult::failure(&err)
        }
    }
}
