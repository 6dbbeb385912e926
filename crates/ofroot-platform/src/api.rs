use async_trait::async_trait;
use ofroot_core::Invoice;

use crate::{
    AuthContext, CreateInvoiceRequest, CreatedInvoice, RecordPaymentRequest,
    UpdateInvoiceRequest, error::ApiError,
};

/// The external invoice backend. Transition rules, stored totals and
/// `amount_due_cents` are owned by the implementation, not by callers.
#[async_trait]
pub trait InvoiceApi: Send + Sync {
    async fn create_invoice(
        &self,
        auth: &AuthContext,
        request: &CreateInvoiceRequest,
    ) -> Result<CreatedInvoice, ApiError>;

    async fn update_invoice(
        &self,
        auth: &AuthContext,
        invoice_id: i64,
        request: &UpdateInvoiceRequest,
    ) -> Result<(), ApiError>;

    async fn record_payment(
        &self,
        auth: &AuthContext,
        invoice_id: i64,
        request: &RecordPaymentRequest,
    ) -> Result<(), ApiError>;

    async fn send_invoice(&self, auth: &AuthContext, invoice_id: i64) -> Result<(), ApiError>;

    async fn get_invoice(&self, auth: &AuthContext, invoice_id: i64) -> Result<Invoice, ApiError>;

    async fn list_invoices(&self, auth: &AuthContext) -> Result<Vec<Invoice>, ApiError>;
}
