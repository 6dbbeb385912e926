use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use ofroot_core::{Invoice, InvoiceStatus, Payment, PaymentStatus};
use ofroot_platform::{
    ApiError, AuthContext, CreateInvoiceRequest, CreatedInvoice, InvoiceApi,
    RecordPaymentRequest, UpdateInvoiceRequest,
};
use tokio::sync::RwLock;
use tracing::info;

/// Stand-in for the invoice backend, kept in process memory. Applies the
/// backend's transition rules so callers see realistic rejections.
#[derive(Default)]
pub struct InMemoryInvoiceApi {
    invoices: RwLock<BTreeMap<i64, Invoice>>,
    sequence: RwLock<i64>,
}

impl InMemoryInvoiceApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.invoices.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.invoices.read().await.is_empty()
    }
}

fn backend(status: u16, message: impl Into<String>) -> ApiError {
    ApiError::Backend {
        status,
        message: message.into(),
    }
}

fn not_found(invoice_id: i64) -> ApiError {
    backend(404, format!("invoice {invoice_id} not found"))
}

fn transition_allowed(from: InvoiceStatus, to: InvoiceStatus) -> bool {
    use InvoiceStatus::*;

    matches!(
        (from, to),
        (Draft, Sent) | (Sent, Paid) | (Draft, Void) | (Sent, Void) | (Paid, Void)
    ) || from == to
}

fn out_of_range(what: &str) -> ApiError {
    backend(422, format!("{what} is out of range"))
}

#[async_trait]
impl InvoiceApi for InMemoryInvoiceApi {
    async fn create_invoice(
        &self,
        auth: &AuthContext,
        request: &CreateInvoiceRequest,
    ) -> Result<CreatedInvoice, ApiError> {
        auth.require_token()?;
        if request.items.is_empty() {
            return Err(backend(422, "items are required"));
        }
        let amount_cents = request
            .items_total_cents()
            .ok_or_else(|| out_of_range("invoice total"))?;

        let mut sequence = self.sequence.write().await;
        *sequence += 1;
        let id = *sequence;

        let invoice = Invoice {
            id,
            number: Some(format!("INV-{id:04}")),
            status: InvoiceStatus::Draft,
            currency: request.currency,
            items: request.items.clone(),
            amount_cents,
            amount_paid_cents: 0,
            amount_due_cents: amount_cents,
            due_date: request.due_date.clone(),
            created_at: Some(Utc::now().to_rfc3339()),
            tenant_id: request.tenant_id.or(auth.tenant_id()),
            user_id: request.user_id,
            meta: request.meta.clone(),
            payments: Vec::new(),
        };

        info!(invoice_id = id, amount_cents = invoice.amount_cents, "sandbox invoice created");
        self.invoices.write().await.insert(id, invoice);

        Ok(CreatedInvoice { id })
    }

    async fn update_invoice(
        &self,
        auth: &AuthContext,
        invoice_id: i64,
        request: &UpdateInvoiceRequest,
    ) -> Result<(), ApiError> {
        auth.require_token()?;
        let mut invoices = self.invoices.write().await;
        let invoice = invoices
            .get_mut(&invoice_id)
            .ok_or_else(|| not_found(invoice_id))?;

        if let Some(target) = request.status {
            if !transition_allowed(invoice.status, target) {
                return Err(backend(
                    409,
                    format!("cannot move invoice from {} to {}", invoice.status, target),
                ));
            }
            invoice.status = target;
        }
        if let Some(tenant_id) = request.tenant_id {
            invoice.tenant_id = Some(tenant_id);
        }
        if let Some(user_id) = request.user_id {
            invoice.user_id = Some(user_id);
        }
        if let Some(meta) = &request.meta {
            invoice.meta = meta.clone();
        }

        Ok(())
    }

    async fn record_payment(
        &self,
        auth: &AuthContext,
        invoice_id: i64,
        request: &RecordPaymentRequest,
    ) -> Result<(), ApiError> {
        auth.require_token()?;
        if request.amount_cents <= 0 {
            return Err(backend(422, "amount_cents must be positive"));
        }

        let mut invoices = self.invoices.write().await;
        let invoice = invoices
            .get_mut(&invoice_id)
            .ok_or_else(|| not_found(invoice_id))?;

        if invoice.status == InvoiceStatus::Void {
            return Err(backend(409, "cannot record a payment on a void invoice"));
        }

        let status = request.status.unwrap_or(PaymentStatus::Succeeded);
        let amount_paid_cents = match status {
            PaymentStatus::Succeeded => invoice
                .amount_paid_cents
                .checked_add(request.amount_cents)
                .ok_or_else(|| out_of_range("amount paid"))?,
            PaymentStatus::Refunded if request.amount_cents > invoice.amount_paid_cents => {
                return Err(backend(422, "refund exceeds the amount paid"));
            }
            PaymentStatus::Refunded => invoice.amount_paid_cents - request.amount_cents,
            PaymentStatus::Pending | PaymentStatus::Failed => invoice.amount_paid_cents,
        };
        let amount_due_cents = invoice
            .amount_cents
            .checked_sub(amount_paid_cents)
            .ok_or_else(|| out_of_range("amount due"))?;

        invoice.payments.push(Payment {
            amount_cents: request.amount_cents,
            currency: request.currency.unwrap_or(invoice.currency),
            status,
            provider: request.provider.clone(),
            reference: request.reference.clone(),
            created_at: Some(Utc::now().to_rfc3339()),
        });

        invoice.amount_paid_cents = amount_paid_cents;
        invoice.amount_due_cents = amount_due_cents;

        if invoice.amount_due_cents <= 0 && invoice.status == InvoiceStatus::Sent {
            invoice.status = InvoiceStatus::Paid;
        }

        Ok(())
    }

    async fn send_invoice(&self, auth: &AuthContext, invoice_id: i64) -> Result<(), ApiError> {
        auth.require_token()?;
        let mut invoices = self.invoices.write().await;
        let invoice = invoices
            .get_mut(&invoice_id)
            .ok_or_else(|| not_found(invoice_id))?;

        match invoice.status {
            InvoiceStatus::Draft | InvoiceStatus::Sent => {
                invoice.status = InvoiceStatus::Sent;
                Ok(())
            }
            status => Err(backend(409, format!("cannot send a {status} invoice"))),
        }
    }

    async fn get_invoice(&self, auth: &AuthContext, invoice_id: i64) -> Result<Invoice, ApiError> {
        auth.require_token()?;
        self.invoices
            .read()
            .await
            .get(&invoice_id)
            .cloned()
            .ok_or_else(|| not_found(invoice_id))
    }

    async fn list_invoices(&self, auth: &AuthContext) -> Result<Vec<Invoice>, ApiError> {
        auth.require_token()?;
        Ok(self.invoices.read().await.values().cloned().collect())
    }
}
