use ofroot_core::{
    Clock, Currency, InvoiceMeta, LineItem, RecurringSchedule, SystemClock, UnsupportedCurrency,
};
use ofroot_platform::CreateInvoiceRequest;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::{
    amount::RawAmount,
    draft::InvoiceDraft,
    line_items::normalize_line_items,
    recurrence::{next_due_date, parse_base_date},
    totals::{Totals, compute_totals, tax_line_item},
    validation::{ValidationReport, validate_draft},
};

/// Live view of the editor: runs on invalid drafts too.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoicePreview {
    pub validation: ValidationReport,
    pub items: Vec<LineItem>,
    pub totals: Totals,
    pub next_due: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComposedInvoice {
    pub request: CreateInvoiceRequest,
    pub totals: Totals,
}

pub struct InvoiceComposer<C: Clock = SystemClock> {
    clock: C,
}

impl Default for InvoiceComposer<SystemClock> {
    fn default() -> Self {
        Self::new(SystemClock)
    }
}

impl<C: Clock> InvoiceComposer<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    pub fn preview(&self, draft: &InvoiceDraft) -> InvoicePreview {
        let items = normalize_line_items(&draft.items);
        let totals = compute_totals(
            &items,
            decimal_input(draft.tax_percent.as_ref()),
            decimal_input(draft.discount_amount.as_ref()),
        );

        InvoicePreview {
            validation: validate_draft(draft),
            items,
            totals,
            next_due: self.preview_next_due(draft),
        }
    }

    /// Builds the create request: normalized lines, a synthetic tax line when
    /// tax applies, and the informational discount in `meta`.
    pub fn compose(&self, draft: &InvoiceDraft) -> Result<ComposedInvoice, ValidationReport> {
        let report = validate_draft(draft);
        if !report.valid {
            debug!(errors = report.field_errors.len(), "invoice draft rejected");
            return Err(report);
        }

        let currency: Currency = draft
            .currency
            .parse()
            .map_err(|err: UnsupportedCurrency| {
                ValidationReport::single("currency", err.to_string())
            })?;

        let tax_percent = decimal_input(draft.tax_percent.as_ref());
        let discount_amount = decimal_input(draft.discount_amount.as_ref());

        let mut items = normalize_line_items(&draft.items);
        let totals = compute_totals(&items, tax_percent, discount_amount);
        items.extend(tax_line_item(&totals));

        let meta = InvoiceMeta {
            bill_to: draft.bill_to_input().map(str::to_string),
            tax_percent: tax_percent.filter(|percent| *percent > Decimal::ZERO),
            discount_preview_amount: discount_amount.filter(|amount| *amount > Decimal::ZERO),
            recurring: draft
                .recurring
                .as_ref()
                .map(|recurring| RecurringSchedule::new(recurring.every, recurring.count)),
            ..InvoiceMeta::default()
        };

        let due_date = draft
            .due_date_input()
            .and_then(parse_base_date)
            .map(|date| date.format("%Y-%m-%d").to_string());

        let request = CreateInvoiceRequest {
            currency,
            due_date,
            tenant_id: draft.tenant_id,
            user_id: draft.user_id,
            items,
            meta,
        };

        debug!(
            items = request.items.len(),
            billed_cents = ?request.items_total_cents(),
            preview_total_cents = totals.total_cents,
            "invoice draft composed"
        );

        Ok(ComposedInvoice { request, totals })
    }

    fn preview_next_due(&self, draft: &InvoiceDraft) -> Option<String> {
        let recurring = draft.recurring.as_ref()?;
        let base = match draft.due_date_input() {
            Some(raw) => parse_base_date(raw)?,
            None => self.clock.today(),
        };
        let schedule = RecurringSchedule::new(recurring.every, recurring.count);
        next_due_date(base, &schedule).map(|date| date.format("%Y-%m-%d").to_string())
    }
}

fn decimal_input(raw: Option<&RawAmount>) -> Option<Decimal> {
    raw.and_then(RawAmount::to_decimal)
}
