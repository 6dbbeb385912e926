pub mod amount;
pub mod composer;
pub mod draft;
pub mod line_items;
pub mod recurrence;
pub mod status;
pub mod totals;
pub mod validation;

pub use amount::{RawAmount, major_to_cents};
pub use composer::{ComposedInvoice, InvoiceComposer, InvoicePreview};
pub use draft::{InvoiceDraft, RawLineItem, RecurringDraft};
pub use line_items::normalize_line_items;
pub use recurrence::{compute_next_due, next_due_for, parse_base_date};
pub use status::{StatusChange, StatusGateError, suggested_transitions};
pub use totals::{
    TAX_LINE_DESCRIPTION, Totals, checked_billed_cents, compute_totals, tax_line_item,
};
pub use validation::{ValidationReport, validate_draft};
