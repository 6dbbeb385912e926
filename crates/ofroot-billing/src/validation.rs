use std::collections::BTreeMap;

use ofroot_core::{Currency, RecurringSchedule};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    amount::{RawAmount, major_to_cents},
    draft::{InvoiceDraft, RawLineItem},
    line_items::{normalize_line_items, normalize_quantity},
    recurrence::parse_base_date,
    totals::checked_billed_cents,
};

pub const DUE_DATE_REQUIRED: &str = "due date required for recurring invoices";

/// Field-keyed outcome shared by the live preview and the submit path.
/// Keys are `currency`, `due_date`, `items`, `items.{index}.description`,
/// `items.{index}.unit_amount`, `recurring.count`, `tax_percent` and
/// `discount_amount`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub field_errors: BTreeMap<String, String>,
}

impl ValidationReport {
    pub fn from_errors(field_errors: BTreeMap<String, String>) -> Self {
        Self {
            valid: field_errors.is_empty(),
            field_errors,
        }
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        Self::from_errors(BTreeMap::from([(field.to_string(), message.into())]))
    }

    pub fn error(&self, field: &str) -> Option<&str> {
        self.field_errors.get(field).map(String::as_str)
    }

    /// One line for toasts: every message, in field order.
    pub fn summary(&self) -> String {
        self.field_errors
            .values()
            .cloned()
            .collect::<Vec<_>>()
            .join("; ")
    }
}

pub fn validate_draft(draft: &InvoiceDraft) -> ValidationReport {
    let mut errors = BTreeMap::new();

    match draft.currency.trim() {
        "" => {
            errors.insert("currency".to_string(), "currency is required".to_string());
        }
        code => {
            if code.parse::<Currency>().is_err() {
                errors.insert(
                    "currency".to_string(),
                    format!("unsupported currency {code:?}; use usd, eur or gbp"),
                );
            }
        }
    }

    for (index, row) in draft.items.iter().enumerate() {
        if row.is_blank() {
            continue;
        }
        if row.description.trim().is_empty() {
            errors.insert(
                format!("items.{index}.description"),
                "description is required".to_string(),
            );
        }
        if let Some(message) = unit_amount_error(row) {
            errors.insert(format!("items.{index}.unit_amount"), message.to_string());
        }
    }

    let items = normalize_line_items(&draft.items);
    let tax_percent = draft.tax_percent.as_ref().and_then(RawAmount::to_decimal);
    if items.is_empty() {
        errors.insert(
            "items".to_string(),
            "add at least one line item with a description and an amount".to_string(),
        );
    } else if checked_billed_cents(&items, tax_percent).is_none() {
        errors.insert("items".to_string(), "invoice total is too large".to_string());
    }

    match draft.due_date_input() {
        Some(raw) if parse_base_date(raw).is_none() => {
            errors.insert(
                "due_date".to_string(),
                "due date must be a date (YYYY-MM-DD)".to_string(),
            );
        }
        None if draft.recurring.is_some() => {
            errors.insert("due_date".to_string(), DUE_DATE_REQUIRED.to_string());
        }
        _ => {}
    }

    if let Some(recurring) = &draft.recurring {
        if !(RecurringSchedule::MIN_COUNT..=RecurringSchedule::MAX_COUNT).contains(&recurring.count)
        {
            errors.insert(
                "recurring.count".to_string(),
                format!(
                    "recurring count must be between {} and {}",
                    RecurringSchedule::MIN_COUNT,
                    RecurringSchedule::MAX_COUNT
                ),
            );
        }
    }

    if let Some(message) = check_amount(draft.tax_percent.as_ref(), "tax percent", |value| {
        (value < Decimal::ZERO).then_some("tax percent cannot be negative")
    }) {
        errors.insert("tax_percent".to_string(), message);
    }

    if let Some(message) = check_amount(draft.discount_amount.as_ref(), "discount", |value| {
        (value < Decimal::ZERO).then_some("discount cannot be negative")
    }) {
        errors.insert("discount_amount".to_string(), message);
    }

    ValidationReport::from_errors(errors)
}

/// The row's line total must fit in `i64` cents along with its amount.
fn unit_amount_error(row: &RawLineItem) -> Option<&'static str> {
    let Some(raw) = row.unit_amount.as_ref().filter(|amount| !amount.is_blank()) else {
        return Some("amount is required");
    };
    let Some(value) = raw.to_decimal() else {
        return Some("amount must be a number");
    };
    if value <= Decimal::ZERO {
        return Some("amount must be greater than zero");
    }
    let Some(cents) = major_to_cents(value) else {
        return Some("amount is too large");
    };
    if cents <= 0 {
        return Some("amount must be greater than zero");
    }
    let quantity = i64::from(normalize_quantity(row.quantity.as_ref()));
    quantity
        .checked_mul(cents)
        .is_none()
        .then_some("line total is too large")
}

fn check_amount(
    raw: Option<&RawAmount>,
    label: &str,
    rule: impl Fn(Decimal) -> Option<&'static str>,
) -> Option<String> {
    let raw = raw.filter(|raw| !raw.is_blank())?;
    match raw.to_decimal() {
        Some(value) => rule(value).map(str::to_string),
        None => Some(format!("{label} must be a number")),
    }
}
