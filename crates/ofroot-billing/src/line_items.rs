use ofroot_core::LineItem;
use rust_decimal::{Decimal, prelude::ToPrimitive};

use crate::{
    amount::{RawAmount, major_to_cents},
    draft::RawLineItem,
};

/// Turns editor rows into submittable lines.
///
/// Rows with a blank description or a non-positive amount are dropped
/// silently; an empty result is the caller's validation failure.
pub fn normalize_line_items(raw: &[RawLineItem]) -> Vec<LineItem> {
    raw.iter().filter_map(normalize_line_item).collect()
}

fn normalize_line_item(raw: &RawLineItem) -> Option<LineItem> {
    let description = raw.description.trim();
    if description.is_empty() {
        return None;
    }

    let unit_amount_cents = unit_amount_cents(raw.unit_amount.as_ref());
    if unit_amount_cents <= 0 {
        return None;
    }

    Some(LineItem {
        description: description.to_string(),
        quantity: normalize_quantity(raw.quantity.as_ref()),
        unit_amount_cents,
    })
}

/// Positive inputs are truncated to whole units, never below 1. Anything
/// else becomes 1.
pub(crate) fn normalize_quantity(raw: Option<&RawAmount>) -> u32 {
    match raw.and_then(RawAmount::to_decimal) {
        Some(value) if value > Decimal::ZERO => value.trunc().to_u32().unwrap_or(u32::MAX).max(1),
        _ => 1,
    }
}

fn unit_amount_cents(raw: Option<&RawAmount>) -> i64 {
    raw.and_then(RawAmount::to_decimal)
        .and_then(major_to_cents)
        .unwrap_or(0)
        .max(0)
}
