use ofroot_core::{LineItem, checked_items_total};
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};

use crate::amount::round_to_i64;

pub const TAX_LINE_DESCRIPTION: &str = "Tax";

/// Preview figures in minor units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
}

impl Totals {
    /// What the backend will store once the tax line is appended. The
    /// discount is not part of it.
    pub fn billed_cents(&self) -> i64 {
        self.subtotal_cents.saturating_add(self.tax_cents)
    }
}

/// `tax_percent` is a percentage (`10` means 10%); `discount_amount` is in
/// major units. The total is floored at zero.
pub fn compute_totals(
    items: &[LineItem],
    tax_percent: Option<Decimal>,
    discount_amount: Option<Decimal>,
) -> Totals {
    let subtotal_cents = items
        .iter()
        .map(LineItem::line_total_cents)
        .fold(0i64, i64::saturating_add);

    let tax_cents = match tax_percent {
        Some(percent) if percent > Decimal::ZERO => Decimal::from(subtotal_cents)
            .checked_mul(percent)
            .map(|scaled| round_to_i64(scaled / Decimal::ONE_HUNDRED))
            .unwrap_or(i64::MAX),
        _ => 0,
    };

    let discount_cents = discount_amount
        .map(|amount| amount.max(Decimal::ZERO))
        .map(|amount| {
            amount
                .checked_mul(Decimal::ONE_HUNDRED)
                .map(round_to_i64)
                .unwrap_or(i64::MAX)
        })
        .unwrap_or(0);

    let total_cents = subtotal_cents
        .saturating_add(tax_cents)
        .saturating_sub(discount_cents)
        .max(0);

    Totals {
        subtotal_cents,
        tax_cents,
        discount_cents,
        total_cents,
    }
}

/// Subtotal plus tax as the backend will store it, or `None` when that does
/// not fit in `i64` cents. Preview totals saturate instead.
pub fn checked_billed_cents(items: &[LineItem], tax_percent: Option<Decimal>) -> Option<i64> {
    let subtotal_cents = checked_items_total(items)?;
    let tax_cents = match tax_percent {
        Some(percent) if percent > Decimal::ZERO => Decimal::from(subtotal_cents)
            .checked_mul(percent)?
            .checked_div(Decimal::ONE_HUNDRED)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()?,
        _ => 0,
    };
    subtotal_cents.checked_add(tax_cents)
}

/// Tax travels to the backend as an ordinary line so its stored total
/// matches the preview. Discounts never do.
pub fn tax_line_item(totals: &Totals) -> Option<LineItem> {
    (totals.tax_cents > 0).then(|| LineItem {
        description: TAX_LINE_DESCRIPTION.to_string(),
        quantity: 1,
        unit_amount_cents: totals.tax_cents,
    })
}
