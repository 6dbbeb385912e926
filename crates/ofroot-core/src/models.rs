use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::currency::Currency;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
    Void,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Void => "void",
        }
    }

    /// Target statuses that need an explicit confirmation before being requested.
    pub fn requires_confirmation(&self) -> bool {
        matches!(self, InvoiceStatus::Paid | InvoiceStatus::Void)
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A billable line. `unit_amount_cents` is in minor units.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LineItem {
    pub description: String,
    pub quantity: u32,
    pub unit_amount_cents: i64,
}

impl LineItem {
    /// Saturates at `i64::MAX`; use for display only.
    pub fn line_total_cents(&self) -> i64 {
        i64::from(self.quantity).saturating_mul(self.unit_amount_cents)
    }

    pub fn checked_total_cents(&self) -> Option<i64> {
        i64::from(self.quantity).checked_mul(self.unit_amount_cents)
    }
}

/// Sum of line totals, `None` when it does not fit in `i64` cents.
pub fn checked_items_total(items: &[LineItem]) -> Option<i64> {
    items
        .iter()
        .try_fold(0i64, |total, item| total.checked_add(item.checked_total_cents()?))
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceEvery {
    Month,
    Quarter,
    Year,
}

/// Stored under `meta.recurring`. `generated` is advanced by the external
/// daily generator, never by this crate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecurringSchedule {
    pub every: RecurrenceEvery,
    pub count: u32,
    #[serde(default)]
    pub generated: u32,
}

impl RecurringSchedule {
    pub const MIN_COUNT: u32 = 1;
    pub const MAX_COUNT: u32 = 120;

    pub fn new(every: RecurrenceEvery, count: u32) -> Self {
        Self {
            every,
            count,
            generated: 0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InvoiceMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bill_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_percent: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_preview_amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring: Option<RecurringSchedule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_parent_id: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl InvoiceMeta {
    pub fn is_empty(&self) -> bool {
        self == &InvoiceMeta::default()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Succeeded,
    Pending,
    Failed,
    Refunded,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Payment {
    pub amount_cents: i64,
    pub currency: Currency,
    pub status: PaymentStatus,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Invoice as returned by the backend. Amounts are backend-maintained and
/// read-only here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Invoice {
    pub id: i64,
    #[serde(default)]
    pub number: Option<String>,
    pub status: InvoiceStatus,
    pub currency: Currency,
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub amount_cents: i64,
    #[serde(default)]
    pub amount_paid_cents: i64,
    #[serde(default)]
    pub amount_due_cents: i64,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<i64>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub meta: InvoiceMeta,
    #[serde(default, deserialize_with = "null_as_default")]
    pub payments: Vec<Payment>,
}

impl Invoice {
    pub fn recurring(&self) -> Option<&RecurringSchedule> {
        self.meta.recurring.as_ref()
    }

    pub fn items_total_cents(&self) -> Option<i64> {
        checked_items_total(&self.items)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn line_total_multiplies_quantity() {
        let item = LineItem {
            description: "Work".to_string(),
            quantity: 2,
            unit_amount_cents: 1000,
        };
        assert_eq!(item.line_total_cents(), 2000);
    }

    #[test]
    fn checked_totals_report_overflow() {
        let huge = LineItem {
            description: "Huge".to_string(),
            quantity: u32::MAX,
            unit_amount_cents: 99_999_999_999_900,
        };
        assert_eq!(huge.checked_total_cents(), None);
        assert_eq!(huge.line_total_cents(), i64::MAX);

        let max = LineItem {
            quantity: 1,
            unit_amount_cents: i64::MAX,
            ..huge.clone()
        };
        let one = LineItem {
            quantity: 1,
            unit_amount_cents: 1,
            ..huge
        };
        assert_eq!(checked_items_total(&[max.clone()]), Some(i64::MAX));
        assert_eq!(checked_items_total(&[max, one]), None);
        assert_eq!(checked_items_total(&[]), Some(0));
    }

    #[test]
    fn deserializes_backend_invoice_with_open_meta() {
        let invoice: Invoice = serde_json::from_value(json!({
            "id": 42,
            "number": "INV-0042",
            "status": "sent",
            "currency": "usd",
            "items": [{ "description": "Work", "quantity": 2, "unit_amount_cents": 1000 }],
            "amount_cents": 2000,
            "amount_paid_cents": 500,
            "amount_due_cents": 1500,
            "due_date": "2024-01-15",
            "meta": {
                "bill_to": "Acme",
                "recurring": { "every": "quarter", "count": 4, "generated": 2 },
                "dunning_stage": 1
            },
            "payments": null
        }))
        .unwrap();

        assert_eq!(invoice.status, InvoiceStatus::Sent);
        assert_eq!(invoice.items_total_cents(), Some(2000));
        assert_eq!(invoice.meta.bill_to.as_deref(), Some("Acme"));
        assert_eq!(
            invoice.recurring(),
            Some(&RecurringSchedule {
                every: RecurrenceEvery::Quarter,
                count: 4,
                generated: 2,
            })
        );
        assert_eq!(invoice.meta.extra.get("dunning_stage"), Some(&json!(1)));
        assert!(invoice.payments.is_empty());
    }

    #[test]
    fn empty_meta_serializes_to_empty_object() {
        let meta = InvoiceMeta::default();
        assert!(meta.is_empty());
        assert_eq!(serde_json::to_value(&meta).unwrap(), json!({}));
    }
}
