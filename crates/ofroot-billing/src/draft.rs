use ofroot_core::RecurrenceEvery;
use serde::{Deserialize, Serialize};

use crate::amount::RawAmount;

/// One editor row before normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLineItem {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub quantity: Option<RawAmount>,
    #[serde(default)]
    pub unit_amount: Option<RawAmount>,
}

impl RawLineItem {
    pub fn new(
        description: impl Into<String>,
        quantity: impl Into<RawAmount>,
        unit_amount: impl Into<RawAmount>,
    ) -> Self {
        Self {
            description: description.into(),
            quantity: Some(quantity.into()),
            unit_amount: Some(unit_amount.into()),
        }
    }

    /// Untouched rows (no description, no amount) are ignored by validation.
    pub fn is_blank(&self) -> bool {
        self.description.trim().is_empty()
            && self.unit_amount.as_ref().is_none_or(RawAmount::is_blank)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringDraft {
    pub every: RecurrenceEvery,
    #[serde(default)]
    pub count: u32,
}

/// The invoice editor's form state as submitted by the admin UI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceDraft {
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<i64>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub bill_to: Option<String>,
    #[serde(default)]
    pub items: Vec<RawLineItem>,
    #[serde(default)]
    pub tax_percent: Option<RawAmount>,
    #[serde(default)]
    pub discount_amount: Option<RawAmount>,
    #[serde(default)]
    pub recurring: Option<RecurringDraft>,
}

impl InvoiceDraft {
    pub(crate) fn due_date_input(&self) -> Option<&str> {
        non_blank(self.due_date.as_deref())
    }

    pub(crate) fn bill_to_input(&self) -> Option<&str> {
        non_blank(self.bill_to.as_deref())
    }
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
