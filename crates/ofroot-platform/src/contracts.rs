use ofroot_core::{
    Currency, Invoice, InvoiceMeta, InvoiceStatus, LineItem, PaymentStatus, checked_items_total,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateInvoiceRequest {
    pub currency: Currency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    pub items: Vec<LineItem>,
    #[serde(default, skip_serializing_if = "InvoiceMeta::is_empty")]
    pub meta: InvoiceMeta,
}

impl CreateInvoiceRequest {
    /// Total the backend will store: the sum of submitted lines. `None` when
    /// it does not fit in `i64` cents.
    pub fn items_total_cents(&self) -> Option<i64> {
        checked_items_total(&self.items)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatedInvoice {
    pub id: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UpdateInvoiceRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<InvoiceStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<InvoiceMeta>,
}

impl UpdateInvoiceRequest {
    pub fn status(status: InvoiceStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordPaymentRequest {
    pub amount_cents: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PaymentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// The list endpoint answers with either a bare array or `{ "items": [...] }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum InvoiceList {
    Bare(Vec<Invoice>),
    Wrapped { items: Vec<Invoice> },
}

impl InvoiceList {
    pub fn into_vec(self) -> Vec<Invoice> {
        match self {
            InvoiceList::Bare(invoices) => invoices,
            InvoiceList::Wrapped { items } => items,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn create_request_omits_empty_optionals() {
        let request = CreateInvoiceRequest {
            currency: Currency::Usd,
            due_date: None,
            tenant_id: None,
            user_id: None,
            items: vec![LineItem {
                description: "Work".to_string(),
                quantity: 2,
                unit_amount_cents: 1000,
            }],
            meta: InvoiceMeta::default(),
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "currency": "usd",
                "items": [{ "description": "Work", "quantity": 2, "unit_amount_cents": 1000 }]
            })
        );
        assert_eq!(request.items_total_cents(), Some(2000));
    }

    #[test]
    fn status_update_carries_only_status() {
        let request = UpdateInvoiceRequest::status(InvoiceStatus::Void);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "status": "void" })
        );
    }

    #[test]
    fn invoice_list_accepts_both_shapes() {
        let invoice = json!({ "id": 1, "status": "draft", "currency": "usd" });

        let bare: InvoiceList = serde_json::from_value(json!([invoice.clone()])).unwrap();
        let wrapped: InvoiceList = serde_json::from_value(json!({ "items": [invoice] })).unwrap();

        assert_eq!(bare.into_vec().len(), 1);
        assert_eq!(wrapped.into_vec()[0].id, 1);
    }
}
