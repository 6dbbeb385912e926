pub mod actions;
pub mod routes;

pub use actions::{
    ActionError, ActionResult, CreatedInvoiceView, ErrorKind, InvoiceActions, InvoiceView,
    PaymentForm, StatusUpdateForm,
};
pub use routes::{AppState, router};
