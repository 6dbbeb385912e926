pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod contracts;
pub mod error;

pub use api::InvoiceApi;
pub use auth::{AuthContext, DEFAULT_SESSION_COOKIE};
pub use client::{ApiClientConfig, HttpInvoiceApi};
pub use config::ServiceConfig;
pub use contracts::{
    CreateInvoiceRequest, CreatedInvoice, InvoiceList, RecordPaymentRequest, UpdateInvoiceRequest,
};
pub use error::ApiError;
