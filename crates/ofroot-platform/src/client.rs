//! HTTP client for the external invoice backend.
//!
//! Every call carries the caller's session token as a bearer credential.
//! Failures are returned once; nothing here retries.

use std::time::Duration;

use async_trait::async_trait;
use ofroot_core::Invoice;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::{
    AuthContext, CreateInvoiceRequest, CreatedInvoice, InvoiceApi, InvoiceList,
    RecordPaymentRequest, UpdateInvoiceRequest, error::ApiError,
};

#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL without trailing slash, e.g. `https://api.ofroot.com/v1`.
    pub base_url: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct HttpInvoiceApi {
    http: Client,
    config: ApiClientConfig,
}

impl HttpInvoiceApi {
    pub fn new(config: ApiClientConfig) -> Result<Self, ApiError> {
        if config.base_url.trim().is_empty() {
            return Err(ApiError::Config("base_url is required".to_string()));
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| ApiError::Config(err.to_string()))?;

        Ok(Self { http, config })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);
        debug!(%url, %method, "invoice api request");
        self.http.request(method, url)
    }

    async fn send(&self, auth: &AuthContext, request: RequestBuilder) -> Result<Response, ApiError> {
        let token = auth.require_token()?;
        let mut request = request.bearer_auth(token);
        if let Some(tenant_id) = auth.tenant_id() {
            request = request.header("X-Tenant-Id", tenant_id.to_string());
        }

        let response = request.send().await.map_err(|err| {
            if err.is_timeout() {
                ApiError::Transport(format!("request timed out after {:?}", self.config.timeout))
            } else {
                ApiError::Transport(err.to_string())
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = ApiError::from_response(status.as_u16(), &body);
        warn!(status = status.as_u16(), "invoice api rejected request: {err}");
        Err(err)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        response
            .json::<T>()
            .await
            .map_err(|err| ApiError::Decode(err.to_string()))
    }
}

#[async_trait]
impl InvoiceApi for HttpInvoiceApi {
    #[instrument(skip(self, auth, request), fields(items = request.items.len()))]
    async fn create_invoice(
        &self,
        auth: &AuthContext,
        request: &CreateInvoiceRequest,
    ) -> Result<CreatedInvoice, ApiError> {
        let response = self
            .send(auth, self.request(Method::POST, "/invoices").json(request))
            .await?;
        Self::decode(response).await
    }

    #[instrument(skip(self, auth, request))]
    async fn update_invoice(
        &self,
        auth: &AuthContext,
        invoice_id: i64,
        request: &UpdateInvoiceRequest,
    ) -> Result<(), ApiError> {
        let path = format!("/invoices/{invoice_id}");
        self.send(auth, self.request(Method::PATCH, &path).json(request))
            .await?;
        Ok(())
    }

    #[instrument(skip(self, auth, request), fields(amount_cents = request.amount_cents))]
    async fn record_payment(
        &self,
        auth: &AuthContext,
        invoice_id: i64,
        request: &RecordPaymentRequest,
    ) -> Result<(), ApiError> {
        let path = format!("/invoices/{invoice_id}/payments");
        self.send(auth, self.request(Method::POST, &path).json(request))
            .await?;
        Ok(())
    }

    #[instrument(skip(self, auth))]
    async fn send_invoice(&self, auth: &AuthContext, invoice_id: i64) -> Result<(), ApiError> {
        let path = format!("/invoices/{invoice_id}/send");
        self.send(auth, self.request(Method::POST, &path)).await?;
        Ok(())
    }

    #[instrument(skip(self, auth))]
    async fn get_invoice(&self, auth: &AuthContext, invoice_id: i64) -> Result<Invoice, ApiError> {
        let path = format!("/invoices/{invoice_id}");
        let response = self.send(auth, self.request(Method::GET, &path)).await?;
        Self::decode(response).await
    }

    #[instrument(skip(self, auth))]
    async fn list_invoices(&self, auth: &AuthContext) -> Result<Vec<Invoice>, ApiError> {
        let response = self
            .send(auth, self.request(Method::GET, "/invoices"))
            .await?;
        let list: InvoiceList = Self::decode(response).await?;
        Ok(list.into_vec())
    }
}
