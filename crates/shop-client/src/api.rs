//! API Client
//!
//! Talks to the storefront's own payment-intent backend.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use shop_payments::{ClientSecret, GENERIC_FAILURE, PaymentError, PaymentIntentResponse};

use crate::error::{CheckoutError, Result};

/// Backend seam used by checkout
#[async_trait]
pub trait PaymentIntentApi: Send + Sync {
    /// Request a payment intent for `total` minor units
    async fn create_payment_intent(&self, total: i64) -> Result<ClientSecret>;
}

#[derive(Debug, Default, Deserialize)]
struct FailureBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// HTTP client for `POST /payment/create`
pub struct HttpIntentApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpIntentApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl PaymentIntentApi for HttpIntentApi {
    async fn create_payment_intent(&self, total: i64) -> Result<ClientSecret> {
        let response = self
            .http
            .post(format!("{}/payment/create", self.base_url))
            .query(&[("total", total)])
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let data: PaymentIntentResponse = response.json().await?;
            return Ok(data.client_secret);
        }

        let body: FailureBody = response.json().await.unwrap_or_default();
        tracing::warn!(http_status = %status, total, "Payment intent request failed");

        if status == StatusCode::FORBIDDEN {
            return Err(CheckoutError::InvalidAmount(
                body.message.unwrap_or_else(|| GENERIC_FAILURE.into()),
            ));
        }

        Err(CheckoutError::Processor(PaymentError::Stripe(
            body.error
                .or(body.message)
                .unwrap_or_else(|| format!("Request failed ({status})")),
        )))
    }
}
