//! Card Payment Confirmation
//!
//! Client-side half of the intent flow: the client secret returned by the
//! backend is confirmed against Stripe with the card collected by the
//! payment form. This is the call Stripe.js makes from the browser
//! (`confirmCardPayment`), issued here over the REST API with the
//! publishable key.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{GENERIC_FAILURE, PaymentError, Result};

/// Default Stripe API base URL
pub const STRIPE_API_BASE: &str = "https://api.stripe.com";

/// Opaque token authorizing confirmation of one payment intent
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientSecret(String);

impl ClientSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The payment intent id embedded in the secret (`pi_123_secret_abc` → `pi_123`)
    pub fn intent_id(&self) -> Result<&str> {
        match self.0.split_once("_secret_") {
            Some((id, suffix)) if !id.is_empty() && !suffix.is_empty() => Ok(id),
            _ => Err(PaymentError::InvalidSecret),
        }
    }
}

impl std::fmt::Debug for ClientSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.intent_id() {
            Ok(id) => write!(f, "ClientSecret({id}_secret_***)"),
            Err(_) => write!(f, "ClientSecret(***)"),
        }
    }
}

/// Card details as produced by the processor's card element
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CardInput {
    /// A payment method already created from the card element (`pm_...`)
    PaymentMethod(String),

    /// A single-use card token (`tok_...`)
    Token(String),
}

impl CardInput {
    fn form_fields(&self) -> Vec<(&'static str, &str)> {
        match self {
            Self::PaymentMethod(id) => vec![("payment_method", id.as_str())],
            Self::Token(token) => vec![
                ("payment_method_data[type]", "card"),
                ("payment_method_data[card][token]", token.as_str()),
            ],
        }
    }
}

/// Payment intent status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentIntentStatus {
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresAction,
    Processing,
    RequiresCapture,
    Canceled,
    Succeeded,
    #[serde(other)]
    Unknown,
}

impl PaymentIntentStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RequiresPaymentMethod => "requires_payment_method",
            Self::RequiresConfirmation => "requires_confirmation",
            Self::RequiresAction => "requires_action",
            Self::Processing => "processing",
            Self::RequiresCapture => "requires_capture",
            Self::Canceled => "canceled",
            Self::Succeeded => "succeeded",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for PaymentIntentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A payment intent after a confirmation attempt
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConfirmedIntent {
    /// Intent id (`pi_...`)
    pub id: String,

    /// Amount in minor units
    pub amount: i64,

    /// Creation time, unix seconds
    pub created: i64,

    pub status: PaymentIntentStatus,

    #[serde(default)]
    pub currency: Option<String>,
}

impl ConfirmedIntent {
    pub fn succeeded(&self) -> bool {
        self.status == PaymentIntentStatus::Succeeded
    }

    /// Creation time as a UTC timestamp
    pub fn created_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.created, 0).unwrap_or_default()
    }
}

/// Payment confirmation trait (client side)
#[async_trait]
pub trait PaymentConfirmer: Send + Sync {
    /// Confirm the intent behind `secret` with the given card.
    ///
    /// Card and validation failures come back as [`PaymentError::Card`].
    /// A confirmation that completes without succeeding (for example one
    /// that requires further action) is `Ok` with the intent's status.
    async fn confirm_card_payment(
        &self,
        secret: &ClientSecret,
        card: &CardInput,
    ) -> Result<ConfirmedIntent>;
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

/// Confirms card payments against the Stripe REST API
pub struct StripeConfirmer {
    http: reqwest::Client,
    publishable_key: String,
    api_base: String,
}

impl StripeConfirmer {
    /// Create a confirmer using the publishable key
    pub fn new(publishable_key: impl Into<String>) -> Self {
        Self::with_api_base(publishable_key, STRIPE_API_BASE)
    }

    /// Create a confirmer against a custom API base
    pub fn with_api_base(publishable_key: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            publishable_key: publishable_key.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    fn confirm_url(&self, intent_id: &str) -> String {
        format!("{}/v1/payment_intents/{}/confirm", self.api_base, intent_id)
    }
}

#[async_trait]
impl PaymentConfirmer for StripeConfirmer {
    async fn confirm_card_payment(
        &self,
        secret: &ClientSecret,
        card: &CardInput,
    ) -> Result<ConfirmedIntent> {
        let intent_id = secret.intent_id()?;

        let mut form = vec![("client_secret", secret.as_str())];
        form.extend(card.form_fields());

        let response = self
            .http
            .post(self.confirm_url(intent_id))
            .bearer_auth(&self.publishable_key)
            .form(&form)
            .send()
            .await?;

        if response.status().is_success() {
            let intent: ConfirmedIntent = response.json().await?;
            tracing::info!(intent_id = %intent.id, status = %intent.status, "Payment confirmed");
            return Ok(intent);
        }

        let status = response.status();
        let body: StripeErrorBody = response.json().await.map_err(|e| {
            PaymentError::Stripe(format!("unreadable error response ({status}): {e}"))
        })?;
        let detail = body.error;

        tracing::warn!(
            intent_id = %intent_id,
            http_status = %status,
            kind = ?detail.kind,
            code = ?detail.code,
            "Payment confirmation rejected"
        );

        let message = detail.message.unwrap_or_else(|| GENERIC_FAILURE.into());
        match detail.kind.as_deref() {
            Some("card_error" | "validation_error") => Err(PaymentError::Card(message)),
            _ => Err(PaymentError::Stripe(message)),
        }
    }
}
