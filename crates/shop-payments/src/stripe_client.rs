//! Stripe Payment Intents
//!
//! Server-side intent creation through `async-stripe`.

use async_trait::async_trait;
use stripe::{Client, CreatePaymentIntent, Currency, PaymentIntent};

use crate::confirm::ClientSecret;
use crate::error::{PaymentError, Result};
use crate::intent::{CreatedIntent, IntentProcessor};

/// Environment variables checked for the secret key, in order
pub const SECRET_KEY_VARS: [&str; 2] = ["STRIPE_KEY", "STRIPE_SECRET_KEY"];

/// Stripe client wrapper
pub struct StripeClient {
    client: Client,
}

impl StripeClient {
    /// Create a new Stripe client
    pub fn new(secret_key: &str) -> Self {
        Self {
            client: Client::new(secret_key),
        }
    }

    /// Create from environment variables.
    ///
    /// Only presence is checked; a bad key surfaces on the first call.
    pub fn from_env() -> Result<Self> {
        let secret_key = SECRET_KEY_VARS
            .iter()
            .find_map(|var| std::env::var(var).ok().filter(|v| !v.is_empty()))
            .ok_or_else(|| PaymentError::Config("STRIPE_KEY not set".into()))?;

        Ok(Self::new(&secret_key))
    }

    /// Get the underlying Stripe client
    pub const fn inner(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl IntentProcessor for StripeClient {
    async fn create_intent(&self, amount: i64) -> Result<CreatedIntent> {
        let params = CreatePaymentIntent::new(amount, Currency::USD);

        let intent = PaymentIntent::create(&self.client, params)
            .await
            .map_err(|e| PaymentError::Stripe(e.to_string()))?;

        let client_secret = intent
            .client_secret
            .ok_or_else(|| PaymentError::Stripe("No client secret returned".into()))?;

        Ok(CreatedIntent {
            id: intent.id.to_string(),
            client_secret: ClientSecret::new(client_secret),
            amount: intent.amount,
        })
    }

    fn name(&self) -> &str {
        "Stripe"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_name() {
        let client = StripeClient::new("sk_test_123");
        assert_eq!(client.name(), "Stripe");
    }
}
