//! Client Configuration

use shop_payments::{PaymentError, STRIPE_API_BASE, StripeConfirmer};

/// Default backend URL (the payment server's default port)
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Client settings
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Base URL of the payment-intent backend
    pub api_url: String,

    /// Stripe publishable key used for confirmation
    pub publishable_key: Option<String>,

    /// Stripe API base URL
    pub stripe_api_base: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            publishable_key: None,
            stripe_api_base: STRIPE_API_BASE.into(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self {
            api_url: std::env::var("SHOP_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into()),
            publishable_key: std::env::var("STRIPE_PUBLISHABLE_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
            stripe_api_base: std::env::var("STRIPE_API_BASE")
                .unwrap_or_else(|_| STRIPE_API_BASE.into()),
        }
    }

    /// Build the card confirmer
    pub fn confirmer(&self) -> Result<StripeConfirmer, PaymentError> {
        let key = self
            .publishable_key
            .as_deref()
            .ok_or_else(|| PaymentError::Config("STRIPE_PUBLISHABLE_KEY not set".into()))?;

        Ok(StripeConfirmer::with_api_base(key, &self.stripe_api_base))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmer_requires_key() {
        let config = ClientConfig::default();
        assert!(matches!(config.confirmer(), Err(PaymentError::Config(_))));

        let config = ClientConfig {
            publishable_key: Some("pk_test_123".into()),
            ..ClientConfig::default()
        };
        assert!(config.confirmer().is_ok());
    }
}
