//! Payment Error Types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, PaymentError>;

/// Shown when the processor's own message is not meant for end users
pub const GENERIC_FAILURE: &str = "Payment failed. Please try again.";

/// Payment-related errors
#[derive(Error, Debug)]
pub enum PaymentError {
    /// Total missing, non-numeric, not positive or fractional
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Stripe API error
    #[error("Stripe error: {0}")]
    Stripe(String),

    /// Card declined or card details rejected
    #[error("Card error: {0}")]
    Card(String),

    /// Client secret is not of the form `<intent id>_secret_<suffix>`
    #[error("Malformed client secret")]
    InvalidSecret,

    /// Transport failure talking to the processor
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PaymentError {
    /// Get user-friendly message.
    ///
    /// Card errors carry processor text written for cardholders and pass
    /// through; other vendor detail does not.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidAmount(msg) | Self::Card(msg) => msg.clone(),
            Self::Config(_) => "Service configuration error.".into(),
            Self::Stripe(_) | Self::InvalidSecret | Self::Network(_) => GENERIC_FAILURE.into(),
        }
    }
}
