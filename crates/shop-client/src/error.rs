//! Checkout Error Types

use shop_core::StoreError;
use shop_payments::{GENERIC_FAILURE, PaymentError, PaymentIntentStatus};
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, CheckoutError>;

/// Everything that can stop a checkout
#[derive(Error, Debug)]
pub enum CheckoutError {
    /// No signed-in user to own the order
    #[error("Not signed in")]
    SignedOut,

    /// Total rejected, locally or by the backend
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Own backend unreachable or answered with something unreadable
    #[error("Network error: {0}")]
    Network(String),

    /// Backend or processor refused to create or confirm the payment
    #[error("Payment error: {0}")]
    Processor(#[from] PaymentError),

    /// Confirmation finished without the payment succeeding
    #[error("Payment not completed: status {0}")]
    PaymentFailed(PaymentIntentStatus),

    /// The charge went through but the order could not be written
    #[error("Order {intent_id} could not be saved: {source}")]
    Persistence {
        intent_id: String,
        #[source]
        source: StoreError,
    },
}

impl From<reqwest::Error> for CheckoutError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

impl CheckoutError {
    /// Message for the payment form's error field
    pub fn user_message(&self) -> String {
        match self {
            Self::SignedOut => "Please sign in to place your order.".into(),
            Self::InvalidAmount(msg) => msg.clone(),
            Self::Processor(e) => e.user_message(),
            Self::Network(_) | Self::PaymentFailed(_) => GENERIC_FAILURE.into(),
            Self::Persistence { source, .. } => source.user_message().into(),
        }
    }
}
