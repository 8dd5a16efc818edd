//! Error Types

use thiserror::Error;

/// Result type alias for order store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Order store errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// An order with this id already exists in the namespace
    #[error("Order already exists: {0}")]
    AlreadyExists(String),

    /// The backing store could not be reached or refused the write
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Get user-friendly message
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::AlreadyExists(_) => "This order has already been recorded.",
            Self::Unavailable(_) => "Your payment went through but we could not save your order.",
        }
    }
}
