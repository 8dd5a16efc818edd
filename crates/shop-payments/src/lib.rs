//! # shop-payments
//!
//! Payment-intent creation and card confirmation for the storefront.
//!
//! ## Flow: Stripe Payment Intents with a card element
//!
//! ```text
//! ┌──────────┐  POST /payment/create  ┌──────────┐  create intent  ┌──────────┐
//! │  Client  │───────────────────────▶│  Server  │────────────────▶│  Stripe  │
//! │          │◀───── clientSecret ────│          │◀── pi + secret ─│          │
//! │          │                        └──────────┘                 │          │
//! │          │──────── confirm (publishable key + secret + card) ─▶│          │
//! │          │◀─────────────────── intent status ──────────────────│          │
//! └──────────┘                                                     └──────────┘
//! ```
//!
//! The server side sits behind [`IntentProcessor`] ([`StripeClient`]), the
//! client side behind [`PaymentConfirmer`] ([`StripeConfirmer`]).
//! [`MockProcessor`] implements both for tests.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shop_payments::{IntentProcessor, StripeClient};
//!
//! let client = StripeClient::new("sk_test_xxx");
//! let intent = client.create_intent(2550).await?;
//!
//! // Hand intent.client_secret to the browser
//! ```

mod confirm;
mod error;
mod intent;
mod mock;
mod stripe_client;

pub use confirm::{
    CardInput, ClientSecret, ConfirmedIntent, PaymentConfirmer, PaymentIntentStatus,
    STRIPE_API_BASE, StripeConfirmer,
};
pub use error::{GENERIC_FAILURE, PaymentError, Result};
pub use intent::{
    CURRENCY, CreatedIntent, IntentProcessor, PaymentIntentRequest, PaymentIntentResponse,
    TOTAL_NOT_POSITIVE, TOTAL_NOT_WHOLE, TOTAL_TOO_LARGE, parse_json_total, parse_total,
};
pub use mock::{ConfirmOutcome, MockProcessor};
pub use stripe_client::{SECRET_KEY_VARS, StripeClient};
