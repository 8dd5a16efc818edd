//! # shop-client
//!
//! Headless storefront client: the payment page and order page logic,
//! without any rendering.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use shop_client::{Checkout, ClientConfig, HttpIntentApi, OrderListing};
//! use shop_core::{AppState, MemoryOrderStore};
//! use shop_payments::CardInput;
//!
//! let config = ClientConfig::from_env();
//! let store = Arc::new(MemoryOrderStore::new());
//! let mut checkout = Checkout::new(
//!     Arc::new(HttpIntentApi::new(&config.api_url)),
//!     Arc::new(config.confirmer()?),
//!     store.clone(),
//! );
//!
//! let outcome = checkout.submit(&mut state, &CardInput::Token(token)).await?;
//!
//! let mut orders = OrderListing::new(store);
//! orders.set_user(state.user())?;
//! orders.set_flash(Some(outcome.redirect.message.into()));
//! while orders.refresh().await {
//!     render(orders.view());
//! }
//! ```

mod api;
mod checkout;
mod config;
mod error;
mod orders;

pub use api::{HttpIntentApi, PaymentIntentApi};
pub use checkout::{
    Checkout, CheckoutOutcome, CheckoutSummary, ORDER_PLACED, ORDERS_PATH, Redirect,
};
pub use config::{ClientConfig, DEFAULT_API_URL};
pub use error::{CheckoutError, Result};
pub use orders::{NO_ORDERS, OrderListing, OrdersView};
