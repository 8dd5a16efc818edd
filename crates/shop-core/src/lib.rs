//! # shop-core
//!
//! Storefront domain model, application state and order persistence.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         AppState                             │
//! │  ┌─────────────┐   dispatch(Action)   ┌──────────────────┐   │
//! │  │   Basket    │◀─────────────────────│  Add / Remove /  │   │
//! │  │  (items)    │                      │  Empty / SetUser │   │
//! │  └─────────────┘                      └──────────────────┘   │
//! └──────────────────────────────────────────────────────────────┘
//!                │ checkout
//!                ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │  OrderStore  users/{uid}/orders/{payment_intent_id}          │
//! │     create ──▶ snapshot ──▶ OrderSubscription (newest first) │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `OrderStore` trait keeps the document database swappable; the
//! in-memory store backs development and tests.

pub mod error;
pub mod model;
pub mod state;
pub mod store;

pub use error::{Result, StoreError};
pub use model::{Basket, BasketItem, Order, ProductId, User, UserId};
pub use state::{Action, AppState};
pub use store::{MemoryOrderStore, OrderStore, OrderSubscription};
