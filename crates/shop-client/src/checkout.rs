//! Checkout
//!
//! Drives one payment from basket to recorded order:
//!
//! 1. total the basket (minor units)
//! 2. request a payment intent from the backend
//! 3. confirm it with the processor using the card input
//! 4. stop unless the intent succeeded
//! 5. record the order under the user, empty the basket, redirect
//!
//! A failure at any step leaves the basket as it was and sets the error
//! field. Steps 3 and 5 are not transactional: if the order write fails
//! after a successful charge, the payment stands unrecorded and is logged
//! with its intent id.

use std::sync::Arc;

use rust_decimal::Decimal;
use shop_core::{Action, AppState, Basket, Order, OrderStore};
use shop_payments::{CardInput, PaymentConfirmer, TOTAL_NOT_POSITIVE};

use crate::api::PaymentIntentApi;
use crate::error::{CheckoutError, Result};

/// Where to go after a successful order
pub const ORDERS_PATH: &str = "/orders";

/// Flash message shown on the order list after checkout
pub const ORDER_PLACED: &str = "You have placed new order";

/// Navigation target plus a message for the destination page
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Redirect {
    pub path: &'static str,
    pub message: &'static str,
}

impl Redirect {
    pub const fn order_placed() -> Self {
        Self {
            path: ORDERS_PATH,
            message: ORDER_PLACED,
        }
    }
}

/// A completed checkout
#[derive(Clone, Debug)]
pub struct CheckoutOutcome {
    pub order: Order,
    pub redirect: Redirect,
}

/// Header and total line of the payment page
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckoutSummary {
    pub item_count: u64,
    pub total: Decimal,
}

impl CheckoutSummary {
    pub fn of(basket: &Basket) -> Self {
        Self {
            item_count: basket.item_count(),
            total: basket.total(),
        }
    }
}

/// Payment form state and the flow behind its submit button
///
/// `submit` takes `&mut self`, so one checkout cannot run two submissions
/// at once.
pub struct Checkout {
    api: Arc<dyn PaymentIntentApi>,
    confirmer: Arc<dyn PaymentConfirmer>,
    store: Arc<dyn OrderStore>,
    error: Option<String>,
}

impl Checkout {
    pub fn new(
        api: Arc<dyn PaymentIntentApi>,
        confirmer: Arc<dyn PaymentConfirmer>,
        store: Arc<dyn OrderStore>,
    ) -> Self {
        Self {
            api,
            confirmer,
            store,
            error: None,
        }
    }

    /// Current error message for the form
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Card element change callback: show or clear its validation message
    pub fn on_card_change(&mut self, error: Option<String>) {
        self.error = error.filter(|e| !e.is_empty());
    }

    /// Run the checkout.
    ///
    /// On success the basket in `state` is emptied; on failure it is left
    /// untouched and [`Checkout::error`] holds the message to show.
    pub async fn submit(&mut self, state: &mut AppState, card: &CardInput) -> Result<CheckoutOutcome> {
        self.error = None;

        match self.run(state, card).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                tracing::warn!("Checkout failed: {}", e);
                self.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    async fn run(&self, state: &mut AppState, card: &CardInput) -> Result<CheckoutOutcome> {
        let user = state.user().cloned().ok_or(CheckoutError::SignedOut)?;

        let total = state
            .basket()
            .total_minor_units()
            .filter(|total| *total > 0)
            .ok_or_else(|| CheckoutError::InvalidAmount(TOTAL_NOT_POSITIVE.into()))?;

        let secret = self.api.create_payment_intent(total).await?;

        let intent = self.confirmer.confirm_card_payment(&secret, card).await?;
        if !intent.succeeded() {
            return Err(CheckoutError::PaymentFailed(intent.status));
        }

        let order = Order::new(
            intent.id.clone(),
            state.basket().items().to_vec(),
            intent.amount,
            intent.created_at(),
        );

        self.store.create(&user.uid, &order).await.map_err(|source| {
            tracing::error!(
                intent_id = %intent.id,
                uid = %user.uid,
                amount = intent.amount,
                "Payment succeeded but order was not recorded: {}",
                source
            );
            CheckoutError::Persistence {
                intent_id: intent.id.clone(),
                source,
            }
        })?;

        state.dispatch(Action::EmptyBasket);

        tracing::info!(order_id = %order.id, uid = %user.uid, amount = order.amount, "Order placed");

        Ok(CheckoutOutcome {
            order,
            redirect: Redirect::order_placed(),
        })
    }
}
