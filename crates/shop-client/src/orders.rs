//! Order Listing
//!
//! Keeps a live subscription on the signed-in user's orders and renders
//! each snapshot into an [`OrdersView`].

use std::sync::Arc;

use shop_core::{Order, OrderStore, OrderSubscription, User};

/// Placeholder shown when the user has no orders
pub const NO_ORDERS: &str = "You don't have orders yet.";

/// What the order page shows
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OrdersView {
    /// No orders, show the placeholder
    Empty,

    /// Orders, newest first
    Orders(Vec<Order>),
}

impl OrdersView {
    pub fn from_snapshot(orders: Vec<Order>) -> Self {
        if orders.is_empty() {
            Self::Empty
        } else {
            Self::Orders(orders)
        }
    }

    pub fn orders(&self) -> &[Order] {
        match self {
            Self::Empty => &[],
            Self::Orders(orders) => orders,
        }
    }

    pub const fn placeholder(&self) -> Option<&'static str> {
        match self {
            Self::Empty => Some(NO_ORDERS),
            Self::Orders(_) => None,
        }
    }
}

/// Order page state
pub struct OrderListing {
    store: Arc<dyn OrderStore>,
    subscription: Option<OrderSubscription>,
    view: OrdersView,
    flash: Option<String>,
}

impl OrderListing {
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self {
            store,
            subscription: None,
            view: OrdersView::Empty,
            flash: None,
        }
    }

    /// Follow a user's orders, or stop following with `None`.
    ///
    /// Any previous subscription is cancelled before a new one opens.
    /// Setting the same user again keeps the current subscription.
    pub fn set_user(&mut self, user: Option<&User>) -> shop_core::Result<()> {
        let current = self.subscription.as_ref().map(OrderSubscription::uid);
        if current == user.map(|u| &u.uid) {
            return Ok(());
        }

        self.close();

        if let Some(user) = user {
            self.subscription = Some(self.store.subscribe(&user.uid)?);
        }

        Ok(())
    }

    /// Wait for the next snapshot and re-render.
    ///
    /// Returns `false` if there is nothing to wait on.
    pub async fn refresh(&mut self) -> bool {
        let Some(subscription) = self.subscription.as_mut() else {
            return false;
        };

        match subscription.next_snapshot().await {
            Some(orders) => {
                tracing::debug!(count = orders.len(), "Order snapshot received");
                self.view = OrdersView::from_snapshot(orders);
                true
            }
            None => {
                self.subscription = None;
                false
            }
        }
    }

    /// Cancel the subscription and clear the view
    pub fn close(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.cancel();
        }
        self.view = OrdersView::Empty;
    }

    pub const fn view(&self) -> &OrdersView {
        &self.view
    }

    pub const fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Message carried over from the previous page (e.g. after checkout)
    pub fn flash(&self) -> Option<&str> {
        self.flash.as_deref()
    }

    pub fn set_flash(&mut self, message: Option<String>) {
        self.flash = message;
    }
}
