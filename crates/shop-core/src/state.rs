//! Application State
//!
//! The basket and signed-in user, mutated only through [`Action`]s.

use serde::{Deserialize, Serialize};

use crate::model::{Basket, BasketItem, ProductId, User};

/// Mutations the storefront can apply to [`AppState`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Add one unit of a product
    AddToBasket(BasketItem),

    /// Remove one unit of a product
    RemoveFromBasket(ProductId),

    /// Drop everything, after a successful order
    EmptyBasket,

    /// Sign in (`Some`) or out (`None`)
    SetUser(Option<User>),
}

/// Shared client-side state
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    basket: Basket,
    user: Option<User>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an action
    pub fn dispatch(&mut self, action: Action) {
        tracing::debug!(?action, "Dispatching action");

        match action {
            Action::AddToBasket(item) => self.basket.add(item),
            Action::RemoveFromBasket(id) => self.basket.remove(id),
            Action::EmptyBasket => self.basket.clear(),
            Action::SetUser(user) => self.user = user,
        }
    }

    pub const fn basket(&self) -> &Basket {
        &self.basket
    }

    pub const fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }
}
