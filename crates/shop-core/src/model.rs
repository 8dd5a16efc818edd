//! Domain Models
//!
//! Basket, order and user types for the storefront.
//! Prices use `rust_decimal` in major units; charged amounts are integer
//! minor units (cents), the unit the payment processor works in.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Minor units per major unit for the store currency (USD cents)
pub const MINOR_UNITS_PER_MAJOR: i64 = 100;

/// Product identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u64);

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque user identifier supplied by the auth provider
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An authenticated user. Only the uid is used, as the order namespace.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub uid: UserId,

    #[serde(default)]
    pub email: Option<String>,
}

impl User {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: UserId::from_string(uid),
            email: None,
        }
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Document path of this user's order collection
    pub fn orders_path(&self) -> String {
        format!("users/{}/orders", self.uid)
    }
}

/// A product line in the basket
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasketItem {
    /// Product identifier
    pub id: ProductId,

    /// Display title
    pub title: String,

    /// Unit price in major units
    pub price: Decimal,

    /// Quantity, always at least 1 while in a basket
    pub amount: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl BasketItem {
    pub fn new(id: u64, title: impl Into<String>, price: Decimal) -> Self {
        Self {
            id: ProductId(id),
            title: title.into(),
            price,
            amount: 1,
            image: None,
            description: None,
            category: None,
        }
    }

    #[must_use]
    pub const fn with_amount(mut self, amount: u32) -> Self {
        self.amount = amount;
        self
    }

    /// Price times quantity
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.amount)
    }
}

/// The user's in-progress selection, one entry per product
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Basket {
    items: Vec<BasketItem>,
}

impl Basket {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit of a product.
    ///
    /// An existing entry for the same product gets its amount bumped;
    /// otherwise the item is appended with amount 1.
    pub fn add(&mut self, item: BasketItem) {
        if let Some(existing) = self.items.iter_mut().find(|i| i.id == item.id) {
            existing.amount = existing.amount.saturating_add(1);
        } else {
            self.items.push(BasketItem { amount: 1, ..item });
        }
    }

    /// Remove one unit of a product, dropping the entry at zero.
    pub fn remove(&mut self, id: ProductId) {
        let Some(index) = self.items.iter().position(|i| i.id == id) else {
            return;
        };

        if let Some(item) = self.items.get_mut(index) {
            if item.amount > 1 {
                item.amount -= 1;
            } else {
                self.items.remove(index);
            }
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn items(&self) -> &[BasketItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.amount)).sum()
    }

    /// Sum of price × amount in major units
    pub fn total(&self) -> Decimal {
        self.items.iter().map(BasketItem::line_total).sum()
    }

    /// Total in minor units, rounded half away from zero.
    ///
    /// Returns `None` if the total does not fit in an `i64`.
    pub fn total_minor_units(&self) -> Option<i64> {
        to_minor_units(self.total())
    }
}

impl From<Vec<BasketItem>> for Basket {
    fn from(items: Vec<BasketItem>) -> Self {
        let mut basket = Self::new();
        for item in items.into_iter().filter(|i| i.amount > 0) {
            if let Some(existing) = basket.items.iter_mut().find(|i| i.id == item.id) {
                existing.amount = existing.amount.saturating_add(item.amount);
            } else {
                basket.items.push(item);
            }
        }
        basket
    }
}

/// Convert a major-unit amount to integer minor units
pub fn to_minor_units(major: Decimal) -> Option<i64> {
    (major * Decimal::from(MINOR_UNITS_PER_MAJOR))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

/// A completed purchase
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Payment intent identifier
    pub id: String,

    /// Snapshot of the basket at checkout
    pub basket: Vec<BasketItem>,

    /// Charged amount in minor units
    pub amount: i64,

    /// When the payment intent was created
    pub created: DateTime<Utc>,
}

impl Order {
    pub fn new(
        id: impl Into<String>,
        basket: Vec<BasketItem>,
        amount: i64,
        created: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            basket,
            amount,
            created,
        }
    }

    /// Amount in major units, for display
    pub fn amount_major(&self) -> Decimal {
        Decimal::new(self.amount, 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_basket() -> Basket {
        let mut basket = Basket::new();
        basket.add(BasketItem::new(1, "Backpack", dec!(10.00)));
        basket.add(BasketItem::new(1, "Backpack", dec!(10.00)));
        basket.add(BasketItem::new(2, "T-Shirt", dec!(5.50)));
        basket
    }

    #[test]
    fn test_basket_total() {
        let basket = sample_basket();
        assert_eq!(basket.total(), dec!(25.50));
        assert_eq!(basket.total_minor_units(), Some(2550));
        assert_eq!(basket.item_count(), 3);
        assert_eq!(basket.len(), 2);
    }

    #[test]
    fn test_total_is_stable() {
        let basket = sample_basket();
        assert_eq!(basket.total(), basket.total());
        assert_eq!(basket.total_minor_units(), basket.total_minor_units());
    }

    #[test]
    fn test_add_increments_existing_entry() {
        let basket = sample_basket();
        let backpack = &basket.items()[0];
        assert_eq!(backpack.id, ProductId(1));
        assert_eq!(backpack.amount, 2);
    }

    #[test]
    fn test_remove_decrements_then_drops() {
        let mut basket = sample_basket();

        basket.remove(ProductId(1));
        assert_eq!(basket.items()[0].amount, 1);

        basket.remove(ProductId(1));
        assert_eq!(basket.len(), 1);
        assert_eq!(basket.items()[0].id, ProductId(2));

        // Unknown id is a no-op
        basket.remove(ProductId(99));
        assert_eq!(basket.len(), 1);
    }

    #[test]
    fn test_empty_basket_total() {
        let basket = Basket::new();
        assert!(basket.is_empty());
        assert_eq!(basket.total_minor_units(), Some(0));
    }

    #[test]
    fn test_minor_unit_rounding() {
        assert_eq!(to_minor_units(dec!(0.005)), Some(1));
        assert_eq!(to_minor_units(dec!(19.994)), Some(1999));
        assert_eq!(to_minor_units(dec!(109.95)), Some(10995));
    }

    #[test]
    fn test_basket_from_items_keeps_amounts() {
        let basket = Basket::from(vec![
            BasketItem::new(1, "Backpack", dec!(10.00)).with_amount(2),
            BasketItem::new(2, "T-Shirt", dec!(5.50)),
        ]);
        assert_eq!(basket.total_minor_units(), Some(2550));
    }

    #[test]
    fn test_item_accepts_numeric_price() {
        let item: BasketItem = serde_json::from_str(
            r#"{"id": 7, "title": "Jacket", "price": 55.99, "amount": 1}"#,
        )
        .unwrap();
        assert_eq!(item.price, dec!(55.99));
        assert_eq!(item.line_total(), dec!(55.99));
    }

    #[test]
    fn test_order_amount_major() {
        let order = Order::new("pi_123", Vec::new(), 2550, Utc::now());
        assert_eq!(order.amount_major(), dec!(25.50));
    }

    #[test]
    fn test_orders_path() {
        let user = User::new("uid-42").with_email("a@example.com");
        assert_eq!(user.orders_path(), "users/uid-42/orders");
    }
}
