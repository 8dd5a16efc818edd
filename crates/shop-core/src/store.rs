//! Order Store
//!
//! Orders live in a per-user namespace (`users/{uid}/orders/{id}`) of a
//! document store. Listing is a live query: subscribers receive the full
//! ordered list on every change until they cancel.

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::RwLock;
use std::task::{Context, Poll};

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use tokio::sync::watch;

use crate::error::{Result, StoreError};
use crate::model::{Order, UserId};

/// Stream of order-list snapshots
pub type SnapshotStream = Pin<Box<dyn Stream<Item = Vec<Order>> + Send>>;

/// Order persistence trait
///
/// Implement this for each document store backend.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Write a new order into the user's namespace.
    ///
    /// Orders are created exactly once; an existing id is an error.
    async fn create(&self, uid: &UserId, order: &Order) -> Result<()>;

    /// Fetch one order
    async fn get(&self, uid: &UserId, order_id: &str) -> Result<Option<Order>>;

    /// All orders in the namespace, newest first
    async fn list(&self, uid: &UserId) -> Result<Vec<Order>>;

    /// Open a live query over the namespace, newest first.
    ///
    /// The first snapshot is the current contents.
    fn subscribe(&self, uid: &UserId) -> Result<OrderSubscription>;
}

/// A live, cancellable order query
///
/// Dropping the subscription detaches it from the store.
pub struct OrderSubscription {
    uid: UserId,
    inner: SnapshotStream,
}

impl OrderSubscription {
    pub fn new(uid: UserId, inner: SnapshotStream) -> Self {
        Self { uid, inner }
    }

    /// Namespace this subscription watches
    pub const fn uid(&self) -> &UserId {
        &self.uid
    }

    /// Wait for the next snapshot. `None` once the store closes the query.
    pub async fn next_snapshot(&mut self) -> Option<Vec<Order>> {
        self.inner.next().await
    }

    /// Stop receiving snapshots
    pub fn cancel(self) {
        tracing::debug!(uid = %self.uid, "Order subscription cancelled");
    }
}

impl Stream for OrderSubscription {
    type Item = Vec<Order>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl std::fmt::Debug for OrderSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderSubscription")
            .field("uid", &self.uid)
            .finish_non_exhaustive()
    }
}

/// Newest first; ties broken by id so the order is total
pub fn sort_newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| b.created.cmp(&a.created).then_with(|| b.id.cmp(&a.id)));
}

struct Namespace {
    orders: HashMap<String, Order>,
    snapshots: watch::Sender<Vec<Order>>,
}

impl Namespace {
    fn new() -> Self {
        let (snapshots, _) = watch::channel(Vec::new());
        Self {
            orders: HashMap::new(),
            snapshots,
        }
    }

    fn ordered(&self) -> Vec<Order> {
        let mut orders: Vec<_> = self.orders.values().cloned().collect();
        sort_newest_first(&mut orders);
        orders
    }
}

/// In-memory order store (for development and tests)
pub struct MemoryOrderStore {
    namespaces: RwLock<HashMap<UserId, Namespace>>,
}

impl Default for MemoryOrderStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self {
            namespaces: RwLock::new(HashMap::new()),
        }
    }

    /// Live subscriptions on a namespace
    pub fn subscriber_count(&self, uid: &UserId) -> usize {
        self.namespaces
            .read()
            .ok()
            .and_then(|namespaces| namespaces.get(uid).map(|ns| ns.snapshots.receiver_count()))
            .unwrap_or(0)
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unavailable("order store lock poisoned".into())
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn create(&self, uid: &UserId, order: &Order) -> Result<()> {
        let mut namespaces = self.namespaces.write().map_err(poisoned)?;
        let namespace = namespaces.entry(uid.clone()).or_insert_with(Namespace::new);

        if namespace.orders.contains_key(&order.id) {
            return Err(StoreError::AlreadyExists(order.id.clone()));
        }

        namespace.orders.insert(order.id.clone(), order.clone());
        let snapshot = namespace.ordered();
        namespace.snapshots.send_replace(snapshot);

        tracing::info!(uid = %uid, order_id = %order.id, amount = order.amount, "Order created");
        Ok(())
    }

    async fn get(&self, uid: &UserId, order_id: &str) -> Result<Option<Order>> {
        let namespaces = self.namespaces.read().map_err(poisoned)?;
        Ok(namespaces
            .get(uid)
            .and_then(|ns| ns.orders.get(order_id))
            .cloned())
    }

    async fn list(&self, uid: &UserId) -> Result<Vec<Order>> {
        let namespaces = self.namespaces.read().map_err(poisoned)?;
        Ok(namespaces.get(uid).map(Namespace::ordered).unwrap_or_default())
    }

    fn subscribe(&self, uid: &UserId) -> Result<OrderSubscription> {
        let mut namespaces = self.namespaces.write().map_err(poisoned)?;
        let namespace = namespaces.entry(uid.clone()).or_insert_with(Namespace::new);
        let receiver = namespace.snapshots.subscribe();

        tracing::debug!(uid = %uid, "Order subscription opened");
        Ok(OrderSubscription::new(
            uid.clone(),
            snapshot_stream(receiver),
        ))
    }
}

/// Current snapshot first, then one item per change
fn snapshot_stream(receiver: watch::Receiver<Vec<Order>>) -> SnapshotStream {
    Box::pin(futures::stream::unfold(
        (receiver, true),
        |(mut receiver, first)| async move {
            if !first {
                receiver.changed().await.ok()?;
            }
            let snapshot = receiver.borrow_and_update().clone();
            Some((snapshot, (receiver, false)))
        },
    ))
}
