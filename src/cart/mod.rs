//! Shared cart state with optimistic updates.
//!
//! Every write follows the same shape: apply the change locally, call the
//! server, then re-fetch the whole cart no matter how the call went. The
//! fetched cart always replaces local state, so the server has the last
//! word. Overlapping calls are not serialized; whichever fetch lands last
//! wins.

use crate::config::CartConfig;
use crate::domain::CartData;
use crate::logging::{log_reconcile, log_rejection, log_retry};
use crate::services::cart::CartService;
use log::error;
use std::collections::BTreeSet;
use std::future::Future;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};

pub mod errors;

pub use errors::CartError;

// ==================================================
// STATE
// ==================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartState {
    pub cart: CartData,
    pub loading: bool,
    pub error: Option<CartError>,
    /// Rows with a quantity update in flight.
    pub updating_items: BTreeSet<i64>,
    in_flight: usize,
}

impl CartState {
    pub fn is_updating(&self, cart_id: i64) -> bool {
        self.updating_items.contains(&cart_id)
    }
}

/// User-facing alerts raised by the store.
#[derive(Debug, Clone, PartialEq)]
pub enum CartNotice {
    LoadFailed { message: String },
}

// ==================================================
// RETRY POLICY
// ==================================================

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Linear backoff: the n-th retry (0-based) waits `base × (n + 1)`.
    pub fn delay(&self, retry: u32) -> Duration {
        self.base_delay * (retry + 1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl From<&CartConfig> for RetryPolicy {
    fn from(cfg: &CartConfig) -> Self {
        Self {
            max_retries: cfg.max_retries,
            base_delay: Duration::from_millis(cfg.retry_base_delay_ms),
        }
    }
}

// ==================================================
// STORE
// ==================================================

struct Inner {
    service: Arc<dyn CartService>,
    retry: RetryPolicy,
    state: watch::Sender<CartState>,
    notices: broadcast::Sender<CartNotice>,
    next_placeholder: AtomicI64,
}

/// Cheap to clone; every clone shares the same cart.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<Inner>,
}

impl CartStore {
    pub fn new(service: Arc<dyn CartService>, retry: RetryPolicy) -> Self {
        let (state, _) = watch::channel(CartState::default());
        let (notices, _) = broadcast::channel(16);

        Self {
            inner: Arc::new(Inner {
                service,
                retry,
                state,
                notices,
                next_placeholder: AtomicI64::new(0),
            }),
        }
    }

    /// Builds the store and runs the initial refresh.
    pub async fn start(service: Arc<dyn CartService>, retry: RetryPolicy) -> Self {
        let store = Self::new(service, retry);
        store.fetch().await;
        store
    }

    pub fn snapshot(&self) -> CartState {
        self.inner.state.borrow().clone()
    }

    pub fn cart(&self) -> CartData {
        self.inner.state.borrow().cart.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CartState> {
        self.inner.state.subscribe()
    }

    pub fn notices(&self) -> broadcast::Receiver<CartNotice> {
        self.inner.notices.subscribe()
    }

    fn modify(&self, f: impl FnOnce(&mut CartState)) {
        self.inner.state.send_modify(f);
    }

    fn busy(&self) -> Busy {
        self.modify(|s| {
            s.in_flight += 1;
            s.loading = true;
        });
        Busy {
            store: self.clone(),
        }
    }

    fn next_placeholder_id(&self) -> i64 {
        // Negative so they can never collide with server ids.
        self.inner.next_placeholder.fetch_sub(1, Ordering::Relaxed) - 1
    }

    // ==================================================
    // FETCH
    // ==================================================

    async fn fetch_once(&self) -> Result<(), CartError> {
        let _busy = self.busy();
        self.modify(|s| s.error = None);

        match self.inner.service.get_cart().await {
            Ok(cart) => {
                log_reconcile(cart.items.len(), cart.total_items);
                self.modify(|s| s.cart = cart);
                Ok(())
            }
            Err(e) => {
                self.modify(|s| s.error = Some(e.clone()));
                Err(e)
            }
        }
    }

    /// Refreshes from the server. Errors never reach the caller: a failed
    /// attempt schedules the retries on a background task and returns.
    pub async fn fetch(&self) {
        // Held until the last retry so `loading` covers the backoff sleeps.
        let busy = self.busy();
        let Err(first) = self.fetch_once().await else {
            return;
        };

        let store = self.clone();
        tokio::spawn(async move {
            let _busy = busy;
            let _ = store.retry_after(first).await;
        });
    }

    /// Like [`fetch`](Self::fetch), but waits out the whole retry budget and
    /// reports the final outcome.
    pub async fn load(&self) -> Result<(), CartError> {
        let _busy = self.busy();
        match self.fetch_once().await {
            Ok(()) => Ok(()),
            Err(first) => self.retry_after(first).await,
        }
    }

    /// Waits until nothing is in flight, background retries included.
    pub async fn settled(&self) {
        let mut state = self.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = state.wait_for(|s| !s.loading).await;
    }

    async fn retry_after(&self, mut last: CartError) -> Result<(), CartError> {
        let policy = self.inner.retry;

        for retry in 0..policy.max_retries {
            log_retry(retry + 1, &last.to_string());
            tokio::time::sleep(policy.delay(retry)).await;

            match self.fetch_once().await {
                Ok(()) => return Ok(()),
                Err(e) => last = e,
            }
        }

        error!("🛒 Cart load failed after {} retries: {}", policy.max_retries, last);
        let _ = self.inner.notices.send(CartNotice::LoadFailed {
            message: "Failed to load cart. Please try again later.".to_string(),
        });
        Err(last)
    }

    // ==================================================
    // MUTATIONS
    // ==================================================

    async fn mutate_then_resync<F, Fut>(
        &self,
        optimistic: impl FnOnce(&mut CartData),
        remote: F,
    ) -> Result<CartData, CartError>
    where
        F: FnOnce(Arc<dyn CartService>) -> Fut,
        Fut: Future<Output = Result<CartData, CartError>>,
    {
        let _busy = self.busy();
        self.modify(|s| optimistic(&mut s.cart));

        let outcome = remote(self.inner.service.clone()).await;
        if let Err(e) = &outcome {
            log_rejection(&e.to_string());
            self.modify(|s| s.error = Some(e.clone()));
        }

        self.fetch().await;
        outcome
    }

    pub async fn add(&self, product_id: i64, quantity: i64) -> Result<CartData, CartError> {
        let placeholder_id = self.next_placeholder_id();

        self.mutate_then_resync(
            move |cart| cart.add_optimistic(product_id, quantity, placeholder_id),
            move |service| async move { service.add_to_cart(product_id, quantity).await },
        )
        .await
    }

    pub async fn add_one(&self, product_id: i64) -> Result<CartData, CartError> {
        self.add(product_id, 1).await
    }

    pub async fn update_quantity(&self, cart_id: i64, quantity: i64) -> Result<CartData, CartError> {
        if quantity < 1 {
            return Err(CartError::InvalidArgument(
                "quantity must be at least 1".to_string(),
            ));
        }

        let _row = self.mark_updating(cart_id);

        self.mutate_then_resync(
            move |cart| cart.set_quantity(cart_id, quantity),
            move |service| async move { service.update_cart_item(cart_id, quantity).await },
        )
        .await
    }

    pub async fn remove(&self, cart_id: i64) -> Result<CartData, CartError> {
        self.mutate_then_resync(
            move |cart| cart.remove_item(cart_id),
            move |service| async move { service.remove_cart_item(cart_id).await },
        )
        .await
    }

    pub async fn clear(&self) -> Result<CartData, CartError> {
        self.mutate_then_resync(
            |cart| *cart = CartData::default(),
            |service| async move { service.clear_cart().await },
        )
        .await
    }

    fn mark_updating(&self, cart_id: i64) -> UpdatingRow<'_> {
        self.modify(|s| {
            s.updating_items.insert(cart_id);
        });
        UpdatingRow {
            store: self,
            cart_id,
        }
    }
}

// ==================================================
// GUARDS
// ==================================================

struct Busy {
    store: CartStore,
}

impl Drop for Busy {
    fn drop(&mut self) {
        self.store.modify(|s| {
            s.in_flight = s.in_flight.saturating_sub(1);
            s.loading = s.in_flight > 0;
        });
    }
}

struct UpdatingRow<'a> {
    store: &'a CartStore,
    cart_id: i64,
}

impl Drop for UpdatingRow<'_> {
    fn drop(&mut self) {
        let cart_id = self.cart_id;
        self.store.modify(|s| {
            s.updating_items.remove(&cart_id);
        });
    }
}
