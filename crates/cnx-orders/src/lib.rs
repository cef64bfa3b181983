//! Deterministic in-memory order service.
//!
//! Design decisions (kept intentionally simple/deterministic):
//! - Order ids derive from a monotonically increasing sequence
//!   (`ord-000001`, `ord-000002`, …). No randomness.
//! - One order per `create_order` call, resolved against the owned catalog
//!   snapshot; an unknown slug is a `NotFound` refusal, not a panic.
//! - Money identities are enforced at creation:
//!   `creator_earnings == amount - platform_fee`, with the fee coming from
//!   the configured [`FeeSchedule`].
//! - The only stand-in for the real backend's network hop is an explicit,
//!   configurable [`SimulatedLatency`] (default zero, so tests are instant).
//!
//! This crate implements the `OrderApi` seam consumed by the checkout
//! sequencer, and the buyer/creator read surfaces used by dashboard views.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use cnx_cart::FeeSchedule;
use cnx_catalog::Catalog;
use cnx_checkout::OrderApi;
use cnx_types::{CreatorStats, Order, OrderStatus, StoreError, User};

// ---------------------------------------------------------------------------
// SimulatedLatency
// ---------------------------------------------------------------------------

/// Explicit stand-in for the mock backend's simulated network delay.
///
/// Centralized here so "how slow is the fake API" is one config knob instead
/// of scattered sleeps. Zero (the default) means no sleeping at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SimulatedLatency {
    delay: Duration,
}

impl SimulatedLatency {
    pub const NONE: SimulatedLatency = SimulatedLatency {
        delay: Duration::ZERO,
    };

    pub fn from_millis(millis: u64) -> Self {
        Self {
            delay: Duration::from_millis(millis),
        }
    }

    pub fn is_none(&self) -> bool {
        self.delay.is_zero()
    }

    /// Block for the configured delay (no-op when zero).
    pub fn apply(&self) {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
    }
}

// ---------------------------------------------------------------------------
// OrderStore
// ---------------------------------------------------------------------------

/// In-memory order store keyed by order id.
#[derive(Debug, Clone)]
pub struct OrderStore {
    catalog: Catalog,
    fees: FeeSchedule,
    latency: SimulatedLatency,
    orders: BTreeMap<String, Order>,
    seq: u64,
}

impl OrderStore {
    /// Store over a catalog snapshot with the default fee schedule and no
    /// simulated latency.
    pub fn new(catalog: Catalog) -> Self {
        Self::with_policies(catalog, FeeSchedule::default(), SimulatedLatency::NONE)
    }

    pub fn with_policies(catalog: Catalog, fees: FeeSchedule, latency: SimulatedLatency) -> Self {
        Self {
            catalog,
            fees,
            latency,
            orders: BTreeMap::new(),
            seq: 0,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    // -----------------------------------------------------------------------
    // Write surface
    // -----------------------------------------------------------------------

    /// Create one order for `buyer` and the product with `product_slug`.
    ///
    /// # Errors
    /// `NotFound` for an unknown slug; `Server` if the fee computation
    /// refuses the product price. The store is unchanged on error.
    pub fn create_order(&mut self, buyer: &User, product_slug: &str) -> Result<Order, StoreError> {
        self.latency.apply();

        let product = self
            .catalog
            .get(product_slug)
            .ok_or_else(|| StoreError::not_found(format!("product '{product_slug}'")))?;

        let amount = product.price;
        let platform_fee = self
            .fees
            .fee_for(amount)
            .map_err(|err| StoreError::server(err.to_string()))?;

        self.seq += 1;
        let order = Order {
            id: format!("ord-{:06}", self.seq),
            product_id: product.id.clone(),
            product_title: product.title.clone(),
            product_slug: product.slug.clone(),
            buyer_id: buyer.id.clone(),
            buyer_email: buyer.email.clone(),
            amount,
            platform_fee,
            creator_earnings: amount - platform_fee,
            status: OrderStatus::Completed,
            created_at: Utc::now(),
            download_url: product.download_url.clone(),
        };

        self.orders.insert(order.id.clone(), order.clone());
        Ok(order)
    }

    // -----------------------------------------------------------------------
    // Read surface
    // -----------------------------------------------------------------------

    pub fn get(&self, order_id: &str) -> Option<&Order> {
        self.orders.get(order_id)
    }

    /// A buyer's orders, most recent first.
    pub fn orders_for_buyer(&self, buyer_id: &str) -> Vec<Order> {
        let mut out: Vec<Order> = self
            .orders
            .values()
            .filter(|o| o.buyer_id == buyer_id)
            .cloned()
            .collect();
        // Sequence ids are zero-padded, so reverse id order == newest first.
        out.sort_by(|a, b| b.id.cmp(&a.id));
        out
    }

    /// Orders for products owned by `creator_id`, most recent first.
    pub fn orders_for_creator(&self, creator_id: &str) -> Vec<Order> {
        let mut out: Vec<Order> = self
            .orders
            .values()
            .filter(|o| {
                self.catalog
                    .get(&o.product_slug)
                    .is_some_and(|p| p.creator_id == creator_id)
            })
            .cloned()
            .collect();
        out.sort_by(|a, b| b.id.cmp(&a.id));
        out
    }

    /// Dashboard aggregates for a creator.
    pub fn creator_stats(&self, creator_id: &str) -> CreatorStats {
        let sold = self.orders_for_creator(creator_id);
        let now = Utc::now();
        let month_ago = now - ChronoDuration::days(30);
        let day_ago = now - ChronoDuration::hours(24);

        CreatorStats {
            total_products: self.catalog.by_creator(creator_id).len(),
            total_sales: sold.len(),
            total_earnings: sold.iter().map(|o| o.creator_earnings).sum(),
            monthly_earnings: sold
                .iter()
                .filter(|o| o.created_at > month_ago)
                .map(|o| o.creator_earnings)
                .sum(),
            daily_downloads: sold.iter().filter(|o| o.created_at > day_ago).count() as u64,
        }
    }
}

impl OrderApi for OrderStore {
    fn create_order(&mut self, buyer: &User, product_slug: &str) -> Result<Order, StoreError> {
        OrderStore::create_order(self, buyer, product_slug)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
