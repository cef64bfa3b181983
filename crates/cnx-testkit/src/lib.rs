//! cnx-testkit
//!
//! Deterministic scenario harness for the storefront core, plus the
//! collaborator doubles scenario tests wire into the checkout sequencer:
//!
//! - [`Storefront`] — catalog + session + cart + sequencer assembled from a
//!   [`StoreConfig`], the same wiring the CLI performs.
//! - [`ScriptedOrders`] — the real in-memory order service wrapped with
//!   per-slug failure injection.
//! - [`RecordingNavigator`] / [`RecordingTracker`] — capture redirects and
//!   tracked purchases for assertions.

use std::collections::BTreeSet;

use anyhow::{anyhow, Result};
use cnx_auth::SessionStore;
use cnx_cart::{CartError, CartLedger};
use cnx_catalog::Catalog;
use cnx_checkout::{
    CheckoutError, CheckoutSequencer, Navigator, OrderApi, PurchaseTracker,
};
use cnx_config::StoreConfig;
use cnx_orders::{OrderStore, SimulatedLatency};
use cnx_types::{Order, StoreError, User};

// ---------------------------------------------------------------------------
// Collaborator doubles
// ---------------------------------------------------------------------------

/// Navigator that records every redirect target.
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    pub visited: Vec<String>,
}

impl Navigator for RecordingNavigator {
    fn redirect(&mut self, path: &str) {
        self.visited.push(path.to_string());
    }
}

/// Tracker that records tracked order ids, optionally failing every call.
#[derive(Debug, Clone, Default)]
pub struct RecordingTracker {
    pub tracked: Vec<String>,
    pub fail_all: bool,
}

impl PurchaseTracker for RecordingTracker {
    fn track_purchase(&mut self, order_id: &str) -> Result<(), StoreError> {
        if self.fail_all {
            return Err(StoreError::server("recording tracker configured to fail"));
        }
        self.tracked.push(order_id.to_string());
        Ok(())
    }
}

/// The real order service with scripted per-slug failures layered on top.
#[derive(Debug, Clone)]
pub struct ScriptedOrders {
    inner: OrderStore,
    fail_slugs: BTreeSet<String>,
}

impl ScriptedOrders {
    pub fn new(inner: OrderStore) -> Self {
        Self {
            inner,
            fail_slugs: BTreeSet::new(),
        }
    }

    /// Make `create_order` fail for this slug.
    pub fn fail_slug(&mut self, slug: impl Into<String>) {
        self.fail_slugs.insert(slug.into());
    }

    pub fn store(&self) -> &OrderStore {
        &self.inner
    }
}

impl OrderApi for ScriptedOrders {
    fn create_order(&mut self, buyer: &User, product_slug: &str) -> Result<Order, StoreError> {
        if self.fail_slugs.contains(product_slug) {
            return Err(StoreError::network(format!(
                "scripted outage for '{product_slug}'"
            )));
        }
        self.inner.create_order(buyer, product_slug)
    }
}

// ---------------------------------------------------------------------------
// Storefront harness
// ---------------------------------------------------------------------------

/// A fully wired storefront over fixture data.
pub struct Storefront {
    pub catalog: Catalog,
    pub session: SessionStore,
    pub cart: CartLedger,
    pub sequencer: CheckoutSequencer<ScriptedOrders, RecordingTracker, RecordingNavigator>,
}

impl Storefront {
    /// Default configuration: 10% fee, unlimited cart, best-effort checkout,
    /// zero latency.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> Self {
        let catalog = Catalog::with_fixtures();
        let orders = OrderStore::with_policies(
            catalog.clone(),
            config.fees,
            SimulatedLatency::from_millis(config.latency_ms),
        );
        let sequencer = CheckoutSequencer::with_policy(
            ScriptedOrders::new(orders),
            RecordingTracker::default(),
            RecordingNavigator::default(),
            config.policy,
        );
        Self {
            catalog,
            session: SessionStore::new(),
            cart: CartLedger::with_policies(config.fees, config.limits),
            sequencer,
        }
    }

    /// Log in a mock user and return a clone of it.
    pub fn login(&mut self, email: &str) -> Result<User> {
        let user = self
            .session
            .login(email, "Testkit-Pass1")
            .map_err(|err| anyhow!("testkit login failed: {err}"))?;
        Ok(user.clone())
    }

    /// Put `qty` units of the fixture product with `slug` into the cart.
    pub fn add_to_cart(&mut self, slug: &str, qty: u32) -> Result<(), CartError> {
        let product = self
            .catalog
            .get(slug)
            .cloned()
            .unwrap_or_else(|| panic!("fixture product '{slug}' missing"));
        self.cart.add(product, qty)
    }

    /// Run the checkout sequencer over the harness cart with the current
    /// session user.
    pub fn checkout(&mut self) -> Result<Vec<Order>, CheckoutError> {
        let user = self.session.current_user().cloned();
        self.sequencer.process_checkout(user.as_ref(), &mut self.cart)
    }

    /// Script an order-creation failure for a slug.
    pub fn fail_slug(&mut self, slug: &str) {
        self.sequencer.order_api_mut().fail_slug(slug);
    }

    /// Redirect targets recorded so far.
    pub fn visited(&self) -> &[String] {
        &self.sequencer.navigator().visited
    }

    /// Order ids the tracker saw.
    pub fn tracked(&self) -> &[String] {
        &self.sequencer.tracker().tracked
    }

    /// The order store behind the scripted wrapper.
    pub fn order_store(&self) -> &OrderStore {
        self.sequencer.order_api().store()
    }
}

impl Default for Storefront {
    fn default() -> Self {
        Self::new()
    }
}
