//! Checkout Sequencer — the single path from a cart to confirmed orders.
//!
//! # Contract
//!
//! - The authenticated user is passed in explicitly; a missing user redirects
//!   to [`LOGIN_PATH`] and refuses without touching any collaborator.
//! - An empty cart refuses without collaborator calls and without navigation.
//! - Items are processed strictly in cart order, one
//!   [`OrderApi::create_order`] call at a time — no parallel requests, no
//!   interleaving. There are no retries and no timeouts; retry is the caller
//!   re-invoking checkout.
//! - Per-item failure handling is governed by [`CheckoutPolicy`]:
//!   best-effort continues past failures and succeeds if at least one order
//!   was created; all-or-nothing stops at the first failure.
//! - On success the cart is unconditionally cleared and the navigator is
//!   sent to the first order's detail page exactly once.
//! - Purchase tracking is fire-and-forget tolerant: a tracker failure is
//!   logged and never fails the checkout.
//!
//! Raw collaborator errors never cross the user boundary; they are mapped
//! through `StoreError::user_message` and logged with `tracing`.

use cnx_cart::CartLedger;
use cnx_types::{Order, StoreError, User};

use crate::phase::CheckoutPhase;

/// Redirect target for unauthenticated checkout attempts.
pub const LOGIN_PATH: &str = "/login";

/// Detail-page path for an order id.
pub fn order_path(order_id: &str) -> String {
    format!("/orders/{order_id}")
}

// ---------------------------------------------------------------------------
// Collaborator traits
// ---------------------------------------------------------------------------

/// Order-creation collaborator (the storefront's order service).
///
/// Implementations create one order per call for the given buyer and product
/// slug, or fail with a classified [`StoreError`].
pub trait OrderApi {
    fn create_order(&mut self, buyer: &User, product_slug: &str) -> Result<Order, StoreError>;
}

/// Purchase-analytics collaborator. Failures are tolerated by the sequencer.
pub trait PurchaseTracker {
    fn track_purchase(&mut self, order_id: &str) -> Result<(), StoreError>;
}

/// Navigation collaborator: receives redirect targets.
pub trait Navigator {
    fn redirect(&mut self, path: &str);
}

// Allow boxed collaborators so wiring code can pick implementations at
// runtime (e.g. the CLI swapping trackers based on flags).

impl<A: OrderApi + ?Sized> OrderApi for Box<A> {
    fn create_order(&mut self, buyer: &User, product_slug: &str) -> Result<Order, StoreError> {
        (**self).create_order(buyer, product_slug)
    }
}

impl<T: PurchaseTracker + ?Sized> PurchaseTracker for Box<T> {
    fn track_purchase(&mut self, order_id: &str) -> Result<(), StoreError> {
        (**self).track_purchase(order_id)
    }
}

impl<N: Navigator + ?Sized> Navigator for Box<N> {
    fn redirect(&mut self, path: &str) {
        (**self).redirect(path)
    }
}

/// Tracker that accepts every purchase and records nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracker;

impl PurchaseTracker for NoopTracker {
    fn track_purchase(&mut self, _order_id: &str) -> Result<(), StoreError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// How the sequencer treats per-item order-creation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckoutPolicy {
    /// Continue past failed items; succeed if at least one order was
    /// created. This preserves the storefront's historical behavior.
    #[default]
    BestEffort,
    /// Stop at the first failed item and refuse the whole checkout. Orders
    /// already created in this invocation remain on the server — the
    /// sequencer performs no reconciliation.
    AllOrNothing,
}

impl CheckoutPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutPolicy::BestEffort => "best_effort",
            CheckoutPolicy::AllOrNothing => "all_or_nothing",
        }
    }

    /// Parse a policy from its canonical config name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "best_effort" => Some(CheckoutPolicy::BestEffort),
            "all_or_nothing" => Some(CheckoutPolicy::AllOrNothing),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a checkout invocation produced no result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    /// No authenticated user; the navigator was sent to [`LOGIN_PATH`].
    NotAuthenticated,
    /// The cart had no items; no collaborator was called.
    EmptyCart,
    /// Every item failed (best-effort). Nothing was cleared or navigated.
    AllOrdersFailed { attempted: usize },
    /// An item failed under all-or-nothing (or the single-order path failed).
    /// `message` is already user-facing.
    OrderFailed { slug: String, message: String },
}

impl CheckoutError {
    /// User-facing copy for this refusal.
    pub fn user_message(&self) -> String {
        match self {
            CheckoutError::NotAuthenticated => "You must be logged in to checkout".to_string(),
            CheckoutError::EmptyCart => "Your cart is empty".to_string(),
            CheckoutError::AllOrdersFailed { .. } => {
                "Something went wrong. Please try again.".to_string()
            }
            CheckoutError::OrderFailed { message, .. } => message.clone(),
        }
    }
}

impl std::fmt::Display for CheckoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckoutError::NotAuthenticated => write!(f, "checkout refused: not authenticated"),
            CheckoutError::EmptyCart => write!(f, "checkout refused: cart is empty"),
            CheckoutError::AllOrdersFailed { attempted } => {
                write!(f, "checkout failed: all {attempted} order(s) failed")
            }
            CheckoutError::OrderFailed { slug, .. } => {
                write!(f, "checkout failed: order creation failed for '{slug}'")
            }
        }
    }
}

impl std::error::Error for CheckoutError {}

// ---------------------------------------------------------------------------
// CheckoutSequencer
// ---------------------------------------------------------------------------

/// Drives a cart through order creation, tracking, cart clearing and
/// navigation.
///
/// ```text
/// UI surface
///     │
///     └──► CheckoutSequencer::process_checkout(user, &mut cart)
///                │
///                ├── user present?          → redirect /login on refusal
///                ├── cart non-empty?        → refusal, no collaborators
///                │
///                ├── for each item, in cart order:
///                │       OrderApi::create_order(buyer, slug)
///                │       └─ ok → PurchaseTracker::track_purchase (tolerated)
///                │       └─ err → policy decides: skip or abort
///                │
///                └── ≥1 order → cart.clear(), redirect /orders/{first}
/// ```
pub struct CheckoutSequencer<A, T, N>
where
    A: OrderApi,
    T: PurchaseTracker,
    N: Navigator,
{
    orders: A,
    tracker: T,
    nav: N,
    policy: CheckoutPolicy,
    phase: CheckoutPhase,
}

impl<A, T, N> CheckoutSequencer<A, T, N>
where
    A: OrderApi,
    T: PurchaseTracker,
    N: Navigator,
{
    /// Sequencer with the default best-effort policy.
    pub fn new(orders: A, tracker: T, nav: N) -> Self {
        Self::with_policy(orders, tracker, nav, CheckoutPolicy::default())
    }

    pub fn with_policy(orders: A, tracker: T, nav: N, policy: CheckoutPolicy) -> Self {
        Self {
            orders,
            tracker,
            nav,
            policy,
            phase: CheckoutPhase::Idle,
        }
    }

    pub fn policy(&self) -> CheckoutPolicy {
        self.policy
    }

    /// Phase the most recent invocation ended in (`Idle` before any run).
    pub fn phase(&self) -> CheckoutPhase {
        self.phase
    }

    pub fn navigator(&self) -> &N {
        &self.nav
    }

    pub fn tracker(&self) -> &T {
        &self.tracker
    }

    pub fn order_api(&self) -> &A {
        &self.orders
    }

    /// Mutable collaborator access, for harnesses that reconfigure doubles
    /// between invocations.
    pub fn order_api_mut(&mut self) -> &mut A {
        &mut self.orders
    }

    pub fn tracker_mut(&mut self) -> &mut T {
        &mut self.tracker
    }

    /// Tear down into the collaborators (for inspection in harnesses).
    pub fn into_parts(self) -> (A, T, N) {
        (self.orders, self.tracker, self.nav)
    }

    // -----------------------------------------------------------------------
    // Checkout
    // -----------------------------------------------------------------------

    /// Process the whole cart. See the module docs for the full contract.
    ///
    /// On success returns the created orders in creation order; the cart has
    /// been cleared and the navigator pointed at the first order's page.
    pub fn process_checkout(
        &mut self,
        user: Option<&User>,
        cart: &mut CartLedger,
    ) -> Result<Vec<Order>, CheckoutError> {
        self.enter(CheckoutPhase::Validating);

        let Some(buyer) = user else {
            self.enter(CheckoutPhase::Failed);
            self.nav.redirect(LOGIN_PATH);
            return Err(CheckoutError::NotAuthenticated);
        };

        if cart.is_empty() {
            self.enter(CheckoutPhase::Failed);
            return Err(CheckoutError::EmptyCart);
        }

        self.enter(CheckoutPhase::Processing);

        // Snapshot the items: the cart must stay untouched until the outcome
        // is known, and `clear` below must not race the iteration.
        let items: Vec<_> = cart.items().to_vec();
        let attempted = items.len();
        let mut orders: Vec<Order> = Vec::new();

        for item in &items {
            let slug = item.product.slug.as_str();
            match self.orders.create_order(buyer, slug) {
                Ok(order) => {
                    self.track_tolerantly(&order.id);
                    orders.push(order);
                }
                Err(err) => {
                    tracing::error!(
                        slug,
                        error = %err,
                        user_message = %err.user_message(),
                        "order creation failed"
                    );
                    match self.policy {
                        CheckoutPolicy::BestEffort => continue,
                        CheckoutPolicy::AllOrNothing => {
                            self.enter(CheckoutPhase::Failed);
                            return Err(CheckoutError::OrderFailed {
                                slug: slug.to_string(),
                                message: err.user_message(),
                            });
                        }
                    }
                }
            }
        }

        if orders.is_empty() {
            self.enter(CheckoutPhase::Failed);
            return Err(CheckoutError::AllOrdersFailed { attempted });
        }

        cart.clear();
        self.nav.redirect(&order_path(&orders[0].id));
        self.enter(CheckoutPhase::Completed);
        Ok(orders)
    }

    /// Single-product path (buy-now): same auth gate and redirect behavior,
    /// one order, one tolerated tracking call. The cart is not involved.
    pub fn create_order(
        &mut self,
        user: Option<&User>,
        product_slug: &str,
    ) -> Result<Order, CheckoutError> {
        let Some(buyer) = user else {
            self.nav.redirect(LOGIN_PATH);
            return Err(CheckoutError::NotAuthenticated);
        };

        match self.orders.create_order(buyer, product_slug) {
            Ok(order) => {
                self.track_tolerantly(&order.id);
                Ok(order)
            }
            Err(err) => {
                tracing::error!(slug = product_slug, error = %err, "order creation failed");
                Err(CheckoutError::OrderFailed {
                    slug: product_slug.to_string(),
                    message: err.user_message(),
                })
            }
        }
    }

    // -----------------------------------------------------------------------
    // Private helpers
    // -----------------------------------------------------------------------

    /// Phase bookkeeping. The sequencer only performs transitions the table
    /// in [`CheckoutPhase::can_advance`] allows; the assert documents that.
    fn enter(&mut self, next: CheckoutPhase) {
        debug_assert!(
            self.phase.can_advance(next),
            "sequencer attempted {:?} -> {:?}",
            self.phase,
            next
        );
        self.phase = next;
    }

    fn track_tolerantly(&mut self, order_id: &str) {
        if let Err(err) = self.tracker.track_purchase(order_id) {
            tracing::warn!(order_id, error = %err, "purchase tracking failed");
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use cnx_types::{Cents, OrderStatus, Product, ProductCategory, ProductKind};
    use std::collections::BTreeSet;

    // -- Stub collaborators --------------------------------------------------

    /// Creates `ord-N` orders, failing for configured slugs.
    #[derive(Default)]
    struct StubOrders {
        fail_slugs: BTreeSet<String>,
        calls: Vec<String>,
        seq: u32,
    }

    impl StubOrders {
        fn failing(slugs: &[&str]) -> Self {
            Self {
                fail_slugs: slugs.iter().map(|s| s.to_string()).collect(),
                ..Self::default()
            }
        }
    }

    impl OrderApi for StubOrders {
        fn create_order(&mut self, buyer: &User, product_slug: &str) -> Result<Order, StoreError> {
            self.calls.push(product_slug.to_string());
            if self.fail_slugs.contains(product_slug) {
                return Err(StoreError::network("simulated outage"));
            }
            self.seq += 1;
            Ok(Order {
                id: format!("ord-{:06}", self.seq),
                product_id: format!("prd-{product_slug}"),
                product_title: product_slug.to_string(),
                product_slug: product_slug.to_string(),
                buyer_id: buyer.id.clone(),
                buyer_email: buyer.email.clone(),
                amount: Cents::new(2_000),
                platform_fee: Cents::new(200),
                creator_earnings: Cents::new(1_800),
                status: OrderStatus::Completed,
                created_at: Utc::now(),
                download_url: format!("/downloads/{product_slug}.zip"),
            })
        }
    }

    #[derive(Default)]
    struct RecordingTracker {
        tracked: Vec<String>,
        fail_all: bool,
    }

    impl PurchaseTracker for RecordingTracker {
        fn track_purchase(&mut self, order_id: &str) -> Result<(), StoreError> {
            if self.fail_all {
                return Err(StoreError::server("tracker down"));
            }
            self.tracked.push(order_id.to_string());
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingNav {
        visited: Vec<String>,
    }

    impl Navigator for RecordingNav {
        fn redirect(&mut self, path: &str) {
            self.visited.push(path.to_string());
        }
    }

    // -- Helpers -------------------------------------------------------------

    type TestSequencer = CheckoutSequencer<StubOrders, RecordingTracker, RecordingNav>;

    fn sequencer(orders: StubOrders, policy: CheckoutPolicy) -> TestSequencer {
        CheckoutSequencer::with_policy(
            orders,
            RecordingTracker::default(),
            RecordingNav::default(),
            policy,
        )
    }

    fn buyer() -> User {
        let now = Utc::now();
        User {
            id: "usr-buyer".to_string(),
            email: "buyer@example.com".to_string(),
            name: "buyer".to_string(),
            is_creator: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn product(slug: &str, price: i64) -> Product {
        let now = Utc::now();
        Product {
            id: format!("prd-{slug}"),
            title: slug.to_string(),
            slug: slug.to_string(),
            description: String::new(),
            price: Cents::new(price),
            kind: ProductKind::Ebook,
            category: ProductCategory::Ebooks,
            image: String::new(),
            download_url: String::new(),
            features: Vec::new(),
            creator_id: "usr-c".to_string(),
            creator_name: "c".to_string(),
            created_at: now,
            updated_at: now,
            sales_count: 0,
            rating_tenths: 0,
        }
    }

    fn cart_with(slugs: &[(&str, u32)]) -> CartLedger {
        let mut cart = CartLedger::new();
        for (slug, qty) in slugs {
            cart.add(product(slug, 2_000), *qty).unwrap();
        }
        cart
    }

    // -- Auth gate -----------------------------------------------------------

    #[test]
    fn missing_user_redirects_to_login_without_collaborator_calls() {
        let mut seq = sequencer(StubOrders::default(), CheckoutPolicy::BestEffort);
        let mut cart = cart_with(&[("a", 1)]);

        let err = seq.process_checkout(None, &mut cart).unwrap_err();
        assert_eq!(err, CheckoutError::NotAuthenticated);
        assert_eq!(seq.navigator().visited, vec![LOGIN_PATH.to_string()]);
        assert!(seq.order_api().calls.is_empty());
        assert_eq!(cart.item_count(), 1, "cart untouched");
        assert_eq!(seq.phase(), CheckoutPhase::Failed);
    }

    // -- Empty cart ----------------------------------------------------------

    #[test]
    fn empty_cart_refused_without_navigation() {
        let mut seq = sequencer(StubOrders::default(), CheckoutPolicy::BestEffort);
        let mut cart = CartLedger::new();

        let err = seq.process_checkout(Some(&buyer()), &mut cart).unwrap_err();
        assert_eq!(err, CheckoutError::EmptyCart);
        assert!(seq.navigator().visited.is_empty());
        assert!(seq.order_api().calls.is_empty());
    }

    // -- Sequencing / success ------------------------------------------------

    #[test]
    fn items_processed_strictly_in_cart_order() {
        let mut seq = sequencer(StubOrders::default(), CheckoutPolicy::BestEffort);
        let mut cart = cart_with(&[("first", 1), ("second", 2), ("third", 1)]);

        let orders = seq.process_checkout(Some(&buyer()), &mut cart).unwrap();
        assert_eq!(orders.len(), 3);
        assert_eq!(seq.order_api().calls, vec!["first", "second", "third"]);
    }

    #[test]
    fn success_clears_cart_and_redirects_to_first_order_exactly_once() {
        let mut seq = sequencer(StubOrders::default(), CheckoutPolicy::BestEffort);
        let mut cart = cart_with(&[("a", 1), ("b", 1)]);

        let orders = seq.process_checkout(Some(&buyer()), &mut cart).unwrap();
        assert!(cart.is_empty());
        assert_eq!(
            seq.navigator().visited,
            vec![order_path(&orders[0].id)],
            "exactly one redirect, to the first order"
        );
        assert_eq!(seq.phase(), CheckoutPhase::Completed);
    }

    #[test]
    fn every_successful_order_is_tracked() {
        let mut seq = sequencer(StubOrders::default(), CheckoutPolicy::BestEffort);
        let mut cart = cart_with(&[("a", 1), ("b", 1)]);

        let orders = seq.process_checkout(Some(&buyer()), &mut cart).unwrap();
        let ids: Vec<String> = orders.iter().map(|o| o.id.clone()).collect();
        assert_eq!(seq.tracker().tracked, ids);
    }

    // -- Partial failure: best effort ----------------------------------------

    #[test]
    fn best_effort_continues_past_failed_items() {
        let mut seq = sequencer(StubOrders::failing(&["b"]), CheckoutPolicy::BestEffort);
        let mut cart = cart_with(&[("a", 1), ("b", 1), ("c", 1)]);

        let orders = seq.process_checkout(Some(&buyer()), &mut cart).unwrap();
        let slugs: Vec<&str> = orders.iter().map(|o| o.product_slug.as_str()).collect();
        assert_eq!(slugs, vec!["a", "c"]);
        // The failed item was still attempted before moving on.
        assert_eq!(seq.order_api().calls, vec!["a", "b", "c"]);
        assert!(cart.is_empty());
    }

    #[test]
    fn first_fails_second_succeeds_redirect_targets_the_survivor() {
        let mut seq = sequencer(StubOrders::failing(&["a"]), CheckoutPolicy::BestEffort);
        let mut cart = cart_with(&[("a", 1), ("b", 1)]);

        let orders = seq.process_checkout(Some(&buyer()), &mut cart).unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].product_slug, "b");
        assert_eq!(seq.navigator().visited, vec![order_path(&orders[0].id)]);
    }

    #[test]
    fn all_items_failing_refuses_and_leaves_cart_intact() {
        let mut seq = sequencer(StubOrders::failing(&["a", "b"]), CheckoutPolicy::BestEffort);
        let mut cart = cart_with(&[("a", 1), ("b", 1)]);

        let err = seq.process_checkout(Some(&buyer()), &mut cart).unwrap_err();
        assert_eq!(err, CheckoutError::AllOrdersFailed { attempted: 2 });
        assert_eq!(cart.item_count(), 2);
        assert!(seq.navigator().visited.is_empty());
        assert_eq!(seq.phase(), CheckoutPhase::Failed);
    }

    // -- Partial failure: all or nothing -------------------------------------

    #[test]
    fn all_or_nothing_stops_at_first_failure() {
        let mut seq = sequencer(StubOrders::failing(&["b"]), CheckoutPolicy::AllOrNothing);
        let mut cart = cart_with(&[("a", 1), ("b", 1), ("c", 1)]);

        let err = seq.process_checkout(Some(&buyer()), &mut cart).unwrap_err();
        match err {
            CheckoutError::OrderFailed { slug, message } => {
                assert_eq!(slug, "b");
                // User-facing copy, not the internal error.
                assert_eq!(
                    message,
                    "Network error. Please check your connection and try again."
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // "c" was never attempted; the cart survives.
        assert_eq!(seq.order_api().calls, vec!["a", "b"]);
        assert_eq!(cart.item_count(), 3);
        assert!(seq.navigator().visited.is_empty());
    }

    // -- Tracker tolerance ---------------------------------------------------

    #[test]
    fn tracker_failure_does_not_fail_checkout() {
        let mut seq = CheckoutSequencer::new(
            StubOrders::default(),
            RecordingTracker {
                fail_all: true,
                ..RecordingTracker::default()
            },
            RecordingNav::default(),
        );
        let mut cart = cart_with(&[("a", 1)]);

        let orders = seq.process_checkout(Some(&buyer()), &mut cart).unwrap();
        assert_eq!(orders.len(), 1);
        assert!(cart.is_empty());
    }

    // -- Single-order path ---------------------------------------------------

    #[test]
    fn create_order_requires_login() {
        let mut seq = sequencer(StubOrders::default(), CheckoutPolicy::BestEffort);
        let err = seq.create_order(None, "a").unwrap_err();
        assert_eq!(err, CheckoutError::NotAuthenticated);
        assert_eq!(seq.navigator().visited, vec![LOGIN_PATH.to_string()]);
    }

    #[test]
    fn create_order_returns_mapped_failure() {
        let mut seq = sequencer(StubOrders::failing(&["a"]), CheckoutPolicy::BestEffort);
        let err = seq.create_order(Some(&buyer()), "a").unwrap_err();
        assert_eq!(
            err.user_message(),
            "Network error. Please check your connection and try again."
        );
    }

    #[test]
    fn create_order_tracks_on_success() {
        let mut seq = sequencer(StubOrders::default(), CheckoutPolicy::BestEffort);
        let order = seq.create_order(Some(&buyer()), "a").unwrap();
        assert_eq!(seq.tracker().tracked, vec![order.id]);
    }

    // -- Re-invocation -------------------------------------------------------

    #[test]
    fn sequencer_is_reusable_after_failure() {
        let mut seq = sequencer(StubOrders::failing(&["a"]), CheckoutPolicy::BestEffort);
        let mut cart = cart_with(&[("a", 1)]);
        assert!(seq.process_checkout(Some(&buyer()), &mut cart).is_err());

        // Retry is an explicit user action: a later invocation with a
        // healthy cart succeeds from the Failed phase.
        let mut cart2 = cart_with(&[("b", 1)]);
        let orders = seq.process_checkout(Some(&buyer()), &mut cart2).unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(seq.phase(), CheckoutPhase::Completed);
    }
}
