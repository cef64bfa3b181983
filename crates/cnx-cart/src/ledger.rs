//! Cart ledger — makes line-item and totals rules explicit and isolated.
//!
//! # Purpose
//! [`CartLedger`] owns the ordered line-item list and the derived money view
//! ([`CartTotals`]). It:
//!
//! - Enforces cart invariants on every mutation (no zero quantity, no empty
//!   slug, configurable quantity/size limits, no amount overflow).
//! - Recomputes subtotal / platform fee / total from the items after every
//!   mutation — totals are never adjusted incrementally.
//! - Leaves the ledger untouched when a mutation is rejected.
//! - Exposes read-only lookups for UI surfaces (`is_in_cart`, `get`,
//!   `item_count`).
//!
//! # Determinism
//! `CartLedger` is deterministic and pure — no IO, no time, no randomness.
//! Two ledgers fed the same sequence of operations always hold identical
//! state.

use cnx_types::{Cents, Product};

use crate::fees::{FeeError, FeeSchedule};
use crate::types::{CartItem, CartTotals};

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Configurable cart bounds.
///
/// The storefront historically enforced no bounds at all; both knobs default
/// to unlimited so the trusting behavior stays available, while deployments
/// can opt in to hard caps through configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CartLimits {
    /// Maximum quantity a single line item may reach.
    pub max_quantity: Option<u32>,
    /// Maximum number of distinct line items.
    pub max_distinct_items: Option<usize>,
}

impl CartLimits {
    /// No bounds enforced.
    pub const UNLIMITED: CartLimits = CartLimits {
        max_quantity: None,
        max_distinct_items: None,
    };
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// All invariant violations that `CartLedger` can surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    /// `add` requires a strictly positive quantity.
    NonPositiveQuantity,
    /// Product slug must be non-empty (it is the cart's uniqueness key).
    EmptySlug,
    /// A line item would exceed the configured per-item quantity cap.
    QuantityLimitExceeded {
        slug: String,
        requested: u32,
        limit: u32,
    },
    /// Merging quantities overflowed the quantity type.
    QuantityOverflow { slug: String },
    /// The cart would exceed the configured distinct-item cap.
    CartSizeLimitExceeded { limit: usize },
    /// `price × quantity` did not fit in an `i64` cent count.
    AmountOverflow { slug: String },
    /// Fee computation failed (negative subtotal or fee overflow).
    Fee(FeeError),
}

impl std::fmt::Display for CartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CartError::NonPositiveQuantity => {
                write!(f, "cart invariant: quantity must be > 0")
            }
            CartError::EmptySlug => write!(f, "cart invariant: product slug must not be empty"),
            CartError::QuantityLimitExceeded {
                slug,
                requested,
                limit,
            } => write!(
                f,
                "cart limit: quantity {requested} for '{slug}' exceeds cap {limit}"
            ),
            CartError::QuantityOverflow { slug } => {
                write!(f, "cart limit: quantity for '{slug}' overflowed")
            }
            CartError::CartSizeLimitExceeded { limit } => {
                write!(f, "cart limit: more than {limit} distinct items")
            }
            CartError::AmountOverflow { slug } => {
                write!(f, "cart invariant: line amount for '{slug}' overflowed")
            }
            CartError::Fee(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for CartError {}

impl From<FeeError> for CartError {
    fn from(err: FeeError) -> Self {
        CartError::Fee(err)
    }
}

// ---------------------------------------------------------------------------
// CartLedger
// ---------------------------------------------------------------------------

/// Ordered line-item ledger with derived totals.
///
/// Items keep insertion order; the uniqueness key is `product.slug`. All
/// operations are synchronous and atomic — a rejected mutation leaves both
/// items and totals exactly as they were.
#[derive(Debug, Clone)]
pub struct CartLedger {
    items: Vec<CartItem>,
    totals: CartTotals,
    fees: FeeSchedule,
    limits: CartLimits,
}

impl CartLedger {
    /// Empty cart with the default 10% fee schedule and no limits.
    pub fn new() -> Self {
        Self::with_policies(FeeSchedule::default(), CartLimits::UNLIMITED)
    }

    /// Empty cart with explicit fee schedule and limits.
    pub fn with_policies(fees: FeeSchedule, limits: CartLimits) -> Self {
        Self {
            items: Vec::new(),
            totals: CartTotals::ZERO,
            fees,
            limits,
        }
    }

    pub fn fee_schedule(&self) -> FeeSchedule {
        self.fees
    }

    pub fn limits(&self) -> CartLimits {
        self.limits
    }

    // -----------------------------------------------------------------------
    // Write surface
    // -----------------------------------------------------------------------

    /// Add `quantity` units of `product`.
    ///
    /// If the slug is already present its quantity is incremented; otherwise
    /// a new line item is appended. Totals are recomputed from the resulting
    /// items.
    ///
    /// # Errors
    /// Returns [`CartError`] on zero quantity, empty slug, limit violations,
    /// or amount overflow. The ledger is **not** mutated on error.
    pub fn add(&mut self, product: Product, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::NonPositiveQuantity);
        }
        if product.slug.trim().is_empty() {
            return Err(CartError::EmptySlug);
        }

        let mut next = self.items.clone();
        match next.iter().position(|i| i.product.slug == product.slug) {
            Some(idx) => {
                let merged = next[idx]
                    .quantity
                    .checked_add(quantity)
                    .ok_or_else(|| CartError::QuantityOverflow {
                        slug: product.slug.clone(),
                    })?;
                self.check_quantity(&product.slug, merged)?;
                next[idx].quantity = merged;
            }
            None => {
                self.check_quantity(&product.slug, quantity)?;
                if let Some(limit) = self.limits.max_distinct_items {
                    if next.len() >= limit {
                        return Err(CartError::CartSizeLimitExceeded { limit });
                    }
                }
                next.push(CartItem::new(product, quantity));
            }
        }

        self.commit(next)
    }

    /// Add a single unit of `product`.
    pub fn add_one(&mut self, product: Product) -> Result<(), CartError> {
        self.add(product, 1)
    }

    /// Remove the line item with the given slug. No-op (not an error) when
    /// the slug is absent.
    pub fn remove(&mut self, slug: &str) -> Result<(), CartError> {
        if !self.is_in_cart(slug) {
            return Ok(());
        }
        let next: Vec<CartItem> = self
            .items
            .iter()
            .filter(|i| i.product.slug != slug)
            .cloned()
            .collect();
        self.commit(next)
    }

    /// Replace a line item's quantity in place.
    ///
    /// `quantity == 0` behaves exactly as [`remove`](Self::remove) and is
    /// idempotent. An absent slug is a no-op, matching `remove`'s tolerance.
    pub fn update_quantity(&mut self, slug: &str, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return self.remove(slug);
        }
        if !self.is_in_cart(slug) {
            return Ok(());
        }
        self.check_quantity(slug, quantity)?;

        let mut next = self.items.clone();
        for item in next.iter_mut() {
            if item.product.slug == slug {
                item.quantity = quantity;
            }
        }
        self.commit(next)
    }

    /// Reset to the empty state with all totals zero.
    pub fn clear(&mut self) {
        self.items.clear();
        self.totals = CartTotals::ZERO;
    }

    // -----------------------------------------------------------------------
    // Read surface
    // -----------------------------------------------------------------------

    /// Sum of all line-item quantities.
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Number of distinct line items.
    pub fn distinct_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_in_cart(&self, slug: &str) -> bool {
        self.items.iter().any(|i| i.product.slug == slug)
    }

    pub fn get(&self, slug: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.product.slug == slug)
    }

    /// Line items in insertion order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Current derived totals.
    pub fn totals(&self) -> CartTotals {
        self.totals
    }

    pub fn subtotal(&self) -> Cents {
        self.totals.subtotal
    }

    pub fn platform_fee(&self) -> Cents {
        self.totals.platform_fee
    }

    pub fn total(&self) -> Cents {
        self.totals.total
    }

    /// Recompute totals from the stored items and verify they match the
    /// running derived state. Returns `true` if consistent.
    ///
    /// This is an **integrity check** — for tests and audit flows only.
    pub fn verify_totals(&self) -> bool {
        match Self::compute_totals(&self.items, self.fees) {
            Ok(totals) => totals == self.totals,
            Err(_) => false,
        }
    }

    // -----------------------------------------------------------------------
    // Private helpers
    // -----------------------------------------------------------------------

    fn check_quantity(&self, slug: &str, quantity: u32) -> Result<(), CartError> {
        if let Some(limit) = self.limits.max_quantity {
            if quantity > limit {
                return Err(CartError::QuantityLimitExceeded {
                    slug: slug.to_string(),
                    requested: quantity,
                    limit,
                });
            }
        }
        Ok(())
    }

    /// Swap in a new item list after recomputing totals from it. On error
    /// neither items nor totals change.
    fn commit(&mut self, next: Vec<CartItem>) -> Result<(), CartError> {
        let totals = Self::compute_totals(&next, self.fees)?;
        self.items = next;
        self.totals = totals;
        Ok(())
    }

    fn compute_totals(items: &[CartItem], fees: FeeSchedule) -> Result<CartTotals, CartError> {
        let mut subtotal = Cents::ZERO;
        for item in items {
            let line = item.line_amount().ok_or_else(|| CartError::AmountOverflow {
                slug: item.product.slug.clone(),
            })?;
            subtotal = subtotal
                .checked_add(line)
                .ok_or_else(|| CartError::AmountOverflow {
                    slug: item.product.slug.clone(),
                })?;
        }
        let platform_fee = fees.fee_for(subtotal)?;
        let total = subtotal
            .checked_add(platform_fee)
            .ok_or(CartError::Fee(FeeError::FeeOverflow { subtotal }))?;
        Ok(CartTotals {
            subtotal,
            platform_fee,
            total,
        })
    }
}

impl Default for CartLedger {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
