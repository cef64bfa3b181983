use cnx_types::{Cents, Product};

/// A product-quantity pair held in the cart.
///
/// quantity is always >= 1; a quantity that would drop to zero removes the
/// item instead (see [`CartLedger::update_quantity`](crate::CartLedger)).
#[derive(Debug, Clone, PartialEq)]
pub struct CartItem {
    pub product: Product,
    pub quantity: u32,
}

impl CartItem {
    pub fn new(product: Product, quantity: u32) -> Self {
        debug_assert!(quantity > 0, "CartItem.quantity must be > 0");
        Self { product, quantity }
    }

    /// Line amount: unit price × quantity. `None` on overflow.
    pub fn line_amount(&self) -> Option<Cents> {
        self.product.price.checked_mul_qty(self.quantity)
    }
}

/// Derived money view of the cart.
///
/// Always recomputed from the items after every mutation — never mutated
/// independently. `total == subtotal + platform_fee` holds by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartTotals {
    pub subtotal: Cents,
    pub platform_fee: Cents,
    pub total: Cents,
}

impl CartTotals {
    pub const ZERO: CartTotals = CartTotals {
        subtotal: Cents::ZERO,
        platform_fee: Cents::ZERO,
        total: Cents::ZERO,
    };
}
