//! cnx-checkout
//!
//! The checkout sequencer: turns cart contents into confirmed orders via the
//! external order-creation collaborator, one product at a time, then clears
//! the cart and reports the redirect target.
//!
//! - Collaborators are injected behind the [`OrderApi`], [`PurchaseTracker`]
//!   and [`Navigator`] traits; the authenticated user is an explicit
//!   parameter, never ambient state.
//! - Items are processed strictly in cart order; each order-creation call
//!   completes (or fails) before the next begins.
//! - The partial-failure policy is an explicit configuration choice
//!   ([`CheckoutPolicy`]), not a hidden default.
//! - Every invocation walks the [`CheckoutPhase`] state machine; the
//!   terminal phase is observable for diagnostics.

mod phase;
mod sequencer;

pub use phase::{CheckoutPhase, PhaseError};
pub use sequencer::{
    order_path, CheckoutError, CheckoutPolicy, CheckoutSequencer, Navigator, NoopTracker,
    OrderApi, PurchaseTracker, LOGIN_PATH,
};
