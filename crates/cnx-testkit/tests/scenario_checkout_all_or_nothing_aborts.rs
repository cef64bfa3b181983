//! Scenario: the all-or-nothing policy stops at the first failed item.
//!
//! Configured via `/checkout/policy: all_or_nothing`, the sequencer must
//! refuse the whole checkout on the first failure, leave the cart intact,
//! and never navigate. Items after the failure are not attempted.

use cnx_checkout::{CheckoutError, CheckoutPolicy};
use cnx_config::{load_layered_yaml_from_strings, StoreConfig};
use cnx_testkit::Storefront;

fn all_or_nothing_store() -> Storefront {
    let cfg = load_layered_yaml_from_strings(&["checkout:\n  policy: all_or_nothing\n"]).unwrap();
    let config = StoreConfig::from_loaded(&cfg).unwrap();
    assert_eq!(config.policy, CheckoutPolicy::AllOrNothing);
    Storefront::with_config(config)
}

#[test]
fn first_failure_aborts_the_whole_checkout() {
    let mut store = all_or_nothing_store();
    store.login("buyer@example.com").unwrap();
    store.add_to_cart("deep-work-planner", 1).unwrap();
    store.add_to_cart("creator-toolkit", 1).unwrap();
    store.add_to_cart("mindset-audio-pack", 1).unwrap();
    store.fail_slug("creator-toolkit");

    let err = store.checkout().unwrap_err();

    match err {
        CheckoutError::OrderFailed { slug, message } => {
            assert_eq!(slug, "creator-toolkit");
            // Scripted failures are network-shaped; the user sees mapped copy.
            assert_eq!(
                message,
                "Network error. Please check your connection and try again."
            );
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert_eq!(store.cart.item_count(), 3, "cart untouched");
    assert!(store.visited().is_empty());
    // The first item's order was created before the abort and remains on
    // the server — the sequencer performs no reconciliation.
    assert_eq!(store.order_store().len(), 1);
    // The third item was never attempted.
    assert!(store
        .order_store()
        .orders_for_buyer(&store.session.current_user().unwrap().id)
        .iter()
        .all(|o| o.product_slug != "mindset-audio-pack"));
}

#[test]
fn all_or_nothing_with_no_failures_behaves_like_best_effort() {
    let mut store = all_or_nothing_store();
    store.login("buyer@example.com").unwrap();
    store.add_to_cart("deep-work-planner", 1).unwrap();
    store.add_to_cart("creator-toolkit", 1).unwrap();

    let orders = store.checkout().unwrap();

    assert_eq!(orders.len(), 2);
    assert!(store.cart.is_empty());
    assert_eq!(store.visited().len(), 1);
}
