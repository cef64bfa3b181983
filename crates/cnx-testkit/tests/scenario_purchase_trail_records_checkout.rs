//! Scenario: wiring the analytics trail as the purchase tracker records one
//! chained event per created order, and the trail verifies afterwards.

use cnx_analytics::{verify_chain, ChainStatus, EventLog};
use cnx_auth::SessionStore;
use cnx_cart::CartLedger;
use cnx_catalog::Catalog;
use cnx_checkout::CheckoutSequencer;
use cnx_orders::OrderStore;
use cnx_testkit::RecordingNavigator;
use uuid::Uuid;

#[test]
fn checkout_purchases_land_in_a_verifiable_trail() {
    let dir = tempfile::tempdir().unwrap();
    let trail_path = dir.path().join("events.jsonl");

    let catalog = Catalog::with_fixtures();
    let mut session = SessionStore::new();
    let buyer = session.login("buyer@example.com", "pw").unwrap().clone();

    let mut cart = CartLedger::new();
    cart.add(catalog.get("deep-work-planner").cloned().unwrap(), 1)
        .unwrap();
    cart.add(catalog.get("creator-toolkit").cloned().unwrap(), 1)
        .unwrap();

    let trail = EventLog::new(&trail_path, Uuid::new_v4(), true).unwrap();
    let mut sequencer = CheckoutSequencer::new(
        OrderStore::new(catalog),
        trail,
        RecordingNavigator::default(),
    );

    let orders = sequencer
        .process_checkout(Some(&buyer), &mut cart)
        .unwrap();
    assert_eq!(orders.len(), 2);

    // One purchase event per order, chain intact.
    assert_eq!(
        verify_chain(&trail_path).unwrap(),
        ChainStatus::Valid { events: 2 }
    );
    let content = std::fs::read_to_string(&trail_path).unwrap();
    for order in &orders {
        assert!(content.contains(&order.id), "missing event for {}", order.id);
    }
}
