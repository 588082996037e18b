//! Cart behaviour through the public API, using an in-memory store.

use rust_decimal::Decimal;
use serde_json::json;
use testresult::TestResult;

use storefront_cart::prelude::*;

fn session() -> CartSession<MemoryStore> {
    CartSession::open(MemoryStore::new(), &CartConfig::default())
}

#[test]
fn repeated_add_keeps_first_price() -> TestResult {
    let mut cart = session();

    assert!(cart.add_item(ItemInput::new(1, "Mug", Decimal::from(10))).is_none());
    assert!(cart.add_item(ItemInput::new(1, "Mug", Decimal::from(999))).is_none());

    let line = cart.state().line(ProductId::new(1)).ok_or("missing line")?;

    assert_eq!(line.quantity(), 2);
    assert_eq!(line.unit_price(), Decimal::from(10));
    assert_eq!(cart.totals().subtotal, Decimal::from(20));
    assert_eq!(cart.total_item_count(), 2);

    Ok(())
}

#[test]
fn single_item_over_threshold_ships_free() {
    let mut cart = session();

    assert!(cart.add_item(ItemInput::new(2, "Lamp", Decimal::from(60))).is_none());

    let totals = cart.totals();

    assert_eq!(totals.subtotal, Decimal::from(60));
    assert_eq!(totals.shipping, Decimal::ZERO);
    assert_eq!(totals.tax, Decimal::new(48, 1));
    assert_eq!(totals.total, Decimal::new(648, 1));
}

#[test]
fn small_order_pays_flat_shipping() {
    let mut cart = session();

    assert!(cart.add_item(ItemInput::new(3, "Pen", Decimal::new(250, 2))).is_none());

    assert_eq!(cart.totals().shipping, Decimal::new(599, 2));
}

#[test]
fn non_numeric_product_id_is_dropped_on_load() -> TestResult {
    let hydrated = snapshot_lines(&json!({
        "lines": [{ "productId": "x", "name": "Bad", "unitPrice": 1, "quantity": 1 }]
    }))?;

    let mut state = CartState::default();
    state.apply(CartCommand::LoadCart(hydrated.lines));

    assert!(state.lines().is_empty());
    assert_eq!(state.totals(), &Totals::default());

    Ok(())
}

#[test]
fn update_to_zero_and_remove_agree() {
    let mut updated = session();
    let mut removed = session();

    for cart in [&mut updated, &mut removed] {
        assert!(cart.add_item(ItemInput::new(1, "Mug", Decimal::from(10))).is_none());
        assert!(cart.add_item(ItemInput::new(2, "Tea", Decimal::from(4))).is_none());
    }

    assert!(updated.update_quantity(ProductId::new(2), 0).is_none());
    assert!(removed.remove_item(ProductId::new(2)).is_none());

    assert_eq!(updated.state().lines(), removed.state().lines());
}

#[test]
fn invalid_add_payload_is_a_warning() -> TestResult {
    let mut cart = session();

    let payload: ItemInput = serde_json::from_value(json!({ "name": "No id", "unitPrice": 3 }))?;

    assert!(matches!(
        cart.add_item(payload),
        Some(CartWarning::InvalidItem(ItemError::MissingProductId))
    ));
    assert!(cart.state().is_empty());

    Ok(())
}

#[test]
fn reopened_session_reproduces_lines() -> TestResult {
    let mut cart = session();

    assert!(
        cart.add_item(
            ItemInput::new(5, "Headphones", Decimal::new(19999, 2))
                .with_original_price(Decimal::new(24999, 2))
                .with_image_url("/img/5.jpg")
                .with_category("audio"),
        )
        .is_none()
    );
    assert!(cart.add_item(ItemInput::new(6, "Cable", Decimal::new(125, 1))).is_none());
    assert!(cart.update_quantity(ProductId::new(6), 4).is_none());
    assert!(cart.toggle_open().is_none());

    let lines = cart.state().lines().to_vec();
    let totals = *cart.totals();

    let reopened = CartSession::open(cart.into_store(), &CartConfig::default());

    assert_eq!(reopened.state().lines(), lines.as_slice());
    assert_eq!(reopened.totals(), &totals);
    assert!(!reopened.state().is_open());

    Ok(())
}

#[test]
fn empty_cart_after_removal_has_no_shipping() {
    let mut cart = session();

    assert!(cart.add_item(ItemInput::new(1, "Mug", Decimal::from(10))).is_none());
    assert!(cart.remove_item(ProductId::new(1)).is_none());

    assert_eq!(cart.totals(), &Totals::default());
}

fn snapshot_lines(value: &serde_json::Value) -> TestResult<Hydrated> {
    Ok(storefront_cart::snapshot::decode(&value.to_string())?)
}
