//! Cart session
//!
//! Owns a [`CartState`] together with the store it persists to. Every command
//! runs in two steps: the state transition, then a write of the full snapshot.
//! Nothing here fails towards the caller; problems come back as
//! [`CartWarning`]s and are logged.

use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    cart::{CartCommand, CartState},
    config::CartConfig,
    lines::{ItemError, ItemInput, NewItem},
    pricing::Totals,
    products::ProductId,
    snapshot::{self, SnapshotError},
    store::{KeyValueStore, StoreError},
};

/// Non-fatal outcome of a session command.
#[derive(Debug, Error)]
pub enum CartWarning {
    /// The add-to-cart payload was rejected; the cart is unchanged.
    #[error("ignored invalid item: {0}")]
    InvalidItem(#[from] ItemError),

    /// The state changed in memory but could not be encoded.
    #[error("cart not saved: {0}")]
    Encode(#[from] SnapshotError),

    /// The state changed in memory but the store write failed.
    #[error("cart not saved: {0}")]
    Persist(#[from] StoreError),
}

/// A cart bound to the store it persists to.
#[derive(Debug)]
pub struct CartSession<S> {
    state: CartState,
    store: S,
    storage_key: String,
}

impl<S: KeyValueStore> CartSession<S> {
    /// Opens a session, hydrating the cart once from `store`.
    ///
    /// Unreadable or malformed stored state is discarded and the cart starts empty.
    /// The hydrated cart is written back only when it differs from what was stored.
    pub fn open(store: S, config: &CartConfig) -> Self {
        let mut session = Self {
            state: CartState::new(config.pricing),
            store,
            storage_key: config.storage_key.clone(),
        };

        session.hydrate();

        session
    }

    fn hydrate(&mut self) {
        let stored = match self.store.get(&self.storage_key) {
            Ok(Some(stored)) => stored,
            Ok(None) => return,
            Err(err) => {
                warn!(key = %self.storage_key, error = %err, "could not read stored cart");
                return;
            }
        };

        match snapshot::decode(&stored) {
            Ok(hydrated) => {
                if hydrated.dropped > 0 {
                    warn!(
                        key = %self.storage_key,
                        dropped = hydrated.dropped,
                        "dropped invalid stored cart entries"
                    );
                }

                self.state.apply(CartCommand::LoadCart(hydrated.lines));

                let unchanged =
                    snapshot::encode(&self.state).is_ok_and(|normalized| normalized == stored);

                if unchanged {
                    debug!(key = %self.storage_key, "stored cart is already normalized");
                } else if self.persist().is_err() {
                    debug!(key = %self.storage_key, "hydrated cart kept in memory only");
                }
            }
            Err(err) => {
                warn!(key = %self.storage_key, error = %err, "discarding stored cart");

                if let Err(err) = self.store.remove(&self.storage_key) {
                    warn!(key = %self.storage_key, error = %err, "could not remove stored cart");
                }
            }
        }
    }

    /// Applies `command`, then writes the resulting state to the store.
    ///
    /// A failed write does not undo the in-memory transition.
    pub fn dispatch(&mut self, command: CartCommand) -> Option<CartWarning> {
        debug!(?command, "applying cart command");

        self.state.apply(command);

        self.persist().err()
    }

    fn persist(&mut self) -> Result<(), CartWarning> {
        let result = snapshot::encode(&self.state)
            .map_err(CartWarning::from)
            .and_then(|json| {
                self.store
                    .set(&self.storage_key, &json)
                    .map_err(CartWarning::from)
            });

        if let Err(err) = &result {
            warn!(key = %self.storage_key, error = %err, "could not persist cart");
        }

        result
    }

    /// Validates `input` and adds one unit of it.
    ///
    /// An invalid payload leaves the cart and the store untouched.
    pub fn add_item(&mut self, input: ItemInput) -> Option<CartWarning> {
        match NewItem::try_from(input) {
            Ok(item) => self.dispatch(CartCommand::AddItem(item)),
            Err(err) => {
                warn!(error = %err, "ignoring invalid cart item");

                Some(err.into())
            }
        }
    }

    /// Removes the line for `product_id`, if any.
    pub fn remove_item(&mut self, product_id: ProductId) -> Option<CartWarning> {
        self.dispatch(CartCommand::RemoveItem(product_id))
    }

    /// Sets the quantity for `product_id`; zero or less removes the line.
    pub fn update_quantity(
        &mut self,
        product_id: ProductId,
        quantity: i64,
    ) -> Option<CartWarning> {
        self.dispatch(CartCommand::UpdateQuantity {
            product_id,
            quantity,
        })
    }

    /// Empties the cart.
    pub fn clear(&mut self) -> Option<CartWarning> {
        self.dispatch(CartCommand::ClearCart)
    }

    /// Flips the drawer visibility flag.
    pub fn toggle_open(&mut self) -> Option<CartWarning> {
        self.dispatch(CartCommand::ToggleOpen)
    }

    /// Hides the drawer.
    pub fn close(&mut self) -> Option<CartWarning> {
        self.dispatch(CartCommand::CloseOpen)
    }

    /// Current cart state.
    pub fn state(&self) -> &CartState {
        &self.state
    }

    /// Current derived totals.
    pub fn totals(&self) -> &Totals {
        self.state.totals()
    }

    /// Units in the cart, for the header badge.
    pub fn total_item_count(&self) -> u64 {
        self.state.total_item_count()
    }

    /// Key the cart is persisted under.
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// The backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Ends the session, handing back the store.
    pub fn into_store(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use rust_decimal::Decimal;
    use serde_json::{Value, json};
    use testresult::TestResult;

    use crate::store::MemoryStore;

    use super::*;

    /// Store whose writes always fail.
    #[derive(Debug, Default)]
    struct ReadOnlyStore {
        inner: MemoryStore,
    }

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.inner.get(key)
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read only").into())
        }

        fn remove(&mut self, key: &str) -> Result<(), StoreError> {
            self.inner.remove(key)
        }
    }

    /// Store that counts successful writes.
    #[derive(Debug, Default)]
    struct CountingStore {
        inner: MemoryStore,
        writes: usize,
    }

    impl KeyValueStore for CountingStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
            self.writes += 1;
            self.inner.set(key, value)
        }

        fn remove(&mut self, key: &str) -> Result<(), StoreError> {
            self.inner.remove(key)
        }
    }

    fn stored_field(session: &CartSession<MemoryStore>, field: &str) -> TestResult<Value> {
        let stored = session.store().get("cart")?.ok_or("nothing stored")?;
        let stored: Value = serde_json::from_str(&stored)?;

        Ok(stored.get(field).cloned().unwrap_or_default())
    }

    #[test]
    fn open_on_empty_store_starts_empty_without_writing() {
        let session = CartSession::open(MemoryStore::new(), &CartConfig::default());

        assert!(session.state().is_empty());
        assert!(session.store().is_empty());
    }

    #[test]
    fn every_command_is_persisted() -> TestResult {
        let mut session = CartSession::open(MemoryStore::new(), &CartConfig::default());

        assert!(
            session
                .add_item(ItemInput::new(1, "Notebook", Decimal::from(12)))
                .is_none()
        );
        assert_eq!(stored_field(&session, "totalItemCount")?, json!(1));

        assert!(session.toggle_open().is_none());
        assert_eq!(stored_field(&session, "isOpen")?, json!(true));

        assert!(session.update_quantity(ProductId::new(1), 3).is_none());
        assert_eq!(stored_field(&session, "subtotal")?, json!(36.0));

        assert!(session.clear().is_none());
        assert_eq!(stored_field(&session, "lines")?, json!([]));
        assert_eq!(stored_field(&session, "isOpen")?, json!(false));

        Ok(())
    }

    #[test]
    fn invalid_item_is_a_warning_and_not_persisted() {
        let mut session = CartSession::open(MemoryStore::new(), &CartConfig::default());

        let warning = session.add_item(ItemInput::default());

        assert!(matches!(
            warning,
            Some(CartWarning::InvalidItem(ItemError::MissingProductId))
        ));
        assert!(session.state().is_empty());
        assert!(session.store().is_empty());
    }

    #[test]
    fn failed_write_keeps_in_memory_update() {
        let mut session = CartSession::open(ReadOnlyStore::default(), &CartConfig::default());

        let warning = session.add_item(ItemInput::new(9, "Poster", Decimal::from(15)));

        assert!(matches!(warning, Some(CartWarning::Persist(StoreError::Io(_)))));
        assert_eq!(session.total_item_count(), 1);
    }

    #[test]
    fn malformed_stored_cart_is_discarded() -> TestResult {
        let mut store = MemoryStore::new();
        store.set("cart", "{\"lines\": oops")?;

        let session = CartSession::open(store, &CartConfig::default());

        assert!(session.state().is_empty());
        assert_eq!(session.store().get("cart")?, None);

        Ok(())
    }

    #[test]
    fn stored_cart_without_lines_is_discarded() -> TestResult {
        let mut store = MemoryStore::new();
        store.set("cart", "[1, 2, 3]")?;

        let session = CartSession::open(store, &CartConfig::default());

        assert!(session.state().is_empty());
        assert_eq!(session.store().get("cart")?, None);

        Ok(())
    }

    #[test]
    fn hydration_recomputes_totals_and_writes_back() -> TestResult {
        let mut store = MemoryStore::new();
        store.set(
            "cart",
            &json!({
                "lines": [
                    { "productId": 1, "name": "Cap", "unitPrice": 20, "quantity": 2 },
                    { "productId": 2, "name": 42, "unitPrice": 5, "quantity": 1 }
                ],
                "isOpen": true,
                "subtotal": 1000,
                "total": 1000
            })
            .to_string(),
        )?;

        let session = CartSession::open(store, &CartConfig::default());

        assert_eq!(session.state().lines().len(), 1);
        assert!(!session.state().is_open());
        assert_eq!(session.totals().subtotal, Decimal::from(40));

        assert_eq!(stored_field(&session, "subtotal")?, json!(40.0));
        assert_eq!(
            stored_field(&session, "lines")?.as_array().map(Vec::len),
            Some(1)
        );

        Ok(())
    }

    #[test]
    fn reopening_a_normalized_cart_does_not_write() {
        let mut session = CartSession::open(CountingStore::default(), &CartConfig::default());
        assert!(
            session
                .add_item(ItemInput::new(1, "Notebook", Decimal::new(1299, 2)))
                .is_none()
        );
        assert!(session.update_quantity(ProductId::new(1), 2).is_none());

        let mut store = session.into_store();
        store.writes = 0;

        let reopened = CartSession::open(store, &CartConfig::default());

        assert_eq!(reopened.total_item_count(), 2);
        assert_eq!(reopened.store().writes, 0);
    }

    #[test]
    fn reopening_an_open_drawer_writes_it_closed() -> TestResult {
        let mut session = CartSession::open(CountingStore::default(), &CartConfig::default());
        assert!(session.add_item(ItemInput::new(1, "Pen", Decimal::ONE)).is_none());
        assert!(session.toggle_open().is_none());

        let mut store = session.into_store();
        store.writes = 0;

        let reopened = CartSession::open(store, &CartConfig::default());
        let stored = reopened.store().get("cart")?.ok_or("nothing stored")?;
        let stored: Value = serde_json::from_str(&stored)?;

        assert_eq!(reopened.store().writes, 1);
        assert_eq!(stored.get("isOpen"), Some(&json!(false)));

        Ok(())
    }

    #[test]
    fn custom_storage_key_is_used() -> TestResult {
        let config = CartConfig {
            storage_key: "guest-cart".to_string(),
            ..CartConfig::default()
        };
        let mut session = CartSession::open(MemoryStore::new(), &config);

        assert!(session.add_item(ItemInput::new(1, "Pen", Decimal::ONE)).is_none());

        let store = session.into_store();
        assert!(store.get("guest-cart")?.is_some());
        assert_eq!(store.get("cart")?, None);

        Ok(())
    }
}
