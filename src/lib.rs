//! Storefront Cart
//!
//! Shopping cart state machine for a storefront: cart lines with derived
//! totals, validation of untyped payloads, and a session that persists the
//! cart to a key-value store after every change.

pub mod cart;
pub mod config;
pub mod lines;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod session;
pub mod snapshot;
pub mod store;
pub mod summary;
pub mod utils;
