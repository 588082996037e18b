//! Storefront cart prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{CartCommand, CartState},
    config::{CartConfig, ConfigError},
    lines::{CartLine, ItemError, ItemInput, LineError, NewItem},
    pricing::{PricingPolicy, Totals, calculate_totals},
    products::ProductId,
    session::{CartSession, CartWarning},
    snapshot::{Hydrated, SnapshotError},
    store::{FileStore, KeyValueStore, MemoryStore, StoreError},
    summary::{SummaryError, write_summary},
};
