//! Snapshots
//!
//! JSON encoding of a [`CartState`] for the key-value store, and the reverse
//! path: structural validation of a stored snapshot back into cart lines.

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::{cart::CartState, lines::CartLine};

/// Errors encoding or decoding a stored cart.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The stored text is not JSON, or the state could not be encoded.
    #[error("invalid cart JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The stored JSON has no `lines` array.
    #[error("stored cart has no lines array")]
    MissingLines,
}

/// Lines recovered from a stored snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Hydrated {
    /// Entries that passed structural validation, in stored order.
    pub lines: Vec<CartLine>,

    /// Number of entries dropped for failing validation.
    pub dropped: usize,
}

/// Encodes the whole cart state: lines, visibility flag and derived totals.
///
/// # Errors
///
/// Returns a [`SnapshotError::Json`] if serialization fails.
pub fn encode(state: &CartState) -> Result<String, SnapshotError> {
    Ok(serde_json::to_string(state)?)
}

/// Decodes the lines of a stored snapshot, dropping entries that fail validation.
///
/// Stored totals and the visibility flag are ignored; totals are always
/// recomputed from the lines.
///
/// # Errors
///
/// - [`SnapshotError::Json`]: the text is not valid JSON.
/// - [`SnapshotError::MissingLines`]: the JSON is not an object with a `lines` array.
pub fn decode(json: &str) -> Result<Hydrated, SnapshotError> {
    let value: Value = serde_json::from_str(json)?;

    let entries = value
        .get("lines")
        .and_then(Value::as_array)
        .ok_or(SnapshotError::MissingLines)?;

    let mut lines = Vec::with_capacity(entries.len());
    let mut dropped = 0;

    for (index, entry) in entries.iter().enumerate() {
        match CartLine::try_from(entry) {
            Ok(line) => lines.push(line),
            Err(err) => {
                debug!(index, error = %err, "dropping stored cart entry");
                dropped += 1;
            }
        }
    }

    Ok(Hydrated { lines, dropped })
}
