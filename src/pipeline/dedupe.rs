// src/pipeline/dedupe.rs

//! Removal of structurally identical records.

use std::collections::HashSet;

use serde::Serialize;
use sha2::{Digest, Sha256};

/// SHA-256 of a record's canonical JSON form.
///
/// Returns None if the record cannot be serialized.
pub fn fingerprint<T: Serialize>(item: &T) -> Option<String> {
    let json = serde_json::to_vec(item).ok()?;
    Some(hex::encode(Sha256::digest(&json)))
}

/// Drop repeated records, keeping the first occurrence of each.
///
/// Equality is over the serialized form. Records that fail to serialize are
/// always kept.
pub fn dedupe<T: Serialize>(items: Vec<T>) -> Vec<T> {
    let before = items.len();
    let mut seen = HashSet::new();
    let unique: Vec<T> = items
        .into_iter()
        .filter(|item| match fingerprint(item) {
            Some(key) => seen.insert(key),
            None => true,
        })
        .collect();

    if unique.len() < before {
        log::info!(
            "Removed {} duplicate records ({} -> {})",
            before - unique.len(),
            before,
            unique.len()
        );
    }
    unique
}
