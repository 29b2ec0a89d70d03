//! Entity identity generation.
//!
//! # Responsibility
//! - Produce globally unique string identifiers without storage coordination.
//!
//! # Invariants
//! - Generated IDs are canonical hyphenated UUID v4 strings and never empty.
//! - An ID is assigned once, on first store, unless the caller already set one.

use uuid::Uuid;

/// Returns a fresh random identifier.
///
/// Collision probability is treated as negligible, so no uniqueness check
/// against storage is performed.
pub fn new_identity() -> String {
    Uuid::new_v4().to_string()
}
