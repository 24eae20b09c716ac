mod note;

pub use note::{Note, UNTITLED};

use std::collections::BTreeMap;

/// All notes keyed by id. Storage order carries no meaning; see
/// [`sort_by_last_modified`] for presentation order.
pub type Collection = BTreeMap<String, Note>;

/// Generate a fresh note id (random 128-bit token, independent of the clock)
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Sort notes most recently modified first. The sort is stable, so ties keep
/// their incoming order.
pub fn sort_by_last_modified(notes: &mut [Note]) {
    notes.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
}
