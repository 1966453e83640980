//! crates/laundry_core/src/reconcile.rs
//!
//! The restore policy, as a pure function.
//!
//! Local storage is authoritative whenever it holds an entry; the remote copy
//! is only consulted when it does not. There is no field-level merge between
//! the two copies.

use crate::domain::{default_categories, default_category_options, LaundryState, StoredState};

/// Which copy a restored state came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreSource {
    Local,
    Remote,
    Defaults,
}

/// Merges the winning stored copy over `defaults` and repairs it.
pub fn reconcile(
    defaults: LaundryState,
    local: Option<StoredState>,
    remote: Option<StoredState>,
) -> (LaundryState, RestoreSource) {
    let (winner, source) = match (local, remote) {
        (Some(local), _) => (local, RestoreSource::Local),
        (None, Some(remote)) => (remote, RestoreSource::Remote),
        (None, None) => return (defaults, RestoreSource::Defaults),
    };
    (repair(merge_over(defaults, winner)), source)
}

/// Shallow merge: each top-level field present in `stored` replaces the default.
pub fn merge_over(defaults: LaundryState, stored: StoredState) -> LaundryState {
    LaundryState {
        scans: stored.scans.unwrap_or(defaults.scans),
        bag_name: stored.bag_name.unwrap_or(defaults.bag_name),
        products: stored.products.unwrap_or(defaults.products),
        bag_history: stored.bag_history.unwrap_or(defaults.bag_history),
        brands: stored.brands.unwrap_or(defaults.brands),
        categories: stored.categories.unwrap_or(defaults.categories),
        category_options: stored.category_options.unwrap_or(defaults.category_options),
    }
}

/// Puts the default taxonomy back when the stored one is structurally empty,
/// drops scans that lost their tag and recounts bags stored without a count.
pub fn repair(mut state: LaundryState) -> LaundryState {
    state.scans.retain(|scan| !scan.rfid.is_empty());
    for bag in &mut state.bag_history {
        if bag.item_count == 0 {
            bag.item_count = bag.items.len();
        }
    }
    if state.categories.is_empty() {
        state.categories = default_categories();
    }
    if state.category_options.is_empty() {
        state.category_options = default_category_options();
    }
    state
}
