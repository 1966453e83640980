//! crates/laundry_core/src/projections.rs
//!
//! Read-only views over the counter state. Nothing here mutates; the
//! rendering layer binds to these types instead of reaching into the state.

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

use crate::domain::{LaundryState, ProductRecord};

/// How many of the most recent scans the row view shows.
pub const ROW_WINDOW: usize = 50;

/// Counters shown above the scan table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveSummary {
    pub total: usize,
    pub unique: usize,
    /// `total - unique`. Zero while `add_scan` rejects repeats; kept so an
    /// older snapshot holding repeats still reports them.
    pub duplicates: usize,
}

pub fn active_summary(state: &LaundryState) -> ActiveSummary {
    let total = state.scans.len();
    let unique = state
        .scans
        .iter()
        .map(|s| s.rfid.as_str())
        .collect::<BTreeSet<_>>()
        .len();
    ActiveSummary {
        total,
        unique,
        duplicates: total - unique,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationStatus {
    /// The tag has no product record yet.
    Pending,
    Registered,
}

/// One line of the scan table.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanRow<'a> {
    /// Counts down from the total, so the newest row carries the highest number.
    pub position: usize,
    pub rfid: &'a str,
    pub bag_label: &'a str,
    pub scanned_at: DateTime<Utc>,
    pub product: Option<&'a ProductRecord>,
    pub status: RegistrationStatus,
}

/// The newest [`ROW_WINDOW`] scans joined with their registrations.
pub fn scan_rows(state: &LaundryState) -> Vec<ScanRow<'_>> {
    let total = state.scans.len();
    state
        .scans
        .iter()
        .take(ROW_WINDOW)
        .enumerate()
        .map(|(i, scan)| {
            let product = state.products.get(&scan.rfid);
            ScanRow {
                position: total - i,
                rfid: &scan.rfid,
                bag_label: &scan.bag_label,
                scanned_at: scan.timestamp,
                product,
                status: if product.is_some() {
                    RegistrationStatus::Registered
                } else {
                    RegistrationStatus::Pending
                },
            }
        })
        .collect()
}

/// Every registered product, ordered by name then category.
pub fn catalog(state: &LaundryState) -> Vec<&ProductRecord> {
    let mut products: Vec<&ProductRecord> = state.products.values().collect();
    products.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.category.cmp(&b.category)));
    products
}

/// Brands offered while typing: the brand list plus every brand already on
/// a product, sorted and without repeats.
pub fn brand_suggestions(state: &LaundryState) -> Vec<String> {
    state
        .brands
        .iter()
        .map(String::as_str)
        .chain(state.products.values().map(|p| p.brand.as_str()))
        .filter(|b| !b.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// The label the next closed bag will carry. Always derived, never edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BagLabel {
    pub name: String,
    pub editable: bool,
}

pub fn bag_label(state: &LaundryState) -> BagLabel {
    BagLabel {
        name: state.active_bag_label().to_string(),
        editable: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ScanRecord;
    use crate::store::test_support::*;
    use chrono::TimeZone;

    #[test]
    fn summary_counts_distinct_tags() {
        let mut f = fixture();
        f.store.add_scan(TAG_A);
        f.store.add_scan(TAG_A);
        f.store.add_scan(TAG_B);
        assert_eq!(
            active_summary(f.store.state()),
            ActiveSummary {
                total: 2,
                unique: 2,
                duplicates: 0
            }
        );
    }

    #[test]
    fn summary_reports_repeats_from_old_snapshots() {
        let mut state = LaundryState::default();
        let scan = ScanRecord {
            rfid: TAG_A.into(),
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap(),
            bag_label: "x".into(),
        };
        state.scans = vec![scan.clone(), scan];
        assert_eq!(active_summary(&state).duplicates, 1);
    }

    #[test]
    fn rows_flag_pending_registrations() {
        let mut f = fixture();
        f.store.add_scan(TAG_A);
        f.store.add_scan(TAG_B);
        f.store.register_product(TAG_B, &form("Fronha", "Teka"));

        let rows = scan_rows(f.store.state());

        assert_eq!(rows[0].rfid, TAG_B);
        assert_eq!(rows[0].position, 2);
        assert_eq!(rows[0].status, RegistrationStatus::Registered);
        assert_eq!(rows[0].product.map(|p| p.brand.as_str()), Some("Teka"));
        assert_eq!(rows[1].status, RegistrationStatus::Pending);
        assert!(rows[1].product.is_none());
    }

    #[test]
    fn rows_are_capped_to_the_window() {
        let mut f = fixture();
        for i in 0..60 {
            f.store.add_scan(&format!("E{:023}", i));
        }
        let rows = scan_rows(f.store.state());
        assert_eq!(rows.len(), ROW_WINDOW);
        assert_eq!(rows[0].position, 60);
        assert_eq!(rows[49].position, 11);
    }

    #[test]
    fn catalog_sorts_by_name_then_category() {
        let mut f = fixture();
        let mut towel = form("Toalha Banho", "");
        towel.name = "Branca".into();
        let mut rug = form("Piso", "");
        rug.name = "Branca".into();
        f.store.register_product(TAG_A, &towel);
        f.store.register_product(TAG_B, &rug);
        f.store.register_product(TAG_C, &form("Fronha", ""));

        let names: Vec<(&str, &str)> = catalog(f.store.state())
            .iter()
            .map(|p| (p.name.as_str(), p.category.as_str()))
            .collect();

        assert_eq!(
            names,
            vec![("Branca", "Piso"), ("Branca", "Toalha Banho"), ("Fronha", "Fronha")]
        );
    }

    #[test]
    fn brand_suggestions_merge_list_and_products() {
        let mut f = fixture();
        f.store.add_brand("Teka");
        let mut state = f.store.state().clone();
        let mut record = form("Piso", "").to_record(TAG_A, FixedClock::may_first().0.date_naive());
        record.brand = "Karsten".into();
        state.products.insert(TAG_A.into(), record);

        assert_eq!(brand_suggestions(&state), vec!["Karsten", "Teka"]);
    }

    #[test]
    fn bag_label_is_locked() {
        let f = fixture();
        let label = bag_label(f.store.state());
        assert_eq!(label.name, "01-05-24 01");
        assert!(!label.editable);
    }
}
