//! crates/laundry_core/src/domain.rs
//!
//! Defines the core data structures of the laundry counter.
//! The serde attributes pin the JSON shape shared by local storage and the
//! laundry-state API, so a snapshot written here reads back unchanged there.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

use crate::registration::coerce_price;

/// Number of characters in a well-formed RFID tag.
pub const TAG_LENGTH: usize = 24;

/// Leading character every well-formed tag starts with.
pub const TAG_PREFIX: char = 'E';

/// Bag label used when no label has been computed yet.
pub const FALLBACK_BAG_LABEL: &str = "Sem Sacola";

/// Destination assigned to a product when the form leaves it blank.
pub const DEFAULT_DESTINATION: &str = "Almareia";

/// Categories shipped with the station, in display order.
pub const DEFAULT_CATEGORIES: [&str; 16] = [
    "Lençol Solteiro",
    "Lençol Casal",
    "Lençol King",
    "Fronha",
    "Capa Edredom",
    "Toalha Banho",
    "Toalha Rosto",
    "Piso",
    "Toalha Piscina",
    "Roupão P",
    "Roupão M",
    "Roupão G",
    "Roupão GG",
    "Tapete",
    "Cortina",
    "Travesseiro",
];

//=========================================================================================
// Inventory Records
//=========================================================================================

/// One physical read of a tag into the active working list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRecord {
    #[serde(default)]
    pub rfid: String,
    /// The Unix epoch when a stored scan carries no time.
    #[serde(default)]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "bag", default)]
    pub bag_label: String,
}

/// Lifecycle state of a registered item. Only `Active` exists today.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductStatus {
    #[default]
    #[serde(rename = "ativo", alias = "active")]
    Active,
}

/// The durable registration describing the item a tag is sewn into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    /// Filled from the registry key when a stored record omits it.
    #[serde(default)]
    pub rfid: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub name: String,
    // Carried for compatibility with older snapshots; never filled in.
    #[serde(default)]
    pub variant: String,
    #[serde(default)]
    pub brand: String,
    #[serde(rename = "acqDate", default)]
    pub acquisition_date: String,
    #[serde(default, deserialize_with = "lenient_price")]
    pub wash_price: f64,
    #[serde(default, deserialize_with = "lenient_price")]
    pub item_price: f64,
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub status: ProductStatus,
}

/// A closed batch of scans. Never mutated once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BagArchiveEntry {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "date", default)]
    pub archived_at: DateTime<Utc>,
    /// Recounted from `items` on restore when missing.
    #[serde(rename = "count", default)]
    pub item_count: usize,
    #[serde(default)]
    pub items: Vec<ScanRecord>,
}

//=========================================================================================
// Taxonomy
//=========================================================================================

/// The category list shipped with the station.
pub fn default_categories() -> Vec<String> {
    DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect()
}

/// The default category → item-name mapping. Every default category offers
/// a single item carrying its own name.
pub fn default_category_options() -> BTreeMap<String, Vec<String>> {
    DEFAULT_CATEGORIES
        .iter()
        .map(|c| (c.to_string(), vec![c.to_string()]))
        .collect()
}

//=========================================================================================
// The Whole Counter State
//=========================================================================================

/// Everything the counter knows, as one owned value.
///
/// This is also the snapshot written to local storage and mirrored to the
/// remote API, which is why every field tolerates being absent on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaundryState {
    #[serde(default)]
    pub scans: Vec<ScanRecord>,
    #[serde(default)]
    pub bag_name: String,
    #[serde(default)]
    pub products: BTreeMap<String, ProductRecord>,
    #[serde(default)]
    pub bag_history: Vec<BagArchiveEntry>,
    #[serde(default)]
    pub brands: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub category_options: BTreeMap<String, Vec<String>>,
}

impl Default for LaundryState {
    fn default() -> Self {
        Self {
            scans: Vec::new(),
            bag_name: String::new(),
            products: BTreeMap::new(),
            bag_history: Vec::new(),
            brands: Vec::new(),
            categories: default_categories(),
            category_options: default_category_options(),
        }
    }
}

impl LaundryState {
    /// The label new scans are tagged with.
    pub fn active_bag_label(&self) -> &str {
        if self.bag_name.is_empty() {
            FALLBACK_BAG_LABEL
        } else {
            &self.bag_name
        }
    }

    /// Whether `rfid` is already in the active (unarchived) list.
    pub fn has_active_scan(&self, rfid: &str) -> bool {
        self.scans.iter().any(|s| s.rfid == rfid)
    }
}

/// A snapshot as read back from storage: every top-level field is optional,
/// so that "present" can be told apart from "absent" during reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredState {
    #[serde(default, deserialize_with = "lenient_entries")]
    pub scans: Option<Vec<ScanRecord>>,
    pub bag_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_registry")]
    pub products: Option<BTreeMap<String, ProductRecord>>,
    #[serde(default, deserialize_with = "lenient_entries")]
    pub bag_history: Option<Vec<BagArchiveEntry>>,
    pub brands: Option<Vec<String>>,
    pub categories: Option<Vec<String>>,
    pub category_options: Option<BTreeMap<String, Vec<String>>>,
}

//=========================================================================================
// Lenient Decoding
//=========================================================================================

// A stored snapshot is read entry by entry: one unreadable record is dropped
// with a warning instead of failing the whole restore.

fn lenient_entries<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw: Option<Vec<serde_json::Value>> = Option::deserialize(deserializer)?;
    Ok(raw.map(|entries| entries.into_iter().filter_map(decode_entry).collect()))
}

fn lenient_registry<'de, D>(
    deserializer: D,
) -> Result<Option<BTreeMap<String, ProductRecord>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, serde_json::Value>> = Option::deserialize(deserializer)?;
    Ok(raw.map(|entries| {
        entries
            .into_iter()
            .filter_map(|(rfid, value)| {
                let mut record: ProductRecord = decode_entry(value)?;
                if record.rfid.is_empty() {
                    record.rfid = rfid.clone();
                }
                Some((rfid, record))
            })
            .collect()
    }))
}

fn decode_entry<T: DeserializeOwned>(value: serde_json::Value) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(entry) => Some(entry),
        Err(e) => {
            warn!("Dropping unreadable stored entry: {}", e);
            None
        }
    }
}

/// A stored number, or text as an older form may have saved it.
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

fn lenient_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<NumberOrText>::deserialize(deserializer)? {
        Some(NumberOrText::Number(n)) if n.is_finite() && n >= 0.0 => n,
        Some(NumberOrText::Text(text)) => coerce_price(&text),
        _ => 0.0,
    })
}

/// Identifiers the guest API may send either quoted or as bare numbers.
fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(text)) => Some(text),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

//=========================================================================================
// Collaborator Payloads
//=========================================================================================

/// Response of the postal-code (CEP) lookup endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CepLookupResponse {
    #[serde(default)]
    pub valid: bool,
    pub data: Option<PostalAddress>,
    pub message: Option<String>,
}

/// The address fields a CEP resolves to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostalAddress {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub neighborhood: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
}

/// Response envelope of the guest-detail endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GuestDetailsResponse {
    #[serde(default)]
    pub success: bool,
    pub error: Option<String>,
    pub data: Option<GuestDetailsData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GuestDetailsData {
    #[serde(default)]
    pub guest: GuestProfile,
    #[serde(default)]
    pub history: Vec<StayHistoryEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GuestProfile {
    #[serde(default, deserialize_with = "text_or_number")]
    pub ficha_number: Option<String>,
    #[serde(default)]
    pub personal_info: PersonalInfo,
    pub stay_info: Option<StayInfo>,
    pub financials: Option<Financials>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonalInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub doc_id: Option<String>,
    pub birth_date: Option<String>,
    pub contact: Option<ContactInfo>,
    pub address: Option<GuestAddress>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactInfo {
    pub email: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GuestAddress {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StayInfo {
    pub checkin_date: Option<String>,
    pub checkout_date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Financials {
    pub amount_due: Option<f64>,
    pub paid_amount: Option<f64>,
    pub balance: Option<f64>,
}

/// One past stay of the guest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StayHistoryEntry {
    pub checkin: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub room: Option<String>,
    pub total: Option<f64>,
    pub status: Option<String>,
}
