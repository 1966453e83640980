//! crates/laundry_core/src/registration.rs
//!
//! The product registration form and the coercion rules applied on save.

use chrono::NaiveDate;

use crate::domain::{ProductRecord, ProductStatus, DEFAULT_DESTINATION};

/// Raw values as typed into the registration form.
///
/// Prices are kept as text: a save never fails on a bad number, it stores 0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductForm {
    pub category: String,
    pub name: String,
    pub brand: String,
    pub acquisition_date: String,
    pub wash_price: String,
    pub item_price: String,
    pub destination: String,
}

impl ProductForm {
    /// Builds the record saved for `rfid`. Blank dates fall back to `today`
    /// and a blank destination to the house default.
    pub fn to_record(&self, rfid: &str, today: NaiveDate) -> ProductRecord {
        let acquisition_date = if self.acquisition_date.trim().is_empty() {
            today.format("%Y-%m-%d").to_string()
        } else {
            self.acquisition_date.trim().to_string()
        };
        let destination = if self.destination.trim().is_empty() {
            DEFAULT_DESTINATION.to_string()
        } else {
            self.destination.trim().to_string()
        };

        ProductRecord {
            rfid: rfid.to_string(),
            category: self.category.clone(),
            name: self.name.clone(),
            variant: String::new(),
            brand: self.brand.trim().to_string(),
            acquisition_date,
            wash_price: coerce_price(&self.wash_price),
            item_price: coerce_price(&self.item_price),
            destination,
            status: ProductStatus::Active,
        }
    }

    /// The form pre-filled from an existing record.
    pub fn from_record(record: &ProductRecord) -> Self {
        Self {
            category: record.category.clone(),
            name: record.name.clone(),
            brand: record.brand.clone(),
            acquisition_date: record.acquisition_date.clone(),
            wash_price: format_price(record.wash_price),
            item_price: format_price(record.item_price),
            destination: record.destination.clone(),
        }
    }
}

fn format_price(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

/// Reads a price the way a lenient form field does: the longest numeric
/// prefix wins (`"12abc"` is 12) and anything else, including negative or
/// non-finite values, becomes 0.
pub fn coerce_price(raw: &str) -> f64 {
    let text = raw.trim();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    let mut seen_exp = false;

    for (i, c) in text.char_indices() {
        let ok = match c {
            '0'..='9' => {
                seen_digit = true;
                true
            }
            '+' | '-' => i == 0 || text[..i].ends_with(['e', 'E']),
            '.' if !seen_dot && !seen_exp => {
                seen_dot = true;
                true
            }
            'e' | 'E' if seen_digit && !seen_exp => {
                seen_exp = true;
                true
            }
            _ => false,
        };
        if !ok {
            break;
        }
        end = i + c.len_utf8();
    }

    // Back off until the prefix parses ("1e" -> "1", "-" -> "").
    let mut prefix = &text[..end];
    while !prefix.is_empty() {
        if let Ok(value) = prefix.parse::<f64>() {
            return if value.is_finite() && value >= 0.0 { value } else { 0.0 };
        }
        prefix = &prefix[..prefix.len() - 1];
    }
    0.0
}
