//! crates/laundry_core/src/bag.rs
//!
//! Sequential bag naming: `DD-MM-YY NN`, numbered per calendar day.

use chrono::NaiveDate;

use crate::domain::BagArchiveEntry;

/// The `DD-MM-YY` prefix shared by every bag closed on `day`.
pub fn day_prefix(day: NaiveDate) -> String {
    day.format("%d-%m-%y").to_string()
}

/// Computes the name the next bag of `day` will carry.
///
/// The sequence is one past the highest number already used under that day's
/// prefix anywhere in `history`, so gaps left by older bags are never reused.
pub fn next_bag_name(day: NaiveDate, history: &[BagArchiveEntry]) -> String {
    let prefix = day_prefix(day);
    let max_seq = history
        .iter()
        .filter(|bag| bag.name.starts_with(&prefix))
        .filter_map(|bag| sequence_of(&bag.name))
        .max()
        .unwrap_or(0);

    format!("{} {:02}", prefix, max_seq + 1)
}

/// Reads the sequence number after the first space, accepting a trailing
/// non-digit suffix the way a lenient integer parse would.
fn sequence_of(name: &str) -> Option<u32> {
    let seq = name.split(' ').nth(1)?;
    let digits: String = seq.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn bag(name: &str) -> BagArchiveEntry {
        BagArchiveEntry {
            name: name.to_string(),
            archived_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            item_count: 0,
            items: vec![],
        }
    }

    fn may_first() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[test]
    fn first_bag_of_the_day_is_01() {
        assert_eq!(next_bag_name(may_first(), &[]), "01-05-24 01");
    }

    #[test]
    fn continues_after_highest_sequence_of_the_day() {
        let history = vec![bag("01-05-24 01"), bag("01-05-24 02")];
        assert_eq!(next_bag_name(may_first(), &history), "01-05-24 03");
    }

    #[test]
    fn ignores_other_days_and_skips_gaps() {
        let history = vec![bag("30-04-24 07"), bag("01-05-24 05"), bag("01-05-24 02")];
        assert_eq!(next_bag_name(may_first(), &history), "01-05-24 06");
    }

    #[test]
    fn tolerates_malformed_names() {
        let history = vec![bag("01-05-24"), bag("01-05-24 xx"), bag("01-05-24 04b")];
        assert_eq!(next_bag_name(may_first(), &history), "01-05-24 05");
    }

    #[test]
    fn sequence_grows_past_two_digits() {
        let history = vec![bag("01-05-24 99")];
        assert_eq!(next_bag_name(may_first(), &history), "01-05-24 100");
    }
}
