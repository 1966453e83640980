//! crates/laundry_core/src/scan_input.rs
//!
//! Turns raw scanner/keyboard text into tag identifiers.
//!
//! Handheld readers come in two flavours: ones that finish each tag with an
//! Enter keystroke, and streaming ones that emit tag after tag with no
//! terminator at all. Both end up here.

use crate::domain::{TAG_LENGTH, TAG_PREFIX};

/// What caused an input to be submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanTrigger {
    /// The operator (or the reader) pressed Enter.
    Confirm,
    /// The text grew while typing; no confirmation keystroke.
    Stream,
}

/// Trims and uppercases raw input.
pub fn normalize(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// A well-formed tag is exactly 24 characters long and starts with `E`.
pub fn is_well_formed_tag(normalized: &str) -> bool {
    normalized.chars().count() == TAG_LENGTH && normalized.starts_with(TAG_PREFIX)
}

/// The acceptance filter in front of `add_scan`.
///
/// A confirmed entry is accepted as long as it is not blank, which leaves room
/// for manual entry of odd tags. Streamed text is only accepted once it forms
/// a complete tag.
pub fn accept(raw: &str, trigger: ScanTrigger) -> Option<String> {
    let normalized = normalize(raw);
    let accepted = match trigger {
        ScanTrigger::Confirm => !normalized.is_empty(),
        ScanTrigger::Stream => is_well_formed_tag(&normalized),
    };
    accepted.then_some(normalized)
}

//=========================================================================================
// Streaming Buffer
//=========================================================================================

/// Accumulates characters from a reader and yields entries as they complete.
#[derive(Debug, Default)]
pub struct ScanBuffer {
    pending: String,
}

impl ScanBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one character. Returns a tag when the buffer just became one.
    pub fn push(&mut self, c: char) -> Option<String> {
        if c == '\n' || c == '\r' {
            return self.flush();
        }
        self.pending.push(c);
        let tag = accept(&self.pending, ScanTrigger::Stream)?;
        self.pending.clear();
        Some(tag)
    }

    /// Feeds a chunk of text, returning every entry it completed in order.
    pub fn push_str(&mut self, chunk: &str) -> Vec<String> {
        chunk.chars().filter_map(|c| self.push(c)).collect()
    }

    /// Submits whatever is buffered as a confirmed entry.
    pub fn flush(&mut self) -> Option<String> {
        let entry = accept(&self.pending, ScanTrigger::Confirm);
        self.pending.clear();
        entry
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

//=========================================================================================
// Group Registration List
//=========================================================================================

/// Tags collected for a bulk registration, newest first, without repeats.
#[derive(Debug, Clone, Default)]
pub struct GroupScanList {
    tags: Vec<String>,
}

impl GroupScanList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tag. Only well-formed tags are taken, whatever the trigger,
    /// and a tag already in the list is rejected.
    pub fn push(&mut self, raw: &str) -> bool {
        let tag = normalize(raw);
        if !is_well_formed_tag(&tag) || self.tags.contains(&tag) {
            return false;
        }
        self.tags.insert(0, tag);
        true
    }

    pub fn remove(&mut self, rfid: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != rfid);
        self.tags.len() != before
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TAG_A: &str = "E28011700000020A1B2C3D4E";
    const TAG_B: &str = "E28011700000020A1B2C3D4F";

    #[test]
    fn normalize_trims_and_uppercases() {
        assert_eq!(normalize("  e280abc \t"), "E280ABC");
    }

    #[test]
    fn confirm_accepts_any_non_blank_entry() {
        assert_eq!(accept(" abc ", ScanTrigger::Confirm), Some("ABC".into()));
        assert_eq!(accept("   ", ScanTrigger::Confirm), None);
    }

    #[test]
    fn stream_waits_for_a_complete_tag() {
        assert_eq!(accept(&TAG_A[..23], ScanTrigger::Stream), None);
        assert_eq!(
            accept(&TAG_A.to_lowercase(), ScanTrigger::Stream),
            Some(TAG_A.to_string())
        );
        let wrong_prefix = format!("F{}", &TAG_A[1..]);
        assert_eq!(accept(&wrong_prefix, ScanTrigger::Stream), None);
    }

    #[test]
    fn buffer_splits_back_to_back_tags() {
        let mut buffer = ScanBuffer::new();
        let tags = buffer.push_str(&format!("{TAG_A}{TAG_B}"));
        assert_eq!(tags, vec![TAG_A.to_string(), TAG_B.to_string()]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn buffer_flushes_partial_entry_on_newline() {
        let mut buffer = ScanBuffer::new();
        let entries = buffer.push_str("abc123\n");
        assert_eq!(entries, vec!["ABC123".to_string()]);
        assert!(buffer.push_str("\n").is_empty());
    }

    #[test]
    fn group_list_rejects_repeats_and_malformed_tags() {
        let mut group = GroupScanList::new();
        assert!(group.push(TAG_A));
        assert!(!group.push(&TAG_A.to_lowercase()));
        assert!(!group.push("E123"));
        assert!(group.push(TAG_B));
        assert_eq!(group.tags(), &[TAG_B.to_string(), TAG_A.to_string()]);
    }

    #[test]
    fn group_list_removes_entries() {
        let mut group = GroupScanList::new();
        group.push(TAG_A);
        assert!(group.remove(TAG_A));
        assert!(!group.remove(TAG_A));
        assert!(group.is_empty());
    }
}
