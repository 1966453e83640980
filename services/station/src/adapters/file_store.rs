//! services/station/src/adapters/file_store.rs
//!
//! The local durable copy of the counter state: a single JSON file, the
//! station's equivalent of the browser's `laundry-counter` storage entry.
//! Writes are atomic via a temp-rename so a crash never leaves half a file.

use laundry_core::domain::{LaundryState, StoredState};
use laundry_core::ports::{LocalStateStore, PortError, PortResult};
use std::io;
use std::path::{Path, PathBuf};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A file adapter that implements the `LocalStateStore` port.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a new `JsonFileStore`. The file need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

//=========================================================================================
// `LocalStateStore` Trait Implementation
//=========================================================================================

impl LocalStateStore for JsonFileStore {
    /// A missing or blank file means "nothing stored". Unparseable content
    /// is reported as `Corrupt` rather than silently discarded.
    fn load(&self) -> PortResult<Option<StoredState>> {
        let bytes = match std::fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(PortError::Unexpected(e.to_string())),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        // `null` is what an emptied entry looks like.
        serde_json::from_slice::<Option<StoredState>>(&bytes).map_err(|e| {
            PortError::Corrupt(format!("{}: {}", self.path.display(), e))
        })
    }

    fn save(&self, state: &LaundryState) -> PortResult<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| PortError::Unexpected(e.to_string()))?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        let json = serde_json::to_vec_pretty(state)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        std::fs::write(&tmp_path, &json).map_err(|e| PortError::Unexpected(e.to_string()))?;
        std::fs::rename(&tmp_path, &self.path).map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }
}
