//! crates/laundry_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the counter's core logic.
//! These traits form the boundary of the hexagonal architecture, keeping the
//! inventory store independent of files, HTTP clients, clocks and terminals.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::{CepLookupResponse, GuestDetailsResponse, LaundryState, StoredState};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., filesystem, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Stored data is corrupt: {0}")]
    Corrupt(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Persistence Ports
//=========================================================================================

/// Durable storage scoped to this station. Reads and writes are synchronous.
pub trait LocalStateStore: Send + Sync {
    /// Returns `Ok(None)` when nothing has been stored yet.
    fn load(&self) -> PortResult<Option<StoredState>>;

    fn save(&self, state: &LaundryState) -> PortResult<()>;
}

/// The server-side copy of the counter state.
#[async_trait]
pub trait RemoteStateService: Send + Sync {
    /// Fetches the server snapshot; `Ok(None)` when the server holds none.
    async fn fetch_snapshot(&self) -> PortResult<Option<StoredState>>;

    async fn push_snapshot(&self, state: &LaundryState) -> PortResult<()>;
}

/// Accepts snapshots for best-effort delivery to the remote copy.
///
/// `enqueue` must return without waiting on the network.
pub trait MirrorOutbox: Send + Sync {
    /// Queues a mirror job and returns its id.
    fn enqueue(&self, state: LaundryState) -> Uuid;
}

//=========================================================================================
// Interaction Ports
//=========================================================================================

/// Asks the operator a yes/no question before a destructive mutation.
pub trait ConfirmationService {
    fn confirm(&mut self, prompt: &str) -> bool;
}

/// Source of "now", so bag names and timestamps are testable.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// The calendar day at the station, used for bag names.
    fn today(&self) -> NaiveDate;
}

//=========================================================================================
// Consumed Collaborators
//=========================================================================================

#[async_trait]
pub trait AddressLookupService: Send + Sync {
    /// Looks up an 8-digit postal code.
    async fn lookup_cep(&self, cep: &str) -> PortResult<CepLookupResponse>;
}

#[async_trait]
pub trait GuestDetailsService: Send + Sync {
    /// Fetches the detail payload for a guest. A non-2xx answer is `NotFound`.
    async fn guest_details(&self, guest_id: &str) -> PortResult<GuestDetailsResponse>;
}
