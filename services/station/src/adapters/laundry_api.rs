//! services/station/src/adapters/laundry_api.rs
//!
//! This module contains the adapter for the server-side copy of the counter
//! state (`/api/laundry/data`). It implements the `RemoteStateService` port.

use async_trait::async_trait;
use laundry_core::domain::{LaundryState, StoredState};
use laundry_core::ports::{PortError, PortResult, RemoteStateService};
use reqwest::Client;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `RemoteStateService` port over HTTP.
#[derive(Clone)]
pub struct LaundryApiAdapter {
    client: Client,
    endpoint: String,
}

impl LaundryApiAdapter {
    /// Creates a new `LaundryApiAdapter` for the server at `base_url`.
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}/api/laundry/data", base_url.trim_end_matches('/')),
        }
    }
}

//=========================================================================================
// `RemoteStateService` Trait Implementation
//=========================================================================================

#[async_trait]
impl RemoteStateService for LaundryApiAdapter {
    /// The server answers `null` when it has never received a snapshot.
    async fn fetch_snapshot(&self) -> PortResult<Option<StoredState>> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .error_for_status()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        response
            .json::<Option<StoredState>>()
            .await
            .map_err(|e| PortError::Corrupt(e.to_string()))
    }

    async fn push_snapshot(&self, state: &LaundryState) -> PortResult<()> {
        self.client
            .post(&self.endpoint)
            .json(state)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .error_for_status()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }
}
