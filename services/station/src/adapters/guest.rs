//! services/station/src/adapters/guest.rs
//!
//! This module contains the adapter for the reception guest-detail endpoint
//! (`/api/guest/details/{id}`). It implements the `GuestDetailsService` port.

use async_trait::async_trait;
use laundry_core::domain::GuestDetailsResponse;
use laundry_core::ports::{GuestDetailsService, PortError, PortResult};
use reqwest::Client;

/// An adapter that implements the `GuestDetailsService` port over HTTP.
#[derive(Clone)]
pub struct GuestApiAdapter {
    client: Client,
    base_url: String,
}

impl GuestApiAdapter {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl GuestDetailsService for GuestApiAdapter {
    async fn guest_details(&self, guest_id: &str) -> PortResult<GuestDetailsResponse> {
        let url = format!("{}/api/guest/details/{}", self.base_url, guest_id);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PortError::NotFound(format!(
                "Guest {} answered {}",
                guest_id,
                response.status()
            )));
        }

        response
            .json::<GuestDetailsResponse>()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))
    }
}
