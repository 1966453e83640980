//! services/station/src/adapters/cep.rs
//!
//! This module contains the adapter for the server's postal-code proxy
//! (`/api/common/cep/{cep}`). It implements the `AddressLookupService` port.

use async_trait::async_trait;
use laundry_core::domain::CepLookupResponse;
use laundry_core::ports::{AddressLookupService, PortError, PortResult};
use reqwest::Client;

/// An adapter that implements the `AddressLookupService` port over HTTP.
#[derive(Clone)]
pub struct CepApiAdapter {
    client: Client,
    base_url: String,
}

impl CepApiAdapter {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl AddressLookupService for CepApiAdapter {
    /// The proxy reports unknown codes in the body (`valid: false`), so the
    /// status code is not checked here.
    async fn lookup_cep(&self, cep: &str) -> PortResult<CepLookupResponse> {
        let url = format!("{}/api/common/cep/{}", self.base_url, cep);
        self.client
            .get(url)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .json::<CepLookupResponse>()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))
    }
}
