//! RCSB PDB API Client
//!
//! Client for the RCSB Data API core-entry endpoint. Returns the raw entry
//! JSON; normalization happens in the structure service.

use async_trait::async_trait;
use pdbctx_utils::{PdbApiConfig, PdbContextError, PdbContextResult};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Source of raw upstream entries, keyed by PDB identifier.
#[async_trait]
pub trait EntryFetcher: Send + Sync {
    /// URL the entry is (or would be) fetched from, recorded in provenance.
    fn entry_url(&self, pdb_id: &str) -> String;

    /// Fetch the raw entry. Fails with `NotFound`, `UpstreamApi` or `Network`.
    async fn fetch_raw_entry(&self, pdb_id: &str) -> PdbContextResult<Value>;
}

/// RCSB Data API client
pub struct PdbClient {
    client: Client,
    base_url: String,
}

impl PdbClient {
    pub fn new(config: &PdbApiConfig) -> PdbContextResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("pdbctx/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                PdbContextError::configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl EntryFetcher for PdbClient {
    fn entry_url(&self, pdb_id: &str) -> String {
        format!("{}/rest/v1/core/entry/{}", self.base_url, pdb_id)
    }

    async fn fetch_raw_entry(&self, pdb_id: &str) -> PdbContextResult<Value> {
        let url = self.entry_url(pdb_id);
        debug!(pdb_id = %pdb_id, url = %url, "Requesting PDB entry");

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                PdbContextError::network(format!(
                    "Network error while requesting PDB entry '{}' from {}: {}",
                    pdb_id, url, e
                ))
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(PdbContextError::not_found(pdb_id));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PdbContextError::upstream_api(
                status.as_u16(),
                format!(
                    "PDB API request failed with status {} for entry '{}' at {}. Response: {}",
                    status.as_u16(),
                    pdb_id,
                    url,
                    body
                ),
            ));
        }

        let data: Value = response.json().await?;
        Ok(data)
    }
}
