//! Structure Service
//!
//! Read-through lookup of structure summaries: cache first, then the
//! upstream entry API plus normalization. Only successful lookups are
//! cached; a failure leaves any existing entry untouched.

use chrono::Utc;
use pdbctx_models::StructureSummary;
use pdbctx_utils::{
    normalize_pdb_id, validate_model, validate_pdb_id, CacheStats, LruTtlCache, PdbContextError,
    PdbContextResult, StructureExtractor,
};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::pdb_client::EntryFetcher;

pub type StructureCache = LruTtlCache<Arc<StructureSummary>>;

/// Structure context service
#[derive(Clone)]
pub struct StructureService {
    cache: Arc<StructureCache>,
    fetcher: Arc<dyn EntryFetcher>,
    extractor: StructureExtractor,
}

impl StructureService {
    pub fn new(cache: Arc<StructureCache>, fetcher: Arc<dyn EntryFetcher>) -> Self {
        Self {
            cache,
            fetcher,
            extractor: StructureExtractor::new(),
        }
    }

    /// Summary for `pdb_id`, served from cache when a live entry exists.
    pub async fn build_structure_context(
        &self,
        pdb_id: &str,
    ) -> PdbContextResult<Arc<StructureSummary>> {
        let pdb_id = normalize_pdb_id(pdb_id);
        validate_pdb_id(&pdb_id)?;

        if let Some(cached) = self.cache.get(&pdb_id) {
            info!(pdb_id = %pdb_id, "Cache hit");
            return Ok(cached);
        }

        info!(pdb_id = %pdb_id, "Cache miss, fetching from PDB API");

        let raw = match self.fetcher.fetch_raw_entry(&pdb_id).await {
            Ok(raw) => raw,
            Err(e @ PdbContextError::NotFound { .. }) => {
                warn!(pdb_id = %pdb_id, "PDB entry not found");
                return Err(e);
            }
            Err(e) => {
                error!(
                    pdb_id = %pdb_id,
                    upstream = e.is_upstream_failure(),
                    error = %e,
                    "Error fetching PDB entry"
                );
                return Err(e);
            }
        };

        let summary = self
            .extractor
            .normalize(&raw, &pdb_id, Utc::now(), &self.fetcher.entry_url(&pdb_id))
            .map_err(|e| {
                error!(pdb_id = %pdb_id, error = %e, "Failed to normalize PDB entry");
                e
            })?;

        // Only summaries that satisfy every model constraint are shared
        validate_model(&summary).map_err(|e| {
            error!(pdb_id = %pdb_id, error = %e, "Normalized summary failed validation");
            PdbContextError::internal(format!(
                "summary for PDB entry '{}' is invalid: {}",
                pdb_id, e
            ))
        })?;
        let summary = Arc::new(summary);

        self.cache.set(pdb_id.clone(), Arc::clone(&summary));
        info!(
            pdb_id = %pdb_id,
            chains = summary.chains().len(),
            ligands = summary.ligands().len(),
            ligand_instances = summary.total_ligand_instances(),
            "Stored structure summary in cache"
        );

        Ok(summary)
    }

    /// Drop the cached entry for `pdb_id`, if any.
    pub fn invalidate(&self, pdb_id: &str) -> PdbContextResult<()> {
        let pdb_id = normalize_pdb_id(pdb_id);
        validate_pdb_id(&pdb_id)?;

        self.cache.delete(&pdb_id);
        info!(pdb_id = %pdb_id, "Invalidated cache entry");
        Ok(())
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
        info!("Cleared structure cache");
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
