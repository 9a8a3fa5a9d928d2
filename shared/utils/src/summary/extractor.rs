//! Structure Extractor
//!
//! Normalizes a raw RCSB core-entry payload into a [`StructureSummary`].
//!
//! The upstream schema is loose: nearly every field is optional and may be
//! missing, `null` or of an unexpected type. Only a payload that is not a JSON
//! object at all is rejected. Every other irregularity falls back to a fixed
//! default so that schema drift in optional fields never fails a lookup.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

use pdbctx_models::{
    ChainSummary, LigandSummary, Provenance, StructureSummary, NOT_AVAILABLE, RCSB_SOURCE_LABEL,
};

use super::lookup::{array_at, f64_at, first_at, i64_at, scalar_text_at, str_at, truncate_chars};
use crate::error::{PdbContextError, PdbContextResult};

const MAX_CHAIN_ID_CHARS: usize = 2;
const MAX_CHEM_ID_CHARS: usize = 3;

/// Builds structure summaries from raw upstream entries. Stateless and safe
/// to share between threads.
#[derive(Debug, Clone)]
pub struct StructureExtractor {
    /// Label recorded as the provenance source
    source_label: String,
}

impl Default for StructureExtractor {
    fn default() -> Self {
        Self {
            source_label: RCSB_SOURCE_LABEL.to_string(),
        }
    }
}

impl StructureExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the provenance source label
    pub fn with_source_label(mut self, label: impl Into<String>) -> Self {
        self.source_label = label.into();
        self
    }

    /// Normalize one raw entry payload.
    ///
    /// `source_id`, `retrieved_at` and `source_url` are recorded verbatim;
    /// the extractor never reads the clock itself.
    pub fn normalize(
        &self,
        raw: &Value,
        source_id: &str,
        retrieved_at: DateTime<Utc>,
        source_url: &str,
    ) -> PdbContextResult<StructureSummary> {
        if !raw.is_object() {
            return Err(PdbContextError::malformed_upstream_data(format!(
                "entry payload for '{}' is {}, expected a JSON object",
                source_id,
                json_kind(raw)
            )));
        }

        let title = str_at(raw, &["struct", "title"]).unwrap_or(NOT_AVAILABLE);
        let method = first_at(raw, &["exptl"])
            .and_then(|exptl| str_at(exptl, &["method"]))
            .unwrap_or(NOT_AVAILABLE);
        let resolution = self.extract_resolution(raw);
        let chains = self.extract_chains(raw);
        let ligands = self.extract_ligands(raw);

        debug!(
            pdb_id = %source_id,
            chains = chains.len(),
            ligands = ligands.len(),
            "Normalized entry"
        );

        Ok(StructureSummary::new(
            source_id,
            title,
            method,
            resolution,
            chains,
            ligands,
            Provenance::new(self.source_label.clone(), retrieved_at, source_url),
        ))
    }

    /// First refinement's high-resolution limit. Unparseable, non-finite or
    /// non-positive values are treated as unreported.
    fn extract_resolution(&self, raw: &Value) -> Option<f64> {
        let refine = first_at(raw, &["refine"])?;
        match f64_at(refine, &["ls_d_res_high"]) {
            Some(value) if value.is_finite() && value > 0.0 => Some(value),
            _ => None,
        }
    }

    fn extract_chains(&self, raw: &Value) -> Vec<ChainSummary> {
        let mut chains = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for entity in array_at(raw, &["polymer_entities"]) {
            let organism = first_at(entity, &["rcsb_entity_source_organism"])
                .and_then(|source| str_at(source, &["ncbi_scientific_name"]))
                .map(str::to_string);
            let sequence_length = self.sequence_length(entity);

            for chain_id in self.entity_chain_ids(entity) {
                // First entity to claim an identifier wins
                if !seen.insert(chain_id.clone()) {
                    continue;
                }
                chains.push(ChainSummary::new(
                    truncate_chars(&chain_id, MAX_CHAIN_ID_CHARS),
                    sequence_length,
                    organism.clone(),
                ));
            }
        }

        chains
    }

    /// Sample sequence length, falling back to the canonical one-letter
    /// sequence when the reported length is zero or missing. Never below 1.
    fn sequence_length(&self, entity: &Value) -> u32 {
        let reported = i64_at(entity, &["entity_poly", "rcsb_sample_sequence_length"]).unwrap_or(0);

        let length = if reported == 0 {
            match str_at(entity, &["entity_poly", "pdbx_seq_one_letter_code_can"]) {
                Some(sequence) => sequence.chars().count() as i64,
                None => 0,
            }
        } else {
            reported
        };

        length.clamp(1, i64::from(u32::MAX)) as u32
    }

    /// Union of the comma-separated strand ids and the author asym ids,
    /// trimmed, deduplicated and sorted.
    fn entity_chain_ids(&self, entity: &Value) -> BTreeSet<String> {
        let mut ids = BTreeSet::new();

        if let Some(strands) = str_at(entity, &["entity_poly", "pdbx_strand_id"]) {
            ids.extend(
                strands
                    .split(',')
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(str::to_string),
            );
        }

        let auth_asym_ids = array_at(
            entity,
            &["rcsb_polymer_entity_container_identifiers", "auth_asym_ids"],
        );
        ids.extend(
            auth_asym_ids
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string),
        );

        ids
    }

    fn extract_ligands(&self, raw: &Value) -> Vec<LigandSummary> {
        let mut ligands = Vec::new();

        for (index, entity) in array_at(raw, &["nonpolymer_entities"]).iter().enumerate() {
            let chem_id = match scalar_text_at(entity, &["nonpolymer_comp", "chem_comp", "id"]) {
                Some(id) if !id.trim().is_empty() => id.trim().to_string(),
                _ => {
                    debug!(
                        entity_index = index,
                        "Skipping non-polymer entity without a component id"
                    );
                    continue;
                }
            };

            let name = match str_at(entity, &["nonpolymer_comp", "chem_comp", "name"]) {
                Some(name) if !name.is_empty() => name,
                _ => match str_at(entity, &["pdbx_entity_nonpoly", "name"]) {
                    Some(name) => name,
                    None => NOT_AVAILABLE,
                },
            };

            let instance_count = i64_at(
                entity,
                &["rcsb_nonpolymer_entity_container_identifiers", "instance_count"],
            )
            .unwrap_or(1)
            .clamp(1, i64::from(u32::MAX)) as u32;

            ligands.push(LigandSummary::new(
                truncate_chars(&chem_id, MAX_CHEM_ID_CHARS),
                name,
                instance_count,
            ));
        }

        ligands
    }
}

/// Normalize with the default RCSB source label.
pub fn normalize_entry(
    raw: &Value,
    source_id: &str,
    retrieved_at: DateTime<Utc>,
    source_url: &str,
) -> PdbContextResult<StructureSummary> {
    StructureExtractor::default().normalize(raw, source_id, retrieved_at, source_url)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
