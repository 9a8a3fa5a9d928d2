//! Structure summary domain models.
//!
//! This module defines the compact, fixed-shape summary of one PDB entry that
//! the service returns and caches: polymer chains, bound ligands and the
//! provenance of the upstream record.
//!
//! Every type here is immutable once built. Fields are private and only
//! exposed through accessors, so a summary shared out of the cache can never
//! be altered by the caller holding it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Label recorded in [`Provenance::source`] for records fetched from RCSB.
pub const RCSB_SOURCE_LABEL: &str = "RCSB PDB";

/// Placeholder used for textual fields the upstream record leaves out.
pub const NOT_AVAILABLE: &str = "N/A";

/// One distinct polymer chain identifier found in an entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ChainSummary {
    #[validate(length(min = 1, max = 2, message = "Chain identifier must be 1-2 characters"))]
    chain_id: String,
    #[validate(range(min = 1, message = "Sequence length must be positive"))]
    sequence_length: u32,
    organism: Option<String>,
}

impl ChainSummary {
    pub fn new(
        chain_id: impl Into<String>,
        sequence_length: u32,
        organism: Option<String>,
    ) -> Self {
        Self {
            chain_id: chain_id.into(),
            sequence_length,
            organism,
        }
    }

    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    pub fn sequence_length(&self) -> u32 {
        self.sequence_length
    }

    pub fn organism(&self) -> Option<&str> {
        self.organism.as_deref()
    }
}

/// One distinct non-polymer chemical component (ligand or ion).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct LigandSummary {
    #[validate(length(min = 1, max = 3, message = "Chemical component id must be 1-3 characters"))]
    chem_component_id: String,
    name: String,
    #[validate(range(min = 1, message = "Instance count must be at least 1"))]
    instance_count: u32,
}

impl LigandSummary {
    pub fn new(
        chem_component_id: impl Into<String>,
        name: impl Into<String>,
        instance_count: u32,
    ) -> Self {
        Self {
            chem_component_id: chem_component_id.into(),
            name: name.into(),
            instance_count,
        }
    }

    pub fn chem_component_id(&self) -> &str {
        &self.chem_component_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instance_count(&self) -> u32 {
        self.instance_count
    }
}

/// Where and when the upstream record was obtained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Provenance {
    #[validate(length(min = 1, max = 100, message = "Source is required"))]
    source: String,
    retrieved_at: DateTime<Utc>,
    #[validate(url(message = "Source URL must be a valid URL"))]
    source_url: String,
}

impl Provenance {
    pub fn new(
        source: impl Into<String>,
        retrieved_at: DateTime<Utc>,
        source_url: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            retrieved_at,
            source_url: source_url.into(),
        }
    }

    /// Provenance for a record fetched from the RCSB Data API.
    pub fn rcsb(retrieved_at: DateTime<Utc>, source_url: impl Into<String>) -> Self {
        Self::new(RCSB_SOURCE_LABEL, retrieved_at, source_url)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn retrieved_at(&self) -> DateTime<Utc> {
        self.retrieved_at
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }
}

/// Token-efficient summary of one PDB entry. This is the unit the
/// structure cache stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_resolution", skip_on_field_errors = false))]
pub struct StructureSummary {
    #[validate(custom = "validate_pdb_id")]
    id: String,
    title: String,
    method: String,
    resolution: Option<f64>,
    #[validate]
    chains: Vec<ChainSummary>,
    #[validate]
    ligands: Vec<LigandSummary>,
    #[validate]
    provenance: Provenance,
}

impl StructureSummary {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        method: impl Into<String>,
        resolution: Option<f64>,
        chains: Vec<ChainSummary>,
        ligands: Vec<LigandSummary>,
        provenance: Provenance,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            method: method.into(),
            resolution,
            chains,
            ligands,
            provenance,
        }
    }

    /// Checks the PDB identifier shape: a digit followed by 3-5 ASCII
    /// alphanumerics, case-insensitive.
    pub fn is_valid_pdb_id(id: &str) -> bool {
        let mut chars = id.chars();
        let leading_digit = matches!(chars.next(), Some(c) if c.is_ascii_digit());
        let rest: Vec<char> = chars.collect();

        leading_digit
            && (3..=5).contains(&rest.len())
            && rest.iter().all(|c| c.is_ascii_alphanumeric())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// Reported resolution in Å, absent for methods that do not report one.
    pub fn resolution(&self) -> Option<f64> {
        self.resolution
    }

    pub fn chains(&self) -> &[ChainSummary] {
        &self.chains
    }

    pub fn ligands(&self) -> &[LigandSummary] {
        &self.ligands
    }

    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    /// Looks up a chain by its (truncated) identifier.
    pub fn chain(&self, chain_id: &str) -> Option<&ChainSummary> {
        self.chains.iter().find(|c| c.chain_id == chain_id)
    }

    /// Total number of ligand copies across all components.
    pub fn total_ligand_instances(&self) -> u32 {
        self.ligands.iter().map(|l| l.instance_count).sum()
    }

    /// True when the summary satisfies all field constraints.
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

// Custom validation functions
fn validate_pdb_id(id: &str) -> Result<(), ValidationError> {
    if !StructureSummary::is_valid_pdb_id(id) {
        return Err(ValidationError::new("invalid_pdb_id_format"));
    }
    Ok(())
}

fn validate_resolution(summary: &StructureSummary) -> Result<(), ValidationError> {
    match summary.resolution {
        Some(value) if !(value.is_finite() && value > 0.0) => {
            Err(ValidationError::new("non_positive_resolution"))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_summary() -> StructureSummary {
        StructureSummary::new(
            "4HHB",
            "THE CRYSTAL STRUCTURE OF HUMAN DEOXYHAEMOGLOBIN AT 1.74 ANGSTROMS RESOLUTION",
            "X-RAY DIFFRACTION",
            Some(1.74),
            vec![
                ChainSummary::new("A", 141, Some("Homo sapiens".to_string())),
                ChainSummary::new("B", 146, Some("Homo sapiens".to_string())),
            ],
            vec![LigandSummary::new("HEM", "PROTOPORPHYRIN IX CONTAINING FE", 4)],
            Provenance::rcsb(
                Utc.with_ymd_and_hms(2025, 5, 19, 10, 30, 0).unwrap(),
                "https://data.rcsb.org/rest/v1/core/entry/4HHB",
            ),
        )
    }

    #[test]
    fn test_pdb_id_format() {
        assert!(StructureSummary::is_valid_pdb_id("4HHB"));
        assert!(StructureSummary::is_valid_pdb_id("1abc"));
        assert!(StructureSummary::is_valid_pdb_id("1ABC23"));
        assert!(!StructureSummary::is_valid_pdb_id("ABCD"));
        assert!(!StructureSummary::is_valid_pdb_id("1AB"));
        assert!(!StructureSummary::is_valid_pdb_id("1ABCDEF"));
        assert!(!StructureSummary::is_valid_pdb_id("1AB-"));
        assert!(!StructureSummary::is_valid_pdb_id(""));
    }

    #[test]
    fn test_sample_summary_is_valid() {
        let summary = sample_summary();
        assert!(summary.is_valid());
        assert_eq!(summary.chain("B").map(|c| c.sequence_length()), Some(146));
        assert_eq!(summary.total_ligand_instances(), 4);
        assert_eq!(summary.provenance().source(), RCSB_SOURCE_LABEL);
    }

    #[test]
    fn test_invalid_fields_are_rejected() {
        let provenance =
            Provenance::rcsb(Utc::now(), "https://data.rcsb.org/rest/v1/core/entry/1ABC");

        let bad_chain = StructureSummary::new(
            "1ABC",
            "t",
            "m",
            None,
            vec![ChainSummary::new("ABC", 10, None)],
            vec![],
            provenance.clone(),
        );
        assert!(!bad_chain.is_valid());

        let bad_resolution = StructureSummary::new(
            "1ABC",
            "t",
            "m",
            Some(0.0),
            vec![],
            vec![],
            provenance.clone(),
        );
        assert!(!bad_resolution.is_valid());

        let bad_id = StructureSummary::new("ABCD", "t", "m", None, vec![], vec![], provenance);
        assert!(!bad_id.is_valid());

        let bad_url = StructureSummary::new(
            "1ABC",
            "t",
            "m",
            None,
            vec![],
            vec![],
            Provenance::rcsb(Utc::now(), "not a url"),
        );
        assert!(!bad_url.is_valid());
    }

    #[test]
    fn test_json_shape() {
        let value = serde_json::to_value(sample_summary()).unwrap();

        assert_eq!(value["id"], "4HHB");
        assert_eq!(value["resolution"], 1.74);
        assert_eq!(value["chains"][0]["chain_id"], "A");
        assert_eq!(value["ligands"][0]["chem_component_id"], "HEM");
        assert_eq!(value["ligands"][0]["instance_count"], 4);
        assert_eq!(value["provenance"]["source"], "RCSB PDB");
        assert_eq!(value["provenance"]["retrieved_at"], "2025-05-19T10:30:00Z");
    }
}
