//! Structure Summary Extraction
//!
//! Turns raw RCSB core-entry JSON into the fixed-shape [`StructureSummary`]
//! the service caches and returns.
//!
//! [`StructureSummary`]: pdbctx_models::StructureSummary

pub mod lookup;
pub mod extractor;

pub use extractor::{normalize_entry, StructureExtractor};
