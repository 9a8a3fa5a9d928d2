//! # PDB Context Domain Models
//!
//! Core domain models for the PDB context service. All models implement
//! serialization with serde and validation with the validator crate.
//!
//! ## Key Models
//!
//! - **StructureSummary**: compact summary of one PDB entry, the unit the service caches
//! - **ChainSummary**: one distinct polymer chain identifier with its sequence length and organism
//! - **LigandSummary**: one distinct non-polymer chemical component and its copy count
//! - **Provenance**: where and when the upstream record was obtained
//!
//! ## Immutability
//!
//! Summaries are handed out of a shared cache, so none of these types expose
//! setters. Fields are read through accessors only.

pub mod structure;

#[cfg(test)]
pub mod property_tests;

pub use structure::*;
