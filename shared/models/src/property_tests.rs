//! Property-based tests for the structure summary models.

use proptest::prelude::*;
use chrono::{DateTime, TimeZone, Utc};

use crate::{ChainSummary, LigandSummary, Provenance, StructureSummary};

prop_compose! {
    fn arb_datetime()(timestamp in 0i64..2147483647i64) -> DateTime<Utc> {
        Utc.timestamp_opt(timestamp, 0).unwrap()
    }
}

prop_compose! {
    fn arb_pdb_id()(id in "[0-9][A-Za-z0-9]{3,5}") -> String {
        id
    }
}

prop_compose! {
    fn arb_chain()(
        chain_id in "[A-Za-z0-9]{1,2}",
        sequence_length in 1u32..5000,
        organism in proptest::option::of("[A-Z][a-z]{3,10} [a-z]{3,10}"),
    ) -> ChainSummary {
        ChainSummary::new(chain_id, sequence_length, organism)
    }
}

prop_compose! {
    fn arb_ligand()(
        chem_id in "[A-Z0-9]{1,3}",
        name in "[A-Z ]{1,40}",
        count in 1u32..100,
    ) -> LigandSummary {
        LigandSummary::new(chem_id, name, count)
    }
}

prop_compose! {
    fn arb_structure_summary()(
        id in arb_pdb_id(),
        title in "[A-Za-z0-9 ]{0,80}",
        resolution in proptest::option::of(0.5f64..10.0),
        chains in proptest::collection::vec(arb_chain(), 0..6),
        ligands in proptest::collection::vec(arb_ligand(), 0..4),
        retrieved_at in arb_datetime(),
    ) -> StructureSummary {
        let url = format!("https://data.rcsb.org/rest/v1/core/entry/{}", id);
        StructureSummary::new(
            id,
            title,
            "X-RAY DIFFRACTION",
            resolution,
            chains,
            ligands,
            Provenance::rcsb(retrieved_at, url),
        )
    }
}

proptest! {
    /// Any identifier of the form digit + 3-5 alphanumerics is accepted.
    #[test]
    fn property_generated_pdb_ids_are_accepted(id in arb_pdb_id()) {
        prop_assert!(StructureSummary::is_valid_pdb_id(&id));
    }

    /// Identifiers that start with a letter are always rejected.
    #[test]
    fn property_letter_prefixed_ids_are_rejected(id in "[A-Za-z][A-Za-z0-9]{3,5}") {
        prop_assert!(!StructureSummary::is_valid_pdb_id(&id));
    }

    /// Summaries built from well-formed parts pass validation.
    #[test]
    fn property_well_formed_summaries_validate(summary in arb_structure_summary()) {
        prop_assert!(summary.is_valid());
    }

    /// Clones share no mutable state and compare equal to the original.
    #[test]
    fn property_clone_is_value_equal(summary in arb_structure_summary()) {
        let copy = summary.clone();
        prop_assert_eq!(&copy, &summary);
        prop_assert_eq!(copy.chains().len(), summary.chains().len());
        prop_assert_eq!(copy.provenance().retrieved_at(), summary.provenance().retrieved_at());
    }
}
