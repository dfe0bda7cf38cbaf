use std::sync::Arc;

use granula_core::models::PartitionId;
use granula_routing::{PartitionCatalog, QueryClassifier};
use proptest::prelude::*;
use test_fixtures::institutional_catalog_toml;

fn classifier() -> QueryClassifier {
    let catalog = PartitionCatalog::from_toml(&institutional_catalog_toml()).unwrap();
    QueryClassifier::new(Arc::new(catalog))
}

const WORDS: &[&str] = &[
    "students", "cube", "staff", "domain", "research", "budget", "how", "many", "área",
    "de", "graduates", "dataset", "funding", "scope", "academic", "2023", "¿qué", "publications",
];

fn question() -> impl Strategy<Value = String> {
    prop_oneof![
        ".{0,80}",
        proptest::collection::vec(proptest::sample::select(WORDS), 0..12).prop_map(|w| w.join(" ")),
    ]
}

proptest! {
    #[test]
    fn classification_is_idempotent(q in question()) {
        let c = classifier();
        prop_assert_eq!(c.classify(&q, &[]), c.classify(&q, &[]));
    }

    #[test]
    fn result_is_non_empty_subset_of_available(
        q in question(),
        mask in proptest::collection::vec(any::<bool>(), 7),
    ) {
        let c = classifier();
        let all = c.catalog().partition_ids();
        let mut available: Vec<PartitionId> = all
            .iter()
            .zip(&mask)
            .filter(|(_, keep)| **keep)
            .map(|(p, _)| p.clone())
            .collect();
        if available.is_empty() {
            available.push(all[0].clone());
        }
        let got = c.classify(&q, &available);
        prop_assert!(!got.partitions.is_empty());
        for p in &got.partitions {
            prop_assert!(available.contains(p));
        }
    }
}
