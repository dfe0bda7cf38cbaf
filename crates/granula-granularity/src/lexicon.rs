//! Domain-specificity lexicon.

use granula_routing::catalog::PartitionCatalog;
use granula_routing::normalize::{contains_phrase, normalize};

/// Four term lists whose hits measure how domain-specific a question is.
///
/// All terms are stored normalized; each term counts at most once per question.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainLexicon {
    partitions: Vec<String>,
    measures: Vec<String>,
    dimensions: Vec<String>,
    acronyms: Vec<String>,
}

impl DomainLexicon {
    pub fn new(
        partitions: Vec<String>,
        measures: Vec<String>,
        dimensions: Vec<String>,
        acronyms: Vec<String>,
    ) -> Self {
        let norm = |terms: Vec<String>| -> Vec<String> {
            terms
                .iter()
                .map(|t| normalize(t))
                .filter(|t| !t.is_empty())
                .collect()
        };
        Self {
            partitions: norm(partitions),
            measures: norm(measures),
            dimensions: norm(dimensions),
            acronyms: norm(acronyms),
        }
    }

    /// Partition, measure and dimension names from the catalog plus `acronyms`.
    pub fn from_catalog(catalog: &PartitionCatalog, acronyms: &[String]) -> Self {
        Self::new(
            catalog.partition_terms(),
            catalog.measure_terms(),
            catalog.dimension_terms(),
            acronyms.to_vec(),
        )
    }

    /// Number of lexicon terms present in `normalized`.
    pub fn score(&self, normalized: &str) -> usize {
        [
            &self.partitions,
            &self.measures,
            &self.dimensions,
            &self.acronyms,
        ]
        .into_iter()
        .flatten()
        .filter(|term| contains_phrase(normalized, term))
        .count()
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
            && self.measures.is_empty()
            && self.dimensions.is_empty()
            && self.acronyms.is_empty()
    }
}
