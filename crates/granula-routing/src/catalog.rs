//! Static scope → partition catalog.
//!
//! Loaded once at startup and shared read-only (`Arc<PartitionCatalog>`)
//! between the classifier, the analyzer's domain lexicon and the retrieval
//! fallback.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use granula_core::errors::CatalogError;
use granula_core::models::{PartitionId, ScopeId};

use crate::normalize::{normalize, slug};

/// An independently retrievable segment of the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partition {
    pub id: PartitionId,
    pub name: String,
    /// Measure names, counted by the domain lexicon.
    #[serde(default)]
    pub measures: Vec<String>,
    /// Dimension names, counted by the domain lexicon.
    #[serde(default)]
    pub dimensions: Vec<String>,
}

/// A topical grouping of partitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scope {
    pub id: ScopeId,
    pub name: String,
    /// Keyword signature used for scoring questions.
    #[serde(default)]
    pub keywords: Vec<String>,
    pub partitions: Vec<PartitionId>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    scopes: Vec<Scope>,
    #[serde(default)]
    partitions: Vec<Partition>,
}

/// Validated catalog. Scope order is registration order and breaks
/// classification ties.
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionCatalog {
    scopes: Vec<Scope>,
    partitions: Vec<Partition>,
}

impl PartitionCatalog {
    /// Build a catalog, rejecting duplicate ids, dangling scope references
    /// and an empty partition list.
    pub fn new(scopes: Vec<Scope>, partitions: Vec<Partition>) -> Result<Self, CatalogError> {
        if partitions.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut partition_ids = HashSet::new();
        for p in &partitions {
            if !partition_ids.insert(p.id.as_str()) {
                return Err(CatalogError::DuplicateId {
                    kind: "partition",
                    id: p.id.to_string(),
                });
            }
        }

        let mut scope_ids = HashSet::new();
        for s in &scopes {
            if !scope_ids.insert(s.id.as_str()) {
                return Err(CatalogError::DuplicateId {
                    kind: "scope",
                    id: s.id.to_string(),
                });
            }
            if let Some(missing) = s
                .partitions
                .iter()
                .find(|p| !partition_ids.contains(p.as_str()))
            {
                return Err(CatalogError::UnknownPartition {
                    scope: s.id.to_string(),
                    partition: missing.to_string(),
                });
            }
        }

        Ok(Self { scopes, partitions })
    }

    pub fn from_toml(text: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(text).map_err(|e| CatalogError::ParseError {
            message: e.to_string(),
        })?;
        Self::new(file.scopes, file.partitions)
    }

    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile =
            serde_json::from_str(text).map_err(|e| CatalogError::ParseError {
                message: e.to_string(),
            })?;
        Self::new(file.scopes, file.partitions)
    }

    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    pub fn partitions(&self) -> &[Partition] {
        &self.partitions
    }

    /// Every partition id, in registration order.
    pub fn partition_ids(&self) -> Vec<PartitionId> {
        self.partitions.iter().map(|p| p.id.clone()).collect()
    }

    pub fn scope(&self, id: &ScopeId) -> Option<&Scope> {
        self.scopes.iter().find(|s| &s.id == id)
    }

    pub fn partition(&self, id: &PartitionId) -> Option<&Partition> {
        self.partitions.iter().find(|p| &p.id == id)
    }

    /// Resolve a name token (as typed by a user) to a scope by id or name.
    pub fn find_scope(&self, token: &str) -> Option<&Scope> {
        let wanted = slug(token);
        self.scopes
            .iter()
            .find(|s| slug(s.id.as_str()) == wanted || slug(&s.name) == wanted)
    }

    /// Resolve a name token to a partition by id or name.
    pub fn find_partition(&self, token: &str) -> Option<&Partition> {
        let wanted = slug(token);
        self.partitions
            .iter()
            .find(|p| slug(p.id.as_str()) == wanted || slug(&p.name) == wanted)
    }

    /// First registered scope that contains `partition`.
    pub fn scope_of(&self, partition: &PartitionId) -> Option<&Scope> {
        self.scopes.iter().find(|s| s.partitions.contains(partition))
    }

    /// Normalized partition names, for the domain lexicon.
    pub fn partition_terms(&self) -> Vec<String> {
        dedup_terms(self.partitions.iter().map(|p| p.name.as_str()))
    }

    /// Normalized measure names across all partitions.
    pub fn measure_terms(&self) -> Vec<String> {
        dedup_terms(
            self.partitions
                .iter()
                .flat_map(|p| p.measures.iter().map(String::as_str)),
        )
    }

    /// Normalized dimension names across all partitions.
    pub fn dimension_terms(&self) -> Vec<String> {
        dedup_terms(
            self.partitions
                .iter()
                .flat_map(|p| p.dimensions.iter().map(String::as_str)),
        )
    }
}

fn dedup_terms<'a>(terms: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    terms
        .map(normalize)
        .filter(|t| !t.is_empty() && seen.insert(t.clone()))
        .collect()
}
