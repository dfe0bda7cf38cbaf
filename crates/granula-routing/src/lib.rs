//! # granula-routing
//!
//! Static partition catalog and the query classifier that picks which
//! partitions a question should be answered from.

pub mod catalog;
pub mod classifier;
pub mod normalize;

pub use catalog::{Partition, PartitionCatalog, Scope};
pub use classifier::{Classification, ClassificationMethod, QueryClassifier};
pub use normalize::{normalize, slug};
