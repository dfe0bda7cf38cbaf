use serde::{Deserialize, Serialize};

use super::PartitionId;

/// A retrieved piece of supporting text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub text: String,
    /// Source metadata as returned by the retrieval service.
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
    /// Partition the document was retrieved from. Set by the aggregator.
    #[serde(default)]
    pub partition: Option<PartitionId>,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: serde_json::Map::new(),
            partition: None,
        }
    }

    /// Tag the document with its source partition.
    pub fn with_partition(mut self, partition: PartitionId) -> Self {
        self.partition = Some(partition);
        self
    }
}
