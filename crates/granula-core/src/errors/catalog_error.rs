/// Partition catalog errors.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog parse error: {message}")]
    ParseError { message: String },

    #[error("duplicate {kind} id in catalog: {id}")]
    DuplicateId { kind: &'static str, id: String },

    #[error("scope {scope} references unknown partition {partition}")]
    UnknownPartition { scope: String, partition: String },

    #[error("catalog has no partitions")]
    Empty,
}
