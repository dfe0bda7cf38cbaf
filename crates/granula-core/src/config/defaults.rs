// Single source of truth for all default values.

// --- Loop ---
pub const DEFAULT_MAX_RETRIES: u32 = 2;
pub const DEFAULT_MAX_DOCUMENTS: usize = 15;
pub const DEFAULT_PER_PARTITION_LIMIT: usize = 5;
pub const DEFAULT_MAX_HISTORY: usize = 5;
pub const DEFAULT_INTERPRET_QUERY_RESULTS: bool = true;
pub const DEFAULT_GROUNDED_SHORT_CIRCUIT: bool = true;

// --- Evaluation thresholds ---
pub const DEFAULT_FAITHFULNESS_THRESHOLD: f64 = 0.8;
pub const DEFAULT_CONTEXT_PRECISION_THRESHOLD: f64 = 0.8;
pub const DEFAULT_CONTEXT_RECALL_THRESHOLD: f64 = 0.7;
pub const DEFAULT_ANSWER_RELEVANCE_THRESHOLD: f64 = 0.7;

// --- Granularity ---
pub const DEFAULT_TIERS: &[(&str, u32)] = &[("fine", 256), ("medium", 512), ("coarse", 1024)];
pub const DEFAULT_ACRONYMS: &[&str] = &["ECTS", "FTE", "GPA", "KPI", "PAS", "PDI", "TFG", "TFM"];

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = false;
