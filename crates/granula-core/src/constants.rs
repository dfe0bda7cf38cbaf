/// Granula system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Hard ceiling on the granularity history length, whatever the config says.
pub const MAX_HISTORY_CEILING: usize = 64;

/// Number of recorded failures after which a tier is avoided.
pub const REPEAT_FAILURE_LIMIT: usize = 2;

/// Confidence above which the analyzer's recommendation is adopted directly on retry.
pub const HIGH_CONFIDENCE_THRESHOLD: f64 = 0.75;

/// How many recently tried tiers block a high-confidence recommendation.
pub const RECENT_TIER_WINDOW: usize = 3;

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "GRANULA_";
