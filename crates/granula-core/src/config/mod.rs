//! Configuration system for Granula.
//! TOML-based, 3-layer resolution: env > file > defaults.

pub mod defaults;
pub mod granularity_config;
pub mod loop_config;
pub mod observability_config;
pub mod threshold_config;

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::ENV_PREFIX;
use crate::errors::ConfigError;

pub use granularity_config::{GranularityConfig, TierSpec};
pub use loop_config::LoopConfig;
pub use observability_config::ObservabilityConfig;
pub use threshold_config::EvaluationThresholds;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Environment variables (`GRANULA_*`)
/// 2. TOML file passed to [`GranulaConfig::load`]
/// 3. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GranulaConfig {
    pub retry: LoopConfig,
    pub thresholds: EvaluationThresholds,
    pub granularity: GranularityConfig,
    pub observability: ObservabilityConfig,
}

impl GranulaConfig {
    /// Load configuration: defaults, then the optional TOML file, then env overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => {
                let content =
                    std::fs::read_to_string(p).map_err(|_| ConfigError::FileNotFound {
                        path: p.display().to_string(),
                    })?;
                toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                    path: p.display().to_string(),
                    message: e.to_string(),
                })?
            }
            None => Self::default(),
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML string. Missing fields keep their defaults.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }

    /// Apply environment overrides through `lookup`.
    /// Pattern: `GRANULA_MAX_RETRIES`, `GRANULA_THRESHOLD_CONTEXT_RECALL`, etc.
    /// Unparseable values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

        if let Some(v) = var("MAX_RETRIES").and_then(|v| v.parse().ok()) {
            self.retry.max_retries = v;
        }
        if let Some(v) = var("MAX_DOCUMENTS").and_then(|v| v.parse().ok()) {
            self.retry.max_documents = v;
        }
        if let Some(v) = var("PER_PARTITION_LIMIT").and_then(|v| v.parse().ok()) {
            self.retry.per_partition_limit = v;
        }
        if let Some(v) = var("THRESHOLD_FAITHFULNESS").and_then(|v| v.parse().ok()) {
            self.thresholds.faithfulness = v;
        }
        if let Some(v) = var("THRESHOLD_CONTEXT_PRECISION").and_then(|v| v.parse().ok()) {
            self.thresholds.context_precision = v;
        }
        if let Some(v) = var("THRESHOLD_CONTEXT_RECALL").and_then(|v| v.parse().ok()) {
            self.thresholds.context_recall = v;
        }
        if let Some(v) = var("THRESHOLD_ANSWER_RELEVANCE").and_then(|v| v.parse().ok()) {
            self.thresholds.answer_relevance = v;
        }
        if let Some(v) = var("LOG_LEVEL") {
            self.observability.log_level = v;
        }
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in self.thresholds.named() {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(
                    format!("thresholds.{name}"),
                    "must be between 0.0 and 1.0",
                ));
            }
        }

        if self.retry.max_documents == 0 {
            return Err(invalid("retry.max_documents", "must be greater than 0"));
        }
        if self.retry.per_partition_limit == 0 {
            return Err(invalid("retry.per_partition_limit", "must be greater than 0"));
        }
        if self.retry.max_history == 0 {
            return Err(invalid("retry.max_history", "must be greater than 0"));
        }

        let tiers = &self.granularity.tiers;
        if tiers.is_empty() {
            return Err(invalid("granularity.tiers", "at least one tier is required"));
        }
        let mut ids = HashSet::new();
        let mut sizes = HashSet::new();
        for tier in tiers {
            if tier.chunk_size == 0 {
                return Err(invalid(
                    format!("granularity.tiers.{}", tier.id),
                    "chunk_size must be greater than 0",
                ));
            }
            if !ids.insert(tier.id.as_str()) {
                return Err(invalid(
                    "granularity.tiers",
                    format!("duplicate tier id '{}'", tier.id),
                ));
            }
            if !sizes.insert(tier.chunk_size) {
                return Err(invalid(
                    "granularity.tiers",
                    format!("duplicate chunk_size {}", tier.chunk_size),
                ));
            }
        }
        if let Some(initial) = &self.granularity.initial_tier {
            if !ids.contains(initial.as_str()) {
                return Err(invalid(
                    "granularity.initial_tier",
                    format!("'{initial}' is not a configured tier"),
                ));
            }
        }

        Ok(())
    }
}

fn invalid(field: impl Into<String>, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationFailed {
        field: field.into(),
        message: message.into(),
    }
}
