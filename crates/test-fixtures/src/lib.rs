//! Test fixture loader and scripted collaborators for Granula tests.
//!
//! Fixture files live under `data/` in this crate. The fakes in [`fakes`]
//! implement every `granula_core::traits` interface with canned, inspectable
//! behavior.

pub mod fakes;

use serde::de::DeserializeOwned;
use std::path::PathBuf;

/// Root directory of the fixture data.
fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
}

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let content = load_fixture_str(relative_path);
    serde_json::from_str(&content).unwrap_or_else(|e| {
        panic!(
            "Failed to parse fixture {}: {}",
            fixture_path(relative_path).display(),
            e
        )
    })
}

/// Load a fixture file as raw text (TOML catalogs, configs).
///
/// # Panics
/// Panics if the file doesn't exist.
pub fn load_fixture_str(relative_path: &str) -> String {
    let path = fixture_path(relative_path);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e))
}

/// Check that a fixture file exists.
pub fn fixture_exists(relative_path: &str) -> bool {
    fixtures_root().join(relative_path).exists()
}

/// Get the absolute path to a fixture file.
pub fn fixture_path(relative_path: &str) -> PathBuf {
    fixtures_root().join(relative_path)
}

/// TOML text of the institutional catalog used across the workspace tests.
pub fn institutional_catalog_toml() -> String {
    load_fixture_str("catalog/institutional.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_are_present() {
        assert!(fixture_exists("catalog/institutional.toml"));
        assert!(fixture_exists("golden/classification_cases.json"));
        assert!(fixture_exists("golden/analyzer_cases.json"));
    }

    #[test]
    fn golden_files_parse_as_json() {
        let cases: serde_json::Value = load_fixture("golden/classification_cases.json");
        assert!(cases.as_array().is_some_and(|a| !a.is_empty()));
    }
}
