//! Explicit scope and partition mentions, matched on normalized text.

use regex::Regex;
use std::sync::LazyLock;

macro_rules! mention_pattern {
    ($name:ident, $regex_str:expr) => {
        pub static $name: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new($regex_str).ok());
    };
}

// "scope academic", "domain of finance", "ambito de investigacion"
mention_pattern!(
    RE_SCOPE_MENTION,
    r"\b(?:scope|domain|area|ambito)\s+(?:of\s+|de\s+|del\s+)?([\w-]+)"
);

// "cube enrollment", "partition graduates", "cubo de matricula", "dataset staff"
mention_pattern!(
    RE_PARTITION_MENTION,
    r"\b(?:partition|cube|cubo|dataset)\s+(?:of\s+|de\s+|del\s+)?([\w-]+)"
);

/// Name tokens following a scope keyword, in order of appearance.
pub fn scope_mentions(normalized: &str) -> Vec<&str> {
    captures(&RE_SCOPE_MENTION, normalized)
}

/// Name tokens following a partition keyword, in order of appearance.
pub fn partition_mentions(normalized: &str) -> Vec<&str> {
    captures(&RE_PARTITION_MENTION, normalized)
}

fn captures<'a>(pattern: &LazyLock<Option<Regex>>, text: &'a str) -> Vec<&'a str> {
    let Some(re) = pattern.as_ref() else {
        return Vec::new();
    };
    re.captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patterns_compile() {
        assert!(RE_SCOPE_MENTION.is_some());
        assert!(RE_PARTITION_MENTION.is_some());
    }

    #[test]
    fn scope_mention_with_connector() {
        assert_eq!(scope_mentions("students in the domain of academic"), vec!["academic"]);
        assert_eq!(scope_mentions("datos del ambito de investigacion"), vec!["investigacion"]);
    }

    #[test]
    fn partition_mention_keeps_identifier_characters() {
        assert_eq!(
            partition_mentions("use cube student_enrollment for this"),
            vec!["student_enrollment"]
        );
        assert_eq!(partition_mentions("dataset human-resources"), vec!["human-resources"]);
    }

    #[test]
    fn no_mention_yields_nothing() {
        assert!(scope_mentions("how many students graduated").is_empty());
        assert!(partition_mentions("how many students graduated").is_empty());
    }
}
