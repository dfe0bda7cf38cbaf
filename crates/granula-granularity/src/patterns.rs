//! Question pattern families.
//!
//! Patterns run against normalized text (lowercase, no accents). Each match
//! counts once towards its family.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// What kind of answer a question is after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternFamily {
    /// Exact figures, dates, named entities. Favors small chunks.
    Specific,
    /// Comparisons, causes, breakdowns. Favors medium chunks.
    Analytical,
    /// Overviews and summaries. Favors large chunks.
    Broad,
}

/// A compiled question pattern.
pub struct GranularityPattern {
    pub name: &'static str,
    pub family: PatternFamily,
    pub regex: &'static LazyLock<Option<Regex>>,
}

macro_rules! granularity_pattern {
    ($name:ident, $regex_str:expr) => {
        pub static $name: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new($regex_str).ok());
    };
}

// ── Specific ───────────────────────────────────────────────────────────────
granularity_pattern!(
    RE_EXACT,
    r"\b(?:exact|exactly|specific|precise|precisely|exacto|exacta|exactamente)\b"
);
granularity_pattern!(RE_HOW_MANY, r"\bhow (?:many|much)\b|\bcuant[oa]s?\b");
granularity_pattern!(RE_NUMBER_OF, r"\b(?:number|amount|count|total) of\b|\bnumero de\b");
granularity_pattern!(RE_YEAR, r"\b(?:19|20)\d{2}\b");
granularity_pattern!(RE_WHEN_WHO, r"\b(?:when|who|which one|cuando|quien)\b");

// ── Analytical ─────────────────────────────────────────────────────────────
granularity_pattern!(
    RE_COMPARE,
    r"\b(?:compare|comparison|versus|vs|difference|differences|comparar|compara|diferencia)\b"
);
granularity_pattern!(
    RE_CAUSE,
    r"\b(?:why|cause|causes|reason|reasons|impact|effect|correlation|relationship)\b|\bpor que\b"
);
granularity_pattern!(
    RE_ANALYSIS,
    r"\b(?:analyze|analyse|analysis|evolution|evolved|changed|breakdown|distribution|analisis|evolucion)\b"
);

// ── Broad ──────────────────────────────────────────────────────────────────
granularity_pattern!(
    RE_OVERVIEW,
    r"\b(?:overview|summary|summarize|summarise|resumen|panorama)\b"
);
granularity_pattern!(RE_GENERAL, r"\b(?:general|overall|global|in general)\b");
granularity_pattern!(
    RE_TRENDS,
    r"\b(?:trend|trends|tendencia|tendencias|landscape|big picture)\b"
);
granularity_pattern!(RE_DESCRIBE, r"\b(?:describe|tell me about|explain|describir|explica)\b");

/// All question patterns, grouped by family.
pub fn all_patterns() -> Vec<GranularityPattern> {
    use PatternFamily::*;
    vec![
        GranularityPattern { name: "exact", family: Specific, regex: &RE_EXACT },
        GranularityPattern { name: "how_many", family: Specific, regex: &RE_HOW_MANY },
        GranularityPattern { name: "number_of", family: Specific, regex: &RE_NUMBER_OF },
        GranularityPattern { name: "year", family: Specific, regex: &RE_YEAR },
        GranularityPattern { name: "when_who", family: Specific, regex: &RE_WHEN_WHO },
        GranularityPattern { name: "compare", family: Analytical, regex: &RE_COMPARE },
        GranularityPattern { name: "cause", family: Analytical, regex: &RE_CAUSE },
        GranularityPattern { name: "analysis", family: Analytical, regex: &RE_ANALYSIS },
        GranularityPattern { name: "overview", family: Broad, regex: &RE_OVERVIEW },
        GranularityPattern { name: "general", family: Broad, regex: &RE_GENERAL },
        GranularityPattern { name: "trends", family: Broad, regex: &RE_TRENDS },
        GranularityPattern { name: "describe", family: Broad, regex: &RE_DESCRIBE },
    ]
}

/// Match counts per family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PatternCounts {
    pub specific: usize,
    pub analytical: usize,
    pub broad: usize,
}

impl PatternCounts {
    /// Count pattern matches in `normalized`.
    pub fn count(normalized: &str) -> Self {
        let mut counts = Self::default();
        for pattern in all_patterns() {
            let Some(re) = pattern.regex.as_ref() else {
                continue;
            };
            let hits = re.find_iter(normalized).count();
            match pattern.family {
                PatternFamily::Specific => counts.specific += hits,
                PatternFamily::Analytical => counts.analytical += hits,
                PatternFamily::Broad => counts.broad += hits,
            }
        }
        counts
    }

    pub fn get(&self, family: PatternFamily) -> usize {
        match family {
            PatternFamily::Specific => self.specific,
            PatternFamily::Analytical => self.analytical,
            PatternFamily::Broad => self.broad,
        }
    }

    pub fn total(&self) -> usize {
        self.specific + self.analytical + self.broad
    }

    pub fn leading(&self) -> usize {
        self.specific.max(self.analytical).max(self.broad)
    }

    /// Family holding a strict majority of all matches, if any.
    pub fn dominant(&self) -> Option<PatternFamily> {
        let total = self.total();
        [
            PatternFamily::Specific,
            PatternFamily::Analytical,
            PatternFamily::Broad,
        ]
        .into_iter()
        .find(|f| self.get(*f) * 2 > total)
    }
}
