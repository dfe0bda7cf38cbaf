//! Span definitions for the retry loop.

/// Span covering one whole question.
#[macro_export]
macro_rules! session_span {
    ($question:expr) => {
        tracing::info_span!("granula.session", question = %$question)
    };
}

/// Span covering one retrieve → evaluate attempt.
#[macro_export]
macro_rules! attempt_span {
    ($retry_count:expr, $tier:expr) => {
        tracing::info_span!("granula.attempt", retry_count = $retry_count, tier = %$tier)
    };
}

/// Span covering a structured-query dispatch.
#[macro_export]
macro_rules! query_span {
    ($query:expr) => {
        tracing::info_span!("granula.query", query = %$query)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const SESSION: &str = "granula.session";
    pub const ATTEMPT: &str = "granula.attempt";
    pub const QUERY: &str = "granula.query";
}
