//! Error taxonomy for the statistics pipeline.
//!
//! [`StatsError`] is what single lookups surface to their caller and what a
//! bulk collection records per tuple. [`CacheStoreError`] never leaves the
//! cache layer: every variant is downgraded to a miss there.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StatsError {
    /// A required credential or store setting is missing or inconsistent.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The upstream provider was unreachable or answered with a non-success status.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// The upstream body could not be decoded.
    #[error("failed to parse upstream response: {0}")]
    Parse(String),
}

impl StatsError {
    /// Short machine-readable name, used for metric labels and API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            StatsError::Configuration(_) => "configuration",
            StatsError::Upstream(_) => "upstream",
            StatsError::Parse(_) => "parse",
        }
    }
}

#[derive(Error, Debug)]
pub enum CacheStoreError {
    #[error("persistent store unavailable: {0}")]
    Unavailable(#[from] reqwest::Error),

    #[error("persistent store returned status {0}")]
    Status(u16),

    #[error("malformed persistent store row: {0}")]
    Malformed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(StatsError::Configuration("x".into()).kind(), "configuration");
        assert_eq!(StatsError::Upstream("x".into()).kind(), "upstream");
        assert_eq!(StatsError::Parse("x".into()).kind(), "parse");
    }

    #[test]
    fn test_error_display() {
        let err = StatsError::Upstream("status 503 from /stats".into());
        assert_eq!(err.to_string(), "upstream error: status 503 from /stats");
    }
}
