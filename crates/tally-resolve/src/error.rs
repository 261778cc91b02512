//! Error types for resolution.

use crate::coordinate::ResolvedCoordinate;
use tally_store::{HeadId, StoreError};
use thiserror::Error;

/// Result type for resolution.
pub type Result<T> = std::result::Result<T, ResolveError>;

/// Errors surfaced by the resolution pipeline.
///
/// Internal fallbacks never appear here; each variant is a final outcome.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No company matched by ticker or name
    #[error("Company not found: {0}")]
    CompanyNotFound(String),

    /// No head name matched the metric phrase
    #[error("Metric not found: {phrase}{}", suggestion_suffix(.suggestions))]
    MetricNotFound {
        /// Phrase that was searched
        phrase: String,
        /// Head names sharing a word with the phrase
        suggestions: Vec<String>,
    },

    /// Heads matched but none has rows for the requested scope
    #[error("No data for metric '{candidate}' (head {head_id})")]
    MetricNoData {
        /// Name of the best syntactic candidate
        candidate: String,
        /// Id of the best syntactic candidate
        head_id: HeadId,
        /// Coordinate that was looked up, when resolution got that far
        coordinate: Option<Box<ResolvedCoordinate>>,
    },

    /// The period phrase matched no rule, or its rule found no rows
    #[error("Could not resolve period: {0}")]
    PeriodNotResolved(String),

    /// Sub-resolutions could not be assembled into a coordinate
    #[error("Invalid coordinate request: {0}")]
    InvalidCoordinateRequest(String),

    /// Configuration could not be read
    #[error("Configuration error: {0}")]
    Config(String),

    /// A phrase pattern failed to compile
    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    /// The store failed
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
}

fn suggestion_suffix(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" (did you mean: {})", suggestions.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_not_found_message() {
        let err = ResolveError::MetricNotFound {
            phrase: "Revenu".to_string(),
            suggestions: vec!["Revenue".to_string(), "Net Revenue".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Metric not found: Revenu (did you mean: Revenue, Net Revenue)"
        );

        let bare = ResolveError::MetricNotFound { phrase: "xyz".to_string(), suggestions: vec![] };
        assert_eq!(bare.to_string(), "Metric not found: xyz");
    }
}
