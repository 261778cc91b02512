//! Answer rendering.

use crate::engine::Answer;
use std::fmt::Write as _;
use thiserror::Error;

/// Errors that can occur while rendering an answer.
#[derive(Debug, Error)]
pub enum ReportError {
    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Formatting error.
    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    /// Unknown output format.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Output format for answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerFormat {
    /// Human readable summary.
    Text,

    /// Compact JSON.
    Json,

    /// Pretty-printed JSON.
    PrettyJson,
}

impl AnswerFormat {
    /// Parse a format name.
    pub fn parse(name: &str) -> Result<Self, ReportError> {
        match name.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "pretty" | "pretty-json" => Ok(Self::PrettyJson),
            other => Err(ReportError::InvalidFormat(other.to_string())),
        }
    }
}

/// Render an answer in the given format.
pub fn render(answer: &Answer, format: AnswerFormat) -> Result<String, ReportError> {
    match format {
        AnswerFormat::Text => render_text(answer),
        AnswerFormat::Json => Ok(serde_json::to_string(answer)?),
        AnswerFormat::PrettyJson => Ok(serde_json::to_string_pretty(answer)?),
    }
}

fn render_text(answer: &Answer) -> Result<String, ReportError> {
    let fact = &answer.fact;
    let coord = &answer.coordinate;
    let mut out = String::new();

    writeln!(out, "{} ({})", fact.company_name, answer.company.ticker)?;
    write!(out, "  {}: {}", fact.metric_name, fact.value)?;
    if let Some(unit) = &fact.unit {
        write!(out, " {}", unit)?;
    }
    writeln!(out)?;
    writeln!(out, "  Period:        {} ({})", fact.period_end, fact.term)?;
    writeln!(out, "  Consolidation: {}", fact.consolidation_name)?;
    writeln!(out, "  Partition:     {}", coord.partition)?;
    if let Some(group) = coord.dissection_group {
        writeln!(out, "  Dissection:    group {}", group)?;
    }
    if answer.metric.head_name != answer.interpretation.base {
        writeln!(
            out,
            "  Matched:       '{}' -> '{}'",
            answer.interpretation.base, answer.metric.head_name
        )?;
    }

    Ok(out)
}
