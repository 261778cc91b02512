//! Metric phrase classification.
//!
//! Rules are checked in order and the first match wins. Matching is
//! case-insensitive substring containment.

use serde::Serialize;
use tally_store::{DissectionGroup, StorageKind};

/// Category of a metric phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case", tag = "class")]
pub enum MetricClass {
    /// A dissected metric
    Dissection {
        /// Dissection group
        group: DissectionGroup,
        /// Storage kind implied by the group
        kind: StorageKind,
    },
    /// A ratio
    Ratio,
    /// Anything else; treated as a regular metric
    Unknown,
}

impl MetricClass {
    const fn dissection(group: DissectionGroup) -> Self {
        Self::Dissection { group, kind: group.storage_kind() }
    }

    /// Dissection group, if any.
    pub const fn group(&self) -> Option<DissectionGroup> {
        match self {
            Self::Dissection { group, .. } => Some(*group),
            Self::Ratio | Self::Unknown => None,
        }
    }

    /// Returns true when the metric is stored as a ratio.
    pub const fn is_ratio(&self) -> bool {
        match self {
            Self::Dissection { kind, .. } => matches!(kind, StorageKind::Ratio),
            Self::Ratio => true,
            Self::Unknown => false,
        }
    }
}

const PER_SHARE: &[&str] = &["per share", "/share", "per-share"];
const PER_SHARE_EXACT: &[&str] = &["eps", "earnings per share"];

const ANNUAL_GROWTH: &[&str] = &[
    "annual growth",
    "yoy growth",
    "y/y growth",
    "year over year growth",
    "year-over-year growth",
];

const PERCENT_OF_ASSET: &[&str] = &[
    "percentage of asset",
    "percent of asset",
    "% of asset",
    "of asset",
    "/asset",
];

const PERCENT_OF_SALES: &[&str] = &[
    "percentage of sales",
    "percentage of revenue",
    "percent of sales",
    "percent of revenue",
    "% of sales",
    "% of revenue",
    "of sales",
    "of revenue",
    "/sales",
    "/revenue",
];

const QUARTERLY_GROWTH: &[&str] = &[
    "quarterly growth",
    "qoq growth",
    "q/q growth",
    "quarter over quarter growth",
    "quarter-over-quarter growth",
];

const RATIO_TERMS: &[&str] = &[
    "ratio",
    "margin",
    "return on",
    "roe",
    "roa",
    "roce",
    "yield",
    "coverage",
    "to equity",
    "debt to",
    "debt/equity",
    "d/e ratio",
];

const GROWTH_RULES: &[(&[&str], DissectionGroup)] = &[
    (ANNUAL_GROWTH, DissectionGroup::AnnualGrowth),
    (PERCENT_OF_ASSET, DissectionGroup::PercentOfAssets),
    (PERCENT_OF_SALES, DissectionGroup::PercentOfSales),
    (QUARTERLY_GROWTH, DissectionGroup::QuarterlyGrowth),
];

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Classify a raw metric phrase. Never fails; an empty phrase is unknown.
pub fn classify(phrase: &str) -> MetricClass {
    let lower = phrase.trim().to_lowercase();
    if lower.is_empty() {
        return MetricClass::Unknown;
    }

    if contains_any(&lower, PER_SHARE) || PER_SHARE_EXACT.contains(&lower.as_str()) {
        return MetricClass::dissection(DissectionGroup::PerShare);
    }

    for (terms, group) in GROWTH_RULES {
        if contains_any(&lower, terms) {
            return MetricClass::dissection(*group);
        }
    }

    if contains_any(&lower, RATIO_TERMS) {
        return MetricClass::Ratio;
    }

    MetricClass::Unknown
}

/// Whether the phrase asks for trailing-twelve-month EPS.
pub fn is_ttm_eps(phrase: &str) -> bool {
    let lower = phrase.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    lower == "ttm eps" || lower == "eps ttm"
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("EPS per share", DissectionGroup::PerShare)]
    #[case("Book value/share", DissectionGroup::PerShare)]
    #[case("Dividend Per-Share", DissectionGroup::PerShare)]
    #[case("EPS", DissectionGroup::PerShare)]
    #[case("Earnings Per Share", DissectionGroup::PerShare)]
    #[case("Revenue annual growth", DissectionGroup::AnnualGrowth)]
    #[case("PAT YoY Growth", DissectionGroup::AnnualGrowth)]
    #[case("Cash % of Assets", DissectionGroup::PercentOfAssets)]
    #[case("ROI/Asset", DissectionGroup::PercentOfAssets)]
    #[case("Gross profit percentage of sales", DissectionGroup::PercentOfSales)]
    #[case("Opex/Revenue", DissectionGroup::PercentOfSales)]
    #[case("Deposits quarterly growth", DissectionGroup::QuarterlyGrowth)]
    #[case("PAT QoQ growth", DissectionGroup::QuarterlyGrowth)]
    fn test_dissection_rules(#[case] phrase: &str, #[case] group: DissectionGroup) {
        assert_eq!(
            classify(phrase),
            MetricClass::Dissection { group, kind: group.storage_kind() }
        );
    }

    #[rstest]
    #[case("Debt to Equity")]
    #[case("Current Ratio")]
    #[case("Net profit margin")]
    #[case("Return on Equity")]
    #[case("ROE")]
    #[case("Dividend yield")]
    #[case("Interest coverage")]
    fn test_ratio_rules(#[case] phrase: &str) {
        assert_eq!(classify(phrase), MetricClass::Ratio);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("Total Assets")]
    #[case("Net Revenue")]
    #[case("Profit after tax")]
    fn test_unknown(#[case] phrase: &str) {
        assert_eq!(classify(phrase), MetricClass::Unknown);
    }

    #[test]
    fn test_per_share_wins_over_growth() {
        assert_eq!(
            classify("EPS per share annual growth").group(),
            Some(DissectionGroup::PerShare)
        );
    }

    #[test]
    fn test_is_ratio() {
        assert!(classify("ROI/Asset").is_ratio());
        assert!(!classify("EPS per share").is_ratio());
        assert!(!classify("Deposits quarterly growth").is_ratio());
        assert!(classify("Debt to Equity").is_ratio());
    }

    #[test]
    fn test_deterministic() {
        for phrase in ["EPS per share", "Debt to Equity", "xyz", "ROI/Asset"] {
            assert_eq!(classify(phrase), classify(phrase));
        }
    }

    #[test]
    fn test_ttm_eps() {
        assert!(is_ttm_eps("TTM EPS"));
        assert!(is_ttm_eps("eps  ttm"));
        assert!(!is_ttm_eps("EPS"));
    }
}
