//! Dissection qualifier stripping.

use crate::error::Result;
use regex::Regex;
use tally_store::DissectionGroup;

const PER_SHARE: &str = r"(?i)\s*(?:per[\s-]*share|/\s*share)\s*";
const ANNUAL_GROWTH: &str = r"(?i)\s*(?:annual|yoy|y/y|year[\s-]*over[\s-]*year)\s*growth\s*";
const PERCENT_OF_ASSET: &str =
    r"(?i)\s*(?:(?:percentage|percent|%)\s*of\s*assets?|of\s*assets?|/\s*assets?)\s*";
const PERCENT_OF_SALES: &str = r"(?i)\s*(?:(?:percentage|percent|%)\s*of\s*(?:sales|revenues?)|of\s*(?:sales|revenues?)|/\s*(?:sales|revenues?))\s*";
const QUARTERLY_GROWTH: &str =
    r"(?i)\s*(?:quarterly|qoq|q/q|quarter[\s-]*over[\s-]*quarter)\s*growth\s*";

/// Phrases that name a per-share metric outright and are left intact.
const PER_SHARE_NAMES: &[&str] = &["earnings per share"];

/// Strips the qualifier of a dissection group from a metric phrase.
#[derive(Debug, Clone)]
pub struct DissectionNormalizer {
    per_share: Regex,
    annual_growth: Regex,
    percent_of_asset: Regex,
    percent_of_sales: Regex,
    quarterly_growth: Regex,
}

impl DissectionNormalizer {
    /// Compile the qualifier patterns.
    pub fn new() -> Result<Self> {
        Ok(Self {
            per_share: Regex::new(PER_SHARE)?,
            annual_growth: Regex::new(ANNUAL_GROWTH)?,
            percent_of_asset: Regex::new(PERCENT_OF_ASSET)?,
            percent_of_sales: Regex::new(PERCENT_OF_SALES)?,
            quarterly_growth: Regex::new(QUARTERLY_GROWTH)?,
        })
    }

    const fn pattern(&self, group: DissectionGroup) -> &Regex {
        match group {
            DissectionGroup::PerShare => &self.per_share,
            DissectionGroup::AnnualGrowth => &self.annual_growth,
            DissectionGroup::PercentOfAssets => &self.percent_of_asset,
            DissectionGroup::PercentOfSales => &self.percent_of_sales,
            DissectionGroup::QuarterlyGrowth => &self.quarterly_growth,
        }
    }

    /// Remove the group's qualifier wherever it appears and collapse
    /// whitespace. Casing of the remaining words is kept. If nothing would be
    /// left, the phrase is returned unchanged.
    pub fn normalize(&self, phrase: &str, group: DissectionGroup) -> String {
        let lower = phrase.trim().to_lowercase();
        if group == DissectionGroup::PerShare && PER_SHARE_NAMES.contains(&lower.as_str()) {
            return collapse(phrase);
        }

        let pattern = self.pattern(group);
        let mut stripped = phrase.to_string();
        // Stripping can splice a new qualifier together, so repeat until stable.
        while pattern.is_match(&stripped) {
            stripped = pattern.replace_all(&stripped, " ").into_owned();
        }

        let stripped = collapse(&stripped);
        if stripped.is_empty() { phrase.to_string() } else { stripped }
    }
}

fn collapse(phrase: &str) -> String {
    phrase.split_whitespace().collect::<Vec<_>>().join(" ")
}
