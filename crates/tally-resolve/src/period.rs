//! Period phrase parsing and resolution.
//!
//! Parsing is pure and happens before any store access, so the horizon it
//! implies can be placed in the [`ResolutionContext`]. Resolution then runs
//! the matching rule against the partitions of the resolved metric.

use crate::company::CompanyScope;
use crate::config::ResolverConfig;
use crate::context::{ResolutionContext, TermScope};
use crate::error::{ResolveError, Result};
use crate::metric::MetricResolution;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tally_store::dimensions::Term;
use tally_store::{
    Dimensions, FactFilter, FactStore, GroupId, Horizon, Partition, PeriodRow, StorageKind, TermId,
};
use tracing::{debug, info, warn};

/// A parsed period phrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodRequest {
    /// An explicit calendar date
    Explicit(NaiveDate),
    /// The latest quarter with data
    MostRecent,
    /// The quarter before the latest
    PreviousQuarter,
    /// The latest annual figure in the current year
    YearToDate,
    /// The latest trailing twelve month figure
    Trailing,
    /// A reporting term code, optionally narrowed to a year
    Term {
        /// Term code to look up
        code: String,
        /// Calendar year of the period end
        year: Option<i32>,
        /// Whether the code came from "FY"
        from_fy: bool,
    },
    /// Nothing recognizable
    Unrecognized(String),
}

const MOST_RECENT: &[&str] = &["most recent", "latest", "current"];
const PREVIOUS_QUARTER: &[&str] = &["last quarter", "previous quarter"];
const YEAR_TO_DATE: &[&str] = &["year to date", "year-to-date"];
const TRAILING: &[&str] = &["trailing twelve months", "trailing 12 months"];

const TERM_PHRASES: &[(&str, &str)] = &[
    ("first quarter", "Q1"),
    ("second quarter", "Q2"),
    ("third quarter", "Q3"),
    ("fourth quarter", "Q4"),
    ("three months", "3M"),
    ("six months", "6M"),
    ("half year", "6M"),
    ("nine months", "9M"),
    ("twelve months", "12M"),
    ("full year", "12M"),
    ("annual", "12M"),
];

/// Cumulative term for a quarter code, used when the quarter code itself is
/// not in the term dimension.
const QUARTER_CUMULATIVE: &[(&str, &str)] = &[("Q1", "3M"), ("Q2", "6M"), ("Q3", "9M"), ("Q4", "12M")];

impl PeriodRequest {
    /// Parse a period phrase.
    ///
    /// Explicit dates are checked first, then relative keywords, then term
    /// codes.
    pub fn parse(phrase: &str, config: &ResolverConfig) -> Self {
        let tokens: Vec<String> = phrase
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
            .collect();
        let lower = tokens.join(" ");

        if let Some(date) = tokens.iter().find_map(|t| parse_date_token(t)) {
            return Self::Explicit(date);
        }

        let has_word = |w: &str| tokens.iter().any(|t| t == w);
        if MOST_RECENT.iter().any(|k| lower.contains(k)) {
            return Self::MostRecent;
        }
        if PREVIOUS_QUARTER.iter().any(|k| lower.contains(k)) {
            return Self::PreviousQuarter;
        }
        if has_word("ytd") || YEAR_TO_DATE.iter().any(|k| lower.contains(k)) {
            return Self::YearToDate;
        }
        if has_word("ttm") || TRAILING.iter().any(|k| lower.contains(k)) {
            return Self::Trailing;
        }

        let year = tokens.iter().find_map(|t| parse_year(t));
        let code = tokens.iter().find_map(|t| term_code_token(t, config)).or_else(|| {
            TERM_PHRASES
                .iter()
                .find(|(p, _)| lower.contains(p))
                .map(|(_, code)| ((*code).to_string(), false))
        });

        match code {
            Some((code, from_fy)) => Self::Term { code, year, from_fy },
            None => Self::Unrecognized(phrase.to_string()),
        }
    }

    /// Horizon the request targets.
    pub const fn horizon(&self) -> Horizon {
        match self {
            Self::MostRecent | Self::PreviousQuarter => Horizon::Quarterly,
            Self::Trailing => Horizon::Trailing,
            Self::Explicit(_) | Self::YearToDate | Self::Term { .. } | Self::Unrecognized(_) => {
                Horizon::Standard
            }
        }
    }

    /// The explicit date, if the request is one.
    pub const fn explicit_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Explicit(date) => Some(*date),
            _ => None,
        }
    }

    /// Term and year window a term request narrows facts to. `None` for
    /// other requests and for codes missing from the term dimension.
    pub fn term_scope(&self, dims: &Dimensions) -> Option<TermScope> {
        let Self::Term { code, year, .. } = self else {
            return None;
        };
        let term = lookup_term(dims, code)?;
        let window = match year {
            Some(year) => Some(year_window(*year)?),
            None => None,
        };
        Some(TermScope { term_id: term.id, window })
    }
}

/// Term for a code, falling back from a quarter code to its cumulative term.
fn lookup_term<'d>(dims: &'d Dimensions, code: &str) -> Option<&'d Term> {
    dims.term_by_code(code).or_else(|| {
        QUARTER_CUMULATIVE
            .iter()
            .find(|(q, _)| q.eq_ignore_ascii_case(code))
            .and_then(|(_, cumulative)| dims.term_by_code(cumulative))
    })
}

/// First and last day of a calendar year.
fn year_window(year: i32) -> Option<(NaiveDate, NaiveDate)> {
    Some((NaiveDate::from_ymd_opt(year, 1, 1)?, NaiveDate::from_ymd_opt(year, 12, 31)?))
}

/// Parse `YYYY-MM-DD` or `D[D]-M[M]-YYYY`.
fn parse_date_token(token: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = token.split('-').collect();
    let [a, b, c] = parts.as_slice() else {
        return None;
    };
    if !parts.iter().all(|p| !p.is_empty() && p.chars().all(|ch| ch.is_ascii_digit())) {
        return None;
    }

    let (year, month, day) = if a.len() == 4 && b.len() <= 2 && c.len() <= 2 {
        (a, b, c)
    } else if c.len() == 4 && a.len() <= 2 && b.len() <= 2 {
        (c, b, a)
    } else {
        return None;
    };
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

fn parse_year(token: &str) -> Option<i32> {
    if token.len() != 4 {
        return None;
    }
    token.parse().ok().filter(|y| (1900..=2100).contains(y))
}

fn term_code_token(token: &str, config: &ResolverConfig) -> Option<(String, bool)> {
    match token {
        "q1" | "q2" | "q3" | "q4" | "3m" | "6m" | "9m" | "12m" => Some((token.to_uppercase(), false)),
        "h1" => Some(("6M".to_string(), false)),
        "fy" => Some((config.fy_term_code.clone(), true)),
        _ => None,
    }
}

/// Which term a period resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodTerm {
    /// An explicit date with no term
    Explicit,
    /// A term from the term dimension
    Term(TermId),
}

/// Outcome of period resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeriodResolution {
    /// Resolved term
    pub term: PeriodTerm,
    /// Resolved period end, if known
    pub period_end: Option<NaiveDate>,
    /// Partition the period was found in
    pub partition: Option<Partition>,
    /// Actual group of the row when the group filter had to be dropped
    pub group_correction: Option<GroupId>,
}

impl PeriodResolution {
    /// Term id, unless the period is an explicit date.
    pub const fn term_id(&self) -> Option<TermId> {
        match self.term {
            PeriodTerm::Term(id) => Some(id),
            PeriodTerm::Explicit => None,
        }
    }

    fn from_row(partition: Partition, row: PeriodRow, group_correction: Option<GroupId>) -> Self {
        Self {
            term: PeriodTerm::Term(row.term_id),
            period_end: Some(row.period_end),
            partition: Some(partition),
            group_correction,
        }
    }
}

/// Resolves a parsed period against the fact partitions of a metric.
#[derive(Debug)]
pub struct PeriodResolver<'a, S: FactStore + ?Sized> {
    store: &'a S,
    dims: &'a Dimensions,
    config: &'a ResolverConfig,
}

impl<'a, S: FactStore + ?Sized> PeriodResolver<'a, S> {
    /// Create a resolver over one dimension snapshot.
    pub const fn new(store: &'a S, dims: &'a Dimensions, config: &'a ResolverConfig) -> Self {
        Self { store, dims, config }
    }

    /// Resolve `request` for the metric and company. Never guesses a date:
    /// a rule without rows yields [`ResolveError::PeriodNotResolved`].
    pub fn resolve(
        &self,
        request: &PeriodRequest,
        metric: &MetricResolution,
        scope: &CompanyScope,
        ctx: &ResolutionContext,
    ) -> Result<PeriodResolution> {
        let base = FactFilter::new(scope.company_id)
            .with_head(metric.head_id)
            .with_consolidation(Some(ctx.consolidation.id()));
        let kind = metric.head_kind;
        let not_resolved = || ResolveError::PeriodNotResolved(describe(request));

        let resolution = match request {
            PeriodRequest::Explicit(date) => PeriodResolution {
                term: PeriodTerm::Explicit,
                period_end: Some(*date),
                partition: None,
                group_correction: None,
            },
            PeriodRequest::MostRecent | PeriodRequest::PreviousQuarter => {
                let offset = usize::from(*request == PeriodRequest::PreviousQuarter);
                let partition = match metric.group {
                    Some(_) => Partition::Dissection(StorageKind::Quarter),
                    None => Partition::fact(kind, Horizon::Quarterly),
                };
                self.latest(&[partition], &base, offset, metric)?
                    .ok_or_else(not_resolved)?
            }
            PeriodRequest::YearToDate => {
                let terms = self.dims.term_ids_for_codes(&self.config.annual_term_codes);
                let Some((from, to)) = year_window(ctx.as_of.year()) else {
                    return Err(not_resolved());
                };
                if terms.is_empty() {
                    return Err(not_resolved());
                }
                let filter = base.clone().with_terms(terms).within(from, to);
                self.latest(&[home_partition(metric)], &filter, 0, metric)?
                    .ok_or_else(not_resolved)?
            }
            PeriodRequest::Trailing => {
                let trailing = match metric.group {
                    Some(_) => Partition::Dissection(StorageKind::Ttm),
                    None => Partition::fact(kind, Horizon::Trailing),
                };
                match self.latest(&[trailing], &base, 0, metric)? {
                    Some(found) => found,
                    None => {
                        let terms = self.dims.term_ids_for_codes(&[&self.config.ttm_term_code]);
                        if terms.is_empty() {
                            return Err(not_resolved());
                        }
                        debug!("no trailing partition rows, checking TTM term rows");
                        let filter = base.clone().with_terms(terms);
                        self.latest(&[home_partition(metric)], &filter, 0, metric)?
                            .ok_or_else(not_resolved)?
                    }
                }
            }
            PeriodRequest::Term { code, from_fy, .. } => {
                if *from_fy {
                    warn!(code = %code, "FY mapped to configured term code");
                }
                let scope = request.term_scope(self.dims).ok_or_else(not_resolved)?;
                let filter = scope.apply(base.clone());
                let partitions = term_partitions(metric, ctx.horizon);
                self.latest(&partitions, &filter, 0, metric)?
                    .ok_or_else(not_resolved)?
            }
            PeriodRequest::Unrecognized(_) => return Err(not_resolved()),
        };

        info!(
            term = ?resolution.term,
            period_end = ?resolution.period_end,
            partition = ?resolution.partition,
            "period resolved"
        );
        Ok(resolution)
    }

    /// Newest period at `offset` across `partitions`. Dissected metrics are
    /// searched with their group first and without it second; a row found
    /// the second way reports its own group as a correction.
    fn latest(
        &self,
        partitions: &[Partition],
        filter: &FactFilter,
        offset: usize,
        metric: &MetricResolution,
    ) -> Result<Option<PeriodResolution>> {
        let group_id = metric.group.map(|g| g.id());
        let grouped = filter.clone().with_group(group_id);

        for partition in partitions {
            if let Some(row) = self.store.period_at(*partition, &grouped, offset)? {
                return Ok(Some(PeriodResolution::from_row(*partition, row, None)));
            }
        }

        if group_id.is_none() {
            return Ok(None);
        }

        let ungrouped = filter.clone().with_group(None);
        for partition in partitions {
            if let Some(row) = self.store.period_at(*partition, &ungrouped, offset)? {
                let correction = row.group_id.filter(|g| Some(*g) != group_id);
                warn!(
                    %partition,
                    requested = ?group_id,
                    found = ?row.group_id,
                    "period found only without the dissection group filter"
                );
                return Ok(Some(PeriodResolution::from_row(*partition, row, correction)));
            }
        }
        Ok(None)
    }
}

/// Partition holding the metric's standard-horizon rows.
const fn home_partition(metric: &MetricResolution) -> Partition {
    match metric.group {
        Some(group) => Partition::Dissection(group.storage_kind()),
        None => Partition::fact(metric.head_kind, Horizon::Standard),
    }
}

/// Partitions searched for a term code: where the metric's data was found,
/// then the rest of its validation set.
fn term_partitions(metric: &MetricResolution, horizon: Horizon) -> Vec<Partition> {
    let mut partitions: Vec<Partition> = metric.partition.into_iter().collect();
    for p in crate::priority::validation_partitions(metric.head_kind, metric.group, horizon) {
        if !partitions.contains(&p) {
            partitions.push(p);
        }
    }
    partitions
}

fn describe(request: &PeriodRequest) -> String {
    match request {
        PeriodRequest::Explicit(date) => date.to_string(),
        PeriodRequest::MostRecent => "most recent quarter".to_string(),
        PeriodRequest::PreviousQuarter => "last quarter".to_string(),
        PeriodRequest::YearToDate => "year to date".to_string(),
        PeriodRequest::Trailing => "trailing twelve months".to_string(),
        PeriodRequest::Term { code, year: Some(year), .. } => format!("{} {}", code, year),
        PeriodRequest::Term { code, year: None, .. } => code.clone(),
        PeriodRequest::Unrecognized(phrase) => phrase.clone(),
    }
}
