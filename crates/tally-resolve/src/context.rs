//! Per-call resolution context.

use chrono::NaiveDate;
use tally_store::{Consolidation, DissectionGroup, FactFilter, Horizon, TermId};

/// Term a period phrase names, with the calendar year it was narrowed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermScope {
    /// Term id
    pub term_id: TermId,
    /// Inclusive period-end window, when a year was given
    pub window: Option<(NaiveDate, NaiveDate)>,
}

impl TermScope {
    /// Restrict `filter` to this term and window.
    pub fn apply(&self, filter: FactFilter) -> FactFilter {
        let filter = filter.with_terms(vec![self.term_id]);
        match self.window {
            Some((from, to)) => filter.within(from, to),
            None => filter,
        }
    }
}

/// Immutable mode of one resolution.
///
/// Built once per request from the parsed period phrase and passed by value
/// to every resolver, so concurrent requests never share mode flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionContext {
    /// Period family the request targets
    pub horizon: Horizon,
    /// Requested consolidation
    pub consolidation: Consolidation,
    /// Explicit period end, when the period phrase is a date
    pub period_end: Option<NaiveDate>,
    /// Reference date for "current year" rules
    pub as_of: NaiveDate,
    /// Dissection group of the metric, if any
    pub dissection: Option<DissectionGroup>,
    /// Term the period phrase names; metric candidates must have rows in it
    pub term: Option<TermScope>,
}

impl ResolutionContext {
    /// Standard-horizon context with default consolidation.
    pub fn new(as_of: NaiveDate) -> Self {
        Self {
            horizon: Horizon::default(),
            consolidation: Consolidation::default(),
            period_end: None,
            as_of,
            dissection: None,
            term: None,
        }
    }

    /// Set the horizon.
    pub const fn with_horizon(mut self, horizon: Horizon) -> Self {
        self.horizon = horizon;
        self
    }

    /// Set the consolidation.
    pub const fn with_consolidation(mut self, consolidation: Consolidation) -> Self {
        self.consolidation = consolidation;
        self
    }

    /// Set the explicit period end.
    pub const fn with_period_end(mut self, period_end: Option<NaiveDate>) -> Self {
        self.period_end = period_end;
        self
    }

    /// Set the dissection group.
    pub const fn with_dissection(mut self, group: Option<DissectionGroup>) -> Self {
        self.dissection = group;
        self
    }

    /// Set the term scope.
    pub const fn with_term(mut self, term: Option<TermScope>) -> Self {
        self.term = term;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_store::CompanyId;

    #[test]
    fn test_term_scope_narrows_filter() {
        let from = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        let scope = TermScope { term_id: TermId(2), window: Some((from, to)) };

        let filter = scope.apply(FactFilter::new(CompanyId(1)));
        assert_eq!(filter.term_ids, vec![TermId(2)]);
        assert_eq!(filter.period_from, Some(from));
        assert_eq!(filter.period_to, Some(to));

        let open = TermScope { term_id: TermId(2), window: None };
        assert_eq!(open.apply(FactFilter::new(CompanyId(1))).period_from, None);
    }
}
