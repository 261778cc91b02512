//! Fact selection filters and the rows returned for them.

use crate::ids::{CompanyId, ConsolidationId, GroupId, HeadId, TermId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Predicate over one fact partition.
///
/// Every field except the company is optional. The group filter only applies
/// to dissection partitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactFilter {
    /// Company the facts belong to
    pub company_id: CompanyId,
    /// Metric head
    pub head_id: Option<HeadId>,
    /// Accepted terms; empty accepts any term
    pub term_ids: Vec<TermId>,
    /// Consolidation flag
    pub consolidation_id: Option<ConsolidationId>,
    /// Exact period end
    pub period_end: Option<NaiveDate>,
    /// Earliest period end, inclusive
    pub period_from: Option<NaiveDate>,
    /// Latest period end, inclusive
    pub period_to: Option<NaiveDate>,
    /// Dissection group
    pub group_id: Option<GroupId>,
}

impl FactFilter {
    /// Filter on a company only.
    pub const fn new(company_id: CompanyId) -> Self {
        Self {
            company_id,
            head_id: None,
            term_ids: Vec::new(),
            consolidation_id: None,
            period_end: None,
            period_from: None,
            period_to: None,
            group_id: None,
        }
    }

    /// Restrict to one head.
    pub fn with_head(mut self, head_id: HeadId) -> Self {
        self.head_id = Some(head_id);
        self
    }

    /// Restrict to a set of terms.
    pub fn with_terms(mut self, term_ids: Vec<TermId>) -> Self {
        self.term_ids = term_ids;
        self
    }

    /// Restrict to a consolidation flag, if given.
    pub fn with_consolidation(mut self, consolidation_id: Option<ConsolidationId>) -> Self {
        self.consolidation_id = consolidation_id;
        self
    }

    /// Restrict to an exact period end, if given.
    pub fn with_period_end(mut self, period_end: Option<NaiveDate>) -> Self {
        self.period_end = period_end;
        self
    }

    /// Restrict to period ends within `[from, to]`.
    pub fn within(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.period_from = Some(from);
        self.period_to = Some(to);
        self
    }

    /// Restrict to a dissection group, if given.
    pub fn with_group(mut self, group_id: Option<GroupId>) -> Self {
        self.group_id = group_id;
        self
    }
}

/// A distinct period found in a partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeriodRow {
    /// Term of the row
    pub term_id: TermId,
    /// Period end of the row
    pub period_end: NaiveDate,
    /// Dissection group of the row, for dissection partitions
    pub group_id: Option<GroupId>,
}

/// A fact row as written to storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactRow {
    /// Company id
    pub company_id: CompanyId,
    /// Head id
    pub head_id: HeadId,
    /// Term id
    pub term_id: TermId,
    /// Consolidation flag id
    pub consolidation_id: ConsolidationId,
    /// Period end
    pub period_end: NaiveDate,
    /// Value
    pub value: f64,
    /// Dissection group, required for dissection partitions
    #[serde(default)]
    pub group_id: Option<GroupId>,
}

/// A fact joined with its dimension labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactRecord {
    /// Value
    pub value: f64,
    /// Unit name, when the head has one
    pub unit: Option<String>,
    /// Term code
    pub term: String,
    /// Company name
    pub company_name: String,
    /// Head name
    pub metric_name: String,
    /// Consolidation flag name
    pub consolidation_name: String,
    /// Period end
    pub period_end: NaiveDate,
    /// Dissection group, for dissection partitions
    pub group_id: Option<GroupId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let date = NaiveDate::from_ymd_opt(2023, 6, 30).unwrap();
        let filter = FactFilter::new(CompanyId(1))
            .with_head(HeadId(2))
            .with_terms(vec![TermId(3)])
            .with_period_end(Some(date))
            .with_group(None);

        assert_eq!(filter.head_id, Some(HeadId(2)));
        assert_eq!(filter.term_ids, vec![TermId(3)]);
        assert_eq!(filter.period_end, Some(date));
        assert!(filter.consolidation_id.is_none());
        assert!(filter.group_id.is_none());
    }
}
