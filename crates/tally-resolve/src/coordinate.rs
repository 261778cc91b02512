//! Coordinate assembly.

use crate::context::ResolutionContext;
use crate::error::{ResolveError, Result};
use crate::metric::MetricResolution;
use crate::period::PeriodResolution;
use chrono::NaiveDate;
use serde::Serialize;
use tally_store::{
    CompanyId, ConsolidationId, DissectionGroup, FactFilter, GroupId, HeadId, HeadKind, Horizon,
    Partition, StorageKind, TermId,
};

/// Fully resolved address of one fact row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedCoordinate {
    /// Company id
    pub company_id: CompanyId,
    /// Head id
    pub head_id: HeadId,
    /// Whether the head is a ratio head
    pub is_ratio: bool,
    /// Dissection group id, for dissected metrics
    pub dissection_group: Option<GroupId>,
    /// Storage kind of the partition
    pub storage_kind: StorageKind,
    /// Term id; absent for explicit dates
    pub term_id: Option<TermId>,
    /// Period end; absent when the term alone identifies the row
    pub period_end: Option<NaiveDate>,
    /// Consolidation flag id
    pub consolidation_id: ConsolidationId,
    /// Fact partition
    pub partition: Partition,
}

impl ResolvedCoordinate {
    /// Filter selecting exactly this coordinate.
    pub fn filter(&self) -> FactFilter {
        FactFilter::new(self.company_id)
            .with_head(self.head_id)
            .with_terms(self.term_id.into_iter().collect())
            .with_consolidation(Some(self.consolidation_id))
            .with_period_end(self.period_end)
            .with_group(self.dissection_group)
    }

    /// Filter selecting every period of this coordinate's series.
    pub fn series_filter(&self) -> FactFilter {
        FactFilter::new(self.company_id)
            .with_head(self.head_id)
            .with_consolidation(Some(self.consolidation_id))
            .with_group(self.dissection_group)
    }
}

/// Storage kind label of a partition.
const fn storage_kind_of(partition: Partition) -> StorageKind {
    match partition {
        Partition::Dissection(kind) => kind,
        Partition::Fact { horizon: Horizon::Quarterly, .. } => StorageKind::Quarter,
        Partition::Fact { horizon: Horizon::Trailing, .. } => StorageKind::Ttm,
        Partition::Fact { kind: HeadKind::Ratio, .. } => StorageKind::Ratio,
        Partition::Fact { kind: HeadKind::Regular, .. } => StorageKind::Regular,
    }
}

/// Partition implied by head kind, group and horizon alone.
const fn derived_partition(
    kind: HeadKind,
    group: Option<DissectionGroup>,
    horizon: Horizon,
) -> Partition {
    match (group, horizon) {
        (Some(_), Horizon::Trailing) => Partition::Dissection(StorageKind::Ttm),
        (Some(_), Horizon::Quarterly) => Partition::Dissection(StorageKind::Quarter),
        (Some(group), Horizon::Standard) => Partition::Dissection(group.storage_kind()),
        (None, horizon) => Partition::fact(kind, horizon),
    }
}

/// Assemble a coordinate from the metric and period resolutions.
///
/// The partition is the one the period was found in, else the one the
/// metric's data was found in, else the one implied by the context. A
/// corrected group from period resolution replaces the classified group.
pub fn compose(
    company_id: CompanyId,
    metric: Option<&MetricResolution>,
    period: &PeriodResolution,
    ctx: &ResolutionContext,
) -> Result<ResolvedCoordinate> {
    let metric = metric.ok_or_else(|| {
        ResolveError::InvalidCoordinateRequest("missing head id".to_string())
    })?;
    if period.term_id().is_none() && period.period_end.is_none() {
        return Err(ResolveError::InvalidCoordinateRequest(
            "neither term nor period end is known".to_string(),
        ));
    }

    let partition = period
        .partition
        .or(metric.partition)
        .unwrap_or_else(|| derived_partition(metric.head_kind, metric.group, ctx.horizon));

    let dissection_group = if partition.is_dissection() {
        period.group_correction.or(metric.group.map(|g| g.id()))
    } else {
        None
    };

    Ok(ResolvedCoordinate {
        company_id,
        head_id: metric.head_id,
        is_ratio: metric.is_ratio(),
        dissection_group,
        storage_kind: storage_kind_of(partition),
        term_id: period.term_id(),
        period_end: period.period_end,
        consolidation_id: ctx.consolidation.id(),
        partition,
    })
}
