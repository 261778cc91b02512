//! Read surface of the fact store.

use crate::dimensions::Dimensions;
use crate::error::Result;
use crate::filter::{FactFilter, FactRecord, PeriodRow};
use crate::partition::Partition;
use polars::prelude::DataFrame;

/// Read access to dimensions and fact partitions.
///
/// Implementations must be safe to share between threads; every method is an
/// idempotent read.
pub trait FactStore: Send + Sync {
    /// Load a full snapshot of every dimension table.
    fn load_dimensions(&self) -> Result<Dimensions>;

    /// Count rows in `partition` matching `filter`.
    fn count_facts(&self, partition: Partition, filter: &FactFilter) -> Result<u64>;

    /// Whether any row in `partition` matches `filter`.
    fn has_facts(&self, partition: Partition, filter: &FactFilter) -> Result<bool> {
        Ok(self.count_facts(partition, filter)? > 0)
    }

    /// Distinct period at `offset` when matching rows are ordered by period
    /// end, newest first. Offset 0 is the most recent period.
    fn period_at(
        &self,
        partition: Partition,
        filter: &FactFilter,
        offset: usize,
    ) -> Result<Option<PeriodRow>>;

    /// Newest row in `partition` matching `filter`, joined with its labels.
    fn fetch_fact(&self, partition: Partition, filter: &FactFilter) -> Result<Option<FactRecord>>;

    /// All matching rows ordered by period end, as a frame with columns
    /// `period_end` (Date), `term` and `value`.
    fn fact_series(&self, partition: Partition, filter: &FactFilter) -> Result<DataFrame>;
}
