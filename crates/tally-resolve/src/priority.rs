//! Declarative search priorities.
//!
//! One table decides which head dimensions a metric is searched in and which
//! partitions confirm that a candidate has data.

use crate::classify::MetricClass;
use tally_store::{DissectionGroup, HeadKind, Horizon, Partition, StorageKind};

/// Search behavior bucket derived from a metric classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchClass {
    /// Ratio vocabulary
    Ratio,
    /// Regular or unclassified metric
    Regular,
    /// Dissected metric stored against ratio heads
    DissectionRatio,
    /// Dissected metric stored against regular heads
    DissectionRegular,
}

impl SearchClass {
    /// Search class for a classification.
    pub const fn of(class: &MetricClass) -> Self {
        match class {
            MetricClass::Dissection { kind, .. } => match kind.head_kind() {
                HeadKind::Ratio => Self::DissectionRatio,
                HeadKind::Regular => Self::DissectionRegular,
            },
            MetricClass::Ratio => Self::Ratio,
            MetricClass::Unknown => Self::Regular,
        }
    }
}

/// One row of the priority table.
#[derive(Debug, Clone, Copy)]
pub struct SearchPlan {
    /// Class the row applies to
    pub class: SearchClass,
    /// Dimension searched first
    pub primary: HeadKind,
    /// Dimension searched when the fallback policy allows it
    pub fallback: Option<HeadKind>,
}

static PRIORITY_TABLE: &[SearchPlan] = &[
    SearchPlan { class: SearchClass::Ratio, primary: HeadKind::Ratio, fallback: None },
    SearchPlan {
        class: SearchClass::Regular,
        primary: HeadKind::Regular,
        fallback: Some(HeadKind::Ratio),
    },
    SearchPlan { class: SearchClass::DissectionRatio, primary: HeadKind::Ratio, fallback: None },
    SearchPlan {
        class: SearchClass::DissectionRegular,
        primary: HeadKind::Regular,
        fallback: None,
    },
];

/// Look up the search plan for a class.
pub fn plan_for(class: SearchClass) -> SearchPlan {
    PRIORITY_TABLE
        .iter()
        .find(|p| p.class == class)
        .copied()
        .unwrap_or(SearchPlan { class, primary: HeadKind::Regular, fallback: None })
}

/// Partitions that confirm a candidate has data, in search order.
///
/// Plain metrics check the partition for the horizon and, for the standard
/// and trailing horizons, one neighbor. Dissected metrics check the partition
/// for their storage kind, preceded by the quarter or trailing partition
/// when the horizon asks for one.
pub fn validation_partitions(
    kind: HeadKind,
    group: Option<DissectionGroup>,
    horizon: Horizon,
) -> Vec<Partition> {
    match group {
        None => match horizon {
            Horizon::Standard => vec![
                Partition::fact(kind, Horizon::Standard),
                Partition::fact(kind, Horizon::Quarterly),
            ],
            Horizon::Quarterly => vec![Partition::fact(kind, Horizon::Quarterly)],
            Horizon::Trailing => vec![
                Partition::fact(kind, Horizon::Trailing),
                Partition::fact(kind, Horizon::Standard),
            ],
        },
        Some(group) => {
            let home = Partition::Dissection(group.storage_kind());
            let lead = match horizon {
                Horizon::Standard => None,
                Horizon::Quarterly => Some(Partition::Dissection(StorageKind::Quarter)),
                Horizon::Trailing => Some(Partition::Dissection(StorageKind::Ttm)),
            };
            match lead {
                Some(lead) if lead != home => vec![lead, home],
                _ => vec![home],
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_never_searches_regular() {
        let plan = plan_for(SearchClass::Ratio);
        assert_eq!(plan.primary, HeadKind::Ratio);
        assert_eq!(plan.fallback, None);
    }

    #[test]
    fn test_regular_falls_back_to_ratio() {
        let plan = plan_for(SearchClass::Regular);
        assert_eq!(plan.primary, HeadKind::Regular);
        assert_eq!(plan.fallback, Some(HeadKind::Ratio));
    }

    #[test]
    fn test_search_class_of_dissection() {
        let per_share = MetricClass::Dissection {
            group: DissectionGroup::PerShare,
            kind: StorageKind::Regular,
        };
        let of_assets = MetricClass::Dissection {
            group: DissectionGroup::PercentOfAssets,
            kind: StorageKind::Ratio,
        };
        assert_eq!(SearchClass::of(&per_share), SearchClass::DissectionRegular);
        assert_eq!(SearchClass::of(&of_assets), SearchClass::DissectionRatio);
        assert_eq!(SearchClass::of(&MetricClass::Unknown), SearchClass::Regular);
    }

    #[test]
    fn test_plain_validation_partitions() {
        assert_eq!(
            validation_partitions(HeadKind::Ratio, None, Horizon::Trailing),
            vec![
                Partition::fact(HeadKind::Ratio, Horizon::Trailing),
                Partition::fact(HeadKind::Ratio, Horizon::Standard),
            ]
        );
        assert_eq!(
            validation_partitions(HeadKind::Regular, None, Horizon::Quarterly),
            vec![Partition::fact(HeadKind::Regular, Horizon::Quarterly)]
        );
    }

    #[test]
    fn test_dissection_validation_partitions() {
        assert_eq!(
            validation_partitions(HeadKind::Regular, Some(DissectionGroup::PerShare), Horizon::Standard),
            vec![Partition::Dissection(StorageKind::Regular)]
        );
        assert_eq!(
            validation_partitions(
                HeadKind::Regular,
                Some(DissectionGroup::QuarterlyGrowth),
                Horizon::Quarterly
            ),
            vec![Partition::Dissection(StorageKind::Quarter)]
        );
        assert_eq!(
            validation_partitions(HeadKind::Ratio, Some(DissectionGroup::AnnualGrowth), Horizon::Trailing),
            vec![
                Partition::Dissection(StorageKind::Ttm),
                Partition::Dissection(StorageKind::Ratio),
            ]
        );
    }
}
