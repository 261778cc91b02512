//! Fact partitions.
//!
//! Facts are split over ten tables. Six hold plain metric values, crossing
//! the head dimension (regular or ratio) with the period horizon (standard,
//! quarterly, trailing twelve months). Four hold dissected values and carry
//! an extra dissection group column.

use crate::error::{Result, StoreError};
use crate::ids::GroupId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which head dimension a metric lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadKind {
    /// Regular metric heads
    Regular,
    /// Ratio heads
    Ratio,
}

impl HeadKind {
    /// Name of the dimension table holding heads of this kind.
    pub const fn table_name(&self) -> &'static str {
        match self {
            Self::Regular => "heads",
            Self::Ratio => "ratio_heads",
        }
    }

    /// Returns true for ratio heads.
    pub const fn is_ratio(&self) -> bool {
        matches!(self, Self::Ratio)
    }
}

impl fmt::Display for HeadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Regular => write!(f, "regular"),
            Self::Ratio => write!(f, "ratio"),
        }
    }
}

/// The period family a query targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Horizon {
    /// Reported terms (3M, 6M, 9M, 12M)
    #[default]
    Standard,
    /// Discrete quarters
    Quarterly,
    /// Trailing twelve months
    Trailing,
}

/// Storage kind of a dissection partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageKind {
    /// Dissected regular values
    Regular,
    /// Dissected ratio values
    Ratio,
    /// Dissected quarterly values
    Quarter,
    /// Dissected trailing twelve month values
    Ttm,
}

impl StorageKind {
    /// Head dimension candidates are drawn from.
    pub const fn head_kind(&self) -> HeadKind {
        match self {
            Self::Ratio => HeadKind::Ratio,
            Self::Regular | Self::Quarter | Self::Ttm => HeadKind::Regular,
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Regular => "regular",
            Self::Ratio => "ratio",
            Self::Quarter => "quarter",
            Self::Ttm => "ttm",
        };
        write!(f, "{}", name)
    }
}

/// Dissection groups with their fixed ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DissectionGroup {
    /// Per-share values (group 1)
    PerShare,
    /// Annual growth (group 2)
    AnnualGrowth,
    /// Percentage of assets (group 3)
    PercentOfAssets,
    /// Percentage of sales or revenue (group 4)
    PercentOfSales,
    /// Quarterly growth (group 5)
    QuarterlyGrowth,
}

impl DissectionGroup {
    /// Returns all groups in id order.
    pub const fn all() -> [Self; 5] {
        [
            Self::PerShare,
            Self::AnnualGrowth,
            Self::PercentOfAssets,
            Self::PercentOfSales,
            Self::QuarterlyGrowth,
        ]
    }

    /// Returns the stored group id.
    pub const fn id(&self) -> GroupId {
        match self {
            Self::PerShare => GroupId(1),
            Self::AnnualGrowth => GroupId(2),
            Self::PercentOfAssets => GroupId(3),
            Self::PercentOfSales => GroupId(4),
            Self::QuarterlyGrowth => GroupId(5),
        }
    }

    /// Parse a group from its stored id.
    pub const fn from_id(id: GroupId) -> Option<Self> {
        match id.0 {
            1 => Some(Self::PerShare),
            2 => Some(Self::AnnualGrowth),
            3 => Some(Self::PercentOfAssets),
            4 => Some(Self::PercentOfSales),
            5 => Some(Self::QuarterlyGrowth),
            _ => None,
        }
    }

    /// Storage kind implied by the group.
    pub const fn storage_kind(&self) -> StorageKind {
        match self {
            Self::PerShare => StorageKind::Regular,
            Self::AnnualGrowth | Self::PercentOfAssets | Self::PercentOfSales => StorageKind::Ratio,
            Self::QuarterlyGrowth => StorageKind::Quarter,
        }
    }

    /// Returns the group name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::PerShare => "Per Share",
            Self::AnnualGrowth => "Annual Growth",
            Self::PercentOfAssets => "% of Asset",
            Self::PercentOfSales => "% of Sales/Revenue",
            Self::QuarterlyGrowth => "Quarterly Growth",
        }
    }
}

impl fmt::Display for DissectionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One of the ten fact tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Partition {
    /// Plain facts, keyed by head kind and horizon
    Fact {
        /// Head dimension
        kind: HeadKind,
        /// Period horizon
        horizon: Horizon,
    },
    /// Dissected facts, keyed additionally by group id
    Dissection(StorageKind),
}

impl Partition {
    /// Plain partition for the given head kind and horizon.
    pub const fn fact(kind: HeadKind, horizon: Horizon) -> Self {
        Self::Fact { kind, horizon }
    }

    /// Returns all ten partitions.
    pub const fn all() -> [Self; 10] {
        [
            Self::fact(HeadKind::Regular, Horizon::Standard),
            Self::fact(HeadKind::Regular, Horizon::Quarterly),
            Self::fact(HeadKind::Regular, Horizon::Trailing),
            Self::fact(HeadKind::Ratio, Horizon::Standard),
            Self::fact(HeadKind::Ratio, Horizon::Quarterly),
            Self::fact(HeadKind::Ratio, Horizon::Trailing),
            Self::Dissection(StorageKind::Regular),
            Self::Dissection(StorageKind::Ratio),
            Self::Dissection(StorageKind::Quarter),
            Self::Dissection(StorageKind::Ttm),
        ]
    }

    /// Name of the backing table.
    pub const fn table_name(&self) -> &'static str {
        match self {
            Self::Fact { kind: HeadKind::Regular, horizon: Horizon::Standard } => "facts",
            Self::Fact { kind: HeadKind::Regular, horizon: Horizon::Quarterly } => "facts_quarterly",
            Self::Fact { kind: HeadKind::Regular, horizon: Horizon::Trailing } => "facts_ttm",
            Self::Fact { kind: HeadKind::Ratio, horizon: Horizon::Standard } => "ratio_facts",
            Self::Fact { kind: HeadKind::Ratio, horizon: Horizon::Quarterly } => {
                "ratio_facts_quarterly"
            }
            Self::Fact { kind: HeadKind::Ratio, horizon: Horizon::Trailing } => "ratio_facts_ttm",
            Self::Dissection(StorageKind::Regular) => "dissection_facts",
            Self::Dissection(StorageKind::Ratio) => "dissection_facts_ratio",
            Self::Dissection(StorageKind::Quarter) => "dissection_facts_quarterly",
            Self::Dissection(StorageKind::Ttm) => "dissection_facts_ttm",
        }
    }

    /// Parse a partition from its table name.
    pub fn from_table_name(name: &str) -> Result<Self> {
        Self::all()
            .into_iter()
            .find(|p| p.table_name() == name)
            .ok_or_else(|| StoreError::UnknownTable(name.to_string()))
    }

    /// Head dimension the partition's head ids refer to.
    pub const fn head_kind(&self) -> HeadKind {
        match self {
            Self::Fact { kind, .. } => *kind,
            Self::Dissection(storage) => storage.head_kind(),
        }
    }

    /// Returns true for the four dissection partitions.
    pub const fn is_dissection(&self) -> bool {
        matches!(self, Self::Dissection(_))
    }

    /// Returns true for partitions holding discrete quarters.
    pub const fn is_quarterly(&self) -> bool {
        matches!(
            self,
            Self::Fact { horizon: Horizon::Quarterly, .. } | Self::Dissection(StorageKind::Quarter)
        )
    }

    /// Returns true for trailing twelve month partitions.
    pub const fn is_trailing(&self) -> bool {
        matches!(
            self,
            Self::Fact { horizon: Horizon::Trailing, .. } | Self::Dissection(StorageKind::Ttm)
        )
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.table_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_table_names_are_unique() {
        let names: HashSet<_> = Partition::all().iter().map(|p| p.table_name()).collect();
        assert_eq!(names.len(), 10);
    }

    #[test]
    fn test_from_table_name() {
        assert_eq!(
            Partition::from_table_name("ratio_facts_ttm").unwrap(),
            Partition::fact(HeadKind::Ratio, Horizon::Trailing)
        );
        assert!(Partition::from_table_name("quotes").is_err());
    }

    #[test]
    fn test_group_storage_kinds() {
        assert_eq!(DissectionGroup::PerShare.storage_kind(), StorageKind::Regular);
        assert_eq!(DissectionGroup::AnnualGrowth.storage_kind(), StorageKind::Ratio);
        assert_eq!(DissectionGroup::PercentOfAssets.storage_kind(), StorageKind::Ratio);
        assert_eq!(DissectionGroup::PercentOfSales.storage_kind(), StorageKind::Ratio);
        assert_eq!(DissectionGroup::QuarterlyGrowth.storage_kind(), StorageKind::Quarter);
    }

    #[test]
    fn test_group_ids() {
        for group in DissectionGroup::all() {
            assert_eq!(DissectionGroup::from_id(group.id()), Some(group));
        }
        assert_eq!(DissectionGroup::from_id(GroupId(6)), None);
    }

    #[test]
    fn test_dissection_head_kind() {
        assert_eq!(Partition::Dissection(StorageKind::Ratio).head_kind(), HeadKind::Ratio);
        assert_eq!(Partition::Dissection(StorageKind::Quarter).head_kind(), HeadKind::Regular);
        assert!(Partition::Dissection(StorageKind::Ttm).is_trailing());
    }
}
