#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tally/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod consolidation;
pub mod dimensions;
pub mod error;
pub mod filter;
pub mod ids;
pub mod import;
pub mod partition;
pub mod sqlite;
pub mod store;

pub use consolidation::Consolidation;
pub use dimensions::Dimensions;
pub use error::{Result, StoreError};
pub use filter::{FactFilter, FactRecord, FactRow, PeriodRow};
pub use ids::{CompanyId, ConsolidationId, GroupId, HeadId, IndustryId, SectorId, TermId, UnitId};
pub use partition::{DissectionGroup, HeadKind, Horizon, Partition, StorageKind};
pub use sqlite::SqliteStore;
pub use store::FactStore;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
