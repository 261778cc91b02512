#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tally/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod engine;
pub mod export;
pub mod report;

// Re-export main types from sub-crates
pub use tally_resolve as resolve;
pub use tally_store as store;

pub use engine::{Answer, Engine, MetricInterpretation, QueryRequest};
pub use report::{AnswerFormat, ReportError, render};
pub use tally_resolve::{ResolveError, ResolvedCoordinate, ResolverConfig};
pub use tally_store::{Consolidation, SqliteStore};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
