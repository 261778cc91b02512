#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tally/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cache;
pub mod classify;
pub mod company;
pub mod config;
pub mod context;
pub mod coordinate;
pub mod error;
pub mod metric;
pub mod normalize;
pub mod period;
pub mod priority;

pub use cache::DimensionCache;
pub use classify::{MetricClass, classify};
pub use company::{CompanyScope, resolve_company};
pub use config::{RatioFallback, ResolverConfig};
pub use context::{ResolutionContext, TermScope};
pub use coordinate::{ResolvedCoordinate, compose};
pub use error::{ResolveError, Result};
pub use metric::{MetricResolution, MetricResolver};
pub use normalize::DissectionNormalizer;
pub use period::{PeriodRequest, PeriodResolution, PeriodResolver, PeriodTerm};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
