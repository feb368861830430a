//! Core contracts for newsdash.
//!
//! This crate contains:
//! - Record model and lenient parsing
//! - Dataset loading and the load-once cache
//! - Filter pipeline and sentiment aggregation
//! - Dashboard view assembly and the interactive session
//! - Response envelope and configuration

pub mod aggregate;
pub mod config;
pub mod dashboard;
pub mod dataset;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod filter;
pub mod session;

pub use aggregate::{annual_trend, yearly_summary, LabelShare, TrendPoint, YearlySummary};
pub use config::{ConfigOverrides, DashboardConfig};
pub use dashboard::{DashboardView, DisplayRow, RecordDetail, Selection, DISPLAY_COLUMNS};
pub use dataset::{Dataset, DatasetCache, FilterOptions};
pub use domain::{columns, NewsDate, Record, Symbol, UtcDateTime};
pub use envelope::{Envelope, EnvelopeError, EnvelopeMeta, SCHEMA_VERSION};
pub use error::{LoadError, ValidationError};
pub use filter::{
    apply, FilterParams, FilterResult, FilterSpec, ResolvedFilter, ScoreRange,
    DEFAULT_TABLE_LIMIT,
};
pub use newsdash_warehouse::{SourceFormat, WarehouseError};
pub use session::{ExploreSession, SessionCommand, SessionError, SessionOutcome};
