pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TrackerConfig;

pub use adapters::{
    clock::{ManualClock, SystemClock},
    ids::{SequentialIdGenerator, UuidIdGenerator},
    listener::TracingListener,
    rank_checker::SimulatedRankChecker,
    storage::LocalStorage,
};
pub use crate::app::{
    report::{ReportFormat, ReportWriter},
    tracking::AutoTracker,
};
pub use crate::core::{
    metrics::{BusinessStats, KeywordRollup, KeywordSummary},
    registry::RankRegistry,
    timeseries::{AlignOptions, AlignedRow, AlignedSeries},
};
pub use domain::model::{Business, Keyword, PositionTier, RankObservation, TrendDirection};
pub use utils::error::{RankError, Result};
