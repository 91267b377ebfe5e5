pub mod keywords;
pub mod metrics;
pub mod registry;
pub mod timeseries;

pub use crate::domain::history::TrackingHistory;
pub use crate::domain::model::{
    Business, EntityKind, Keyword, PositionTier, RankObservation, RegistryEvent, TrendDirection,
};
pub use crate::domain::ports::{ChangeListener, Clock, IdGenerator, RankChecker, Storage};
pub use crate::utils::error::Result;
