// Adapters layer: concrete implementations of the domain ports.

pub mod clock;
pub mod ids;
pub mod listener;
pub mod rank_checker;
pub mod storage;
