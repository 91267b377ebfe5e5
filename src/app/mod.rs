// Application layer: drivers and outputs built on top of the registry.

pub mod report;
pub mod seed;
pub mod tracking;
