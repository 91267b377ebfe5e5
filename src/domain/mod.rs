// Domain layer: entities, the append-only observation history and ports (interfaces).

pub mod history;
pub mod model;
pub mod ports;
