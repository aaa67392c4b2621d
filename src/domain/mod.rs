// Domain layer: records, derived views, and the ports implemented by adapters.

pub mod model;
pub mod ports;
pub mod report;
pub mod status;
pub mod views;
