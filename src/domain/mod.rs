// Domain layer: entity models and the ports (traits) the pipeline stages meet at.

pub mod model;
pub mod ports;
