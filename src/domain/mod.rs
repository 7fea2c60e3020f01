// Domain layer: form models and the ports (capabilities) the core depends on.

pub mod model;
pub mod ports;
