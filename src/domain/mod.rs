// Domain layer: core models and ports (interfaces). No browser code here.

pub mod model;
pub mod ports;
