// Domain layer: catalog and booking models plus the ports the core talks through.

pub mod model;
pub mod ports;
