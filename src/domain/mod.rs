// Domain layer: case and stats models plus the ports the crawl is written against.

pub mod model;
pub mod ports;
