//! # Road Network
//!
//! Loads the road speed limit dataset and answers "nearest known speed limit"
//! queries through a bucketed latitude/longitude grid.

mod config;
mod index;
mod road;

pub use self::config::IndexConfig;
pub use self::index::{GridKey, RoadSamplePoint, SpatialIndex};
pub use self::road::{RoadSegment, load_roads, parse_roads};
