//! # HFP Adapter
//!
//! Consumes HSL High-Frequency Positioning (HFP) vehicle position messages,
//! matches each position against the road speed limit index and derives
//! speeding episodes and UI events from them.

mod events;
mod hfp;
mod ingest;
mod operators;
mod subscription;

pub use self::events::*;
pub use self::hfp::*;
pub use self::ingest::*;
pub use self::operators::operator_name;
pub use self::subscription::*;
