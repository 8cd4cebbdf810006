//! # Speeding
//!
//! Turns a stream of per-vehicle position samples into speeding episodes.
//!
//! [`EpisodeTracker`] owns only the live working copy of each episode and
//! reports every update as a [`Transition`]. Keeping committed episodes after
//! the vehicle slows down is the consumer's job; [`EpisodeArchive`] is the
//! store it uses for that.

mod archive;
mod config;
mod episode;
mod tracker;

pub use self::archive::*;
pub use self::config::TrackerConfig;
pub use self::episode::*;
pub use self::tracker::*;
