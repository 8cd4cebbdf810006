//! # Realtime Core
//!
//! Core modules shared by the speeding detection crates: the error taxonomy
//! and the host-provided interfaces (clock, publisher).

mod error;
mod provider;

pub use crate::error::*;
pub use crate::provider::*;
