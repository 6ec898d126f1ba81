//! Synthlog library crate.
//!
//! Exposes the category pool, event generators, sinks and the supervisor that
//! runs them for the CLI.

pub mod core;
pub mod formats;
pub mod logging;
pub mod sources;
pub mod supervisor;

pub use crate::core::clock;
pub use crate::core::config;
pub use crate::core::event;
pub use crate::core::pool;
pub use crate::core::traits;
