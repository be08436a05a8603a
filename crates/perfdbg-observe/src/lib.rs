//! Logging setup for the perfdbg binaries.
mod logger;
pub use logger::*;
