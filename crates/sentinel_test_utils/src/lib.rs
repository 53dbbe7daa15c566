//! # Sentinel Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Replay builder with a carried-over roster
//! - Canned scenarios (duel, perfect spray)
//! - Property-based testing strategies for replay streams

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod strategies;

pub use fixtures::ReplayBuilder;

/// Re-export proptest for convenience.
pub use proptest;
