//! Shared utilities for the sdm dependency manager.
//!
//! This crate provides cross-cutting concerns used by all other sdm crates:
//! error types, filesystem helpers, async process spawning, and terminal
//! progress indicators.

pub mod errors;
pub mod fs;
pub mod process;
pub mod progress;
