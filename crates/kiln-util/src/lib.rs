//! Shared utilities for the Kiln package manager.
//!
//! This crate provides cross-cutting concerns used by all other Kiln crates:
//! the unified error type, the leveled output sink used to report resolution
//! outcomes, console status lines, and small filesystem helpers.

pub mod errors;
pub mod fs;
pub mod output;
