//! Core data types for the Kiln package manager.
//!
//! This crate defines the types shared by the resolver, the query filter and
//! the storage layer: package references (`name/version@user/channel`),
//! requirements as a tagged variant, reference search patterns, package
//! configuration records, the candidate lookup traits the resolver consumes,
//! and the global configuration file.
//!
//! This crate is intentionally free of network I/O.

pub mod config;
pub mod package_info;
pub mod pattern;
pub mod reference;
pub mod requirement;
pub mod search;
