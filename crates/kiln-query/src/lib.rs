//! Query expressions over package configuration records.
//!
//! Expressions such as `os=Windows AND (arch=x86 OR options.shared=True)`
//! are compiled once into a [`PostfixProgram`](program::PostfixProgram) and
//! evaluated against any number of records.

pub mod errors;
pub mod filter;
pub mod program;

pub use errors::QueryError;
pub use filter::{filter_packages, matches_record};
pub use program::{PostfixProgram, Token};
