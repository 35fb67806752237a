//! Version-range resolution: binds requirements written with a version range
//! to the highest satisfying version, local cache first, remotes second.

pub mod range_resolver;
pub mod version;
