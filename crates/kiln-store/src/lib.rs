//! Package storage: the on-disk local cache, remote search indexes,
//! HTTP fetching with retries and per-remote authentication.

pub mod auth;
pub mod cache;
pub mod download;
pub mod index;
pub mod remote;
