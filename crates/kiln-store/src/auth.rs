//! Remote authentication using credentials from the global config.
//!
//! ```toml
//! [[remotes]]
//! name = "internal"
//! url = "https://kiln.corp.example.com"
//! username = "ci"
//! password = "s3cret"
//! ```
//!
//! A password without a username is sent as a bearer token.

use reqwest::blocking::RequestBuilder;

use crate::remote::Remote;

/// Apply authentication to a request if the remote has credentials.
pub fn apply_auth(request: RequestBuilder, remote: &Remote) -> RequestBuilder {
    match (&remote.username, &remote.password) {
        (Some(user), Some(pass)) => request.basic_auth(user, Some(pass)),
        (Some(user), None) => request.basic_auth(user, None::<&str>),
        (None, Some(token)) => request.bearer_auth(token),
        (None, None) => request,
    }
}
