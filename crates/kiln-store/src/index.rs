//! Remote search indexes.
//!
//! A remote answers `GET {url}/v1/conans/search?q=<pattern>` with
//!
//! ```json
//! {"results": ["zlib/1.2.11@lasote/stable", "zlib/1.2.13"]}
//! ```
//!
//! A 404 means the remote knows no matching reference.

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use kiln_core::config::GlobalConfig;
use kiln_core::pattern::RefPattern;
use kiln_core::reference::PackageReference;
use kiln_core::search::RemoteSearch;
use kiln_util::errors::KilnError;

use crate::download;
use crate::remote::Remote;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<String>,
}

/// Search client for one remote.
#[derive(Debug, Clone)]
pub struct RemoteIndex {
    remote: Remote,
    client: Client,
}

impl RemoteIndex {
    pub fn new(remote: Remote) -> Result<Self, KilnError> {
        let client = download::build_client(&remote)?;
        Ok(Self { remote, client })
    }

    pub fn name(&self) -> &str {
        &self.remote.name
    }

    pub fn remote(&self) -> &Remote {
        &self.remote
    }

    /// References on this remote matching `pattern`, sorted.
    pub fn search(&self, pattern: &RefPattern) -> Result<Vec<PackageReference>, KilnError> {
        debug!("searching remote '{}' for {pattern}", self.remote.name);
        let body = download::fetch_text(
            &self.client,
            &self.remote,
            &self.remote.search_url(),
            &[("q", pattern.as_str())],
        )?;
        match body {
            Some(body) => parse_search_response(&body, pattern, &self.remote.name),
            None => Ok(Vec::new()),
        }
    }
}

/// Decode a search response, keeping only well-formed references that match
/// `pattern`.
pub fn parse_search_response(
    body: &str,
    pattern: &RefPattern,
    remote: &str,
) -> Result<Vec<PackageReference>, KilnError> {
    let response: SearchResponse = serde_json::from_str(body).map_err(|e| KilnError::Network {
        message: format!("Invalid search response from remote '{remote}': {e}"),
    })?;

    let mut refs = Vec::new();
    for text in &response.results {
        match PackageReference::parse(text) {
            Ok(r) if pattern.matches(&r) => refs.push(r),
            Ok(_) => {}
            Err(e) => warn!("remote '{remote}' returned an invalid reference: {e}"),
        }
    }
    refs.sort();
    refs.dedup();
    Ok(refs)
}

/// Every configured remote, in lookup order.
#[derive(Debug, Clone, Default)]
pub struct RemoteSet {
    indexes: Vec<RemoteIndex>,
}

impl RemoteSet {
    pub fn new(indexes: Vec<RemoteIndex>) -> Self {
        Self { indexes }
    }

    pub fn from_config(config: &GlobalConfig) -> Result<Self, KilnError> {
        let indexes = config
            .remotes
            .iter()
            .map(|entry| RemoteIndex::new(Remote::from_entry(entry)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { indexes })
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    pub fn remotes(&self) -> impl Iterator<Item = &Remote> {
        self.indexes.iter().map(RemoteIndex::remote)
    }

    pub fn get(&self, name: &str) -> Result<&RemoteIndex, KilnError> {
        self.indexes
            .iter()
            .find(|index| index.name() == name)
            .ok_or_else(|| KilnError::Config {
                message: format!("Remote '{name}' is not configured"),
            })
    }
}

impl RemoteSearch for RemoteSet {
    /// Search only `remote` when given, otherwise the first remote with a
    /// non-empty answer.
    fn search_remotes(
        &self,
        pattern: &RefPattern,
        remote: Option<&str>,
    ) -> Result<Vec<PackageReference>, KilnError> {
        if let Some(name) = remote {
            return self.get(name)?.search(pattern);
        }
        for index in &self.indexes {
            let found = index.search(pattern)?;
            if !found.is_empty() {
                return Ok(found);
            }
        }
        Ok(Vec::new())
    }
}
