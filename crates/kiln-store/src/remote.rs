//! Remote abstraction: URL layout and credentials.

use kiln_core::config::RemoteEntry;

/// A configured remote with optional credentials.
#[derive(Debug, Clone)]
pub struct Remote {
    pub name: String,
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub verify_ssl: bool,
}

impl Remote {
    pub fn new(name: impl Into<String>, url: &str) -> Self {
        Self {
            name: name.into(),
            url: url.trim_end_matches('/').to_string(),
            username: None,
            password: None,
            verify_ssl: true,
        }
    }

    /// Build a `Remote` from a `[[remotes]]` config entry.
    pub fn from_entry(entry: &RemoteEntry) -> Self {
        Self {
            username: entry.username.clone(),
            password: entry.password.clone(),
            verify_ssl: entry.verify_ssl,
            ..Self::new(entry.name.clone(), &entry.url)
        }
    }

    /// Endpoint listing references that match a pattern (`?q=<pattern>`).
    pub fn search_url(&self) -> String {
        format!("{}/v1/conans/search", self.url)
    }

    /// Whether this remote has authentication configured.
    pub fn has_auth(&self) -> bool {
        self.username.is_some() || self.password.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_url_trims_trailing_slash() {
        let remote = Remote::new("center", "https://center.example.com/");
        assert_eq!(
            remote.search_url(),
            "https://center.example.com/v1/conans/search"
        );
    }

    #[test]
    fn from_entry_copies_credentials() {
        let entry = RemoteEntry {
            name: "internal".to_string(),
            url: "https://kiln.corp.example.com".to_string(),
            username: Some("ci".to_string()),
            password: Some("s3cret".to_string()),
            verify_ssl: false,
        };
        let remote = Remote::from_entry(&entry);
        assert_eq!(remote.name, "internal");
        assert!(remote.has_auth());
        assert!(!remote.verify_ssl);
    }

    #[test]
    fn new_remote_has_no_auth() {
        let remote = Remote::new("center", "https://center.example.com");
        assert!(!remote.has_auth());
        assert!(remote.verify_ssl);
    }
}
