use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use kiln_util::errors::KilnError;

/// Environment variable overriding the Kiln home directory.
pub const KILN_HOME_ENV: &str = "KILN_HOME";

/// Global user configuration loaded from `~/.kiln/config.toml`.
///
/// ```toml
/// [storage]
/// path = "/opt/kiln/data"
///
/// [[remotes]]
/// name = "center"
/// url = "https://center.example.com"
///
/// [[remotes]]
/// name = "internal"
/// url = "https://kiln.corp.example.com"
/// username = "ci"
/// password = "s3cret"
/// verify-ssl = false
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Remotes in lookup order.
    #[serde(default)]
    pub remotes: Vec<RemoteEntry>,

    #[serde(default)]
    pub storage: StorageConfig,
}

/// One `[[remotes]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteEntry {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_verify_ssl", rename = "verify-ssl")]
    pub verify_ssl: bool,
}

fn default_verify_ssl() -> bool {
    true
}

/// Local cache settings from `[storage]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Cache root; defaults to `<kiln home>/data`.
    #[serde(default)]
    pub path: Option<String>,
}

impl GlobalConfig {
    /// Load `<kiln home>/config.toml`, or return defaults if the file doesn't exist.
    pub fn load() -> Result<Self, KilnError> {
        Self::load_from(&Self::default_path())
    }

    /// Load a config file, or return defaults if it doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self, KilnError> {
        if !path.is_file() {
            tracing::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| KilnError::Config {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        Self::parse_toml(&content)
    }

    pub fn parse_toml(content: &str) -> Result<Self, KilnError> {
        let config: Self = toml::from_str(content).map_err(|e| KilnError::Config {
            message: format!("Failed to parse global config: {e}"),
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), KilnError> {
        for (i, remote) in self.remotes.iter().enumerate() {
            if self.remotes[..i].iter().any(|r| r.name == remote.name) {
                return Err(KilnError::Config {
                    message: format!("Remote '{}' is defined more than once", remote.name),
                });
            }
        }
        Ok(())
    }

    /// Returns the default path to the global config file.
    pub fn default_path() -> PathBuf {
        kiln_home().join("config.toml")
    }

    /// Root of the local package cache.
    pub fn storage_path(&self) -> PathBuf {
        match &self.storage.path {
            Some(p) => PathBuf::from(p),
            None => kiln_home().join("data"),
        }
    }

    pub fn remote(&self, name: &str) -> Option<&RemoteEntry> {
        self.remotes.iter().find(|r| r.name == name)
    }
}

/// Returns the Kiln home directory: `$KILN_HOME`, else `~/.kiln/`.
pub fn kiln_home() -> PathBuf {
    if let Ok(home) = std::env::var(KILN_HOME_ENV) {
        if !home.is_empty() {
            return PathBuf::from(home);
        }
    }
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".kiln")
}
