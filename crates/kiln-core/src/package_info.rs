use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use kiln_util::errors::KilnError;

/// File name of a binary package's configuration record.
pub const PACKAGE_INFO_FILE: &str = "kilninfo.toml";

/// Settings and options a binary package was built with (`kilninfo.toml`).
///
/// ```toml
/// [settings]
/// os = "Windows"
/// "compiler.version" = "17"
///
/// [options]
/// shared = "False"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    #[serde(default)]
    pub settings: BTreeMap<String, String>,
    #[serde(default)]
    pub options: BTreeMap<String, String>,
    #[serde(default)]
    pub requires: Vec<String>,
}

impl PackageInfo {
    pub fn setting(&self, key: &str) -> Option<&str> {
        self.settings.get(key).map(String::as_str)
    }

    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    pub fn parse_toml(content: &str) -> Result<Self, KilnError> {
        toml::from_str(content).map_err(|e| KilnError::Generic {
            message: format!("Failed to parse {PACKAGE_INFO_FILE}: {e}"),
        })
    }

    pub fn from_path(path: &Path) -> Result<Self, KilnError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content).map_err(|e| KilnError::Generic {
            message: format!("{}: {e}", path.display()),
        })
    }
}
