//! Directory-backed local package cache.
//!
//! Layout under the storage root:
//!
//! ```text
//! <name>/<version>/<user>/<channel>/kilnfile.toml
//! <name>/<version>/<user>/<channel>/packages/<package_id>/kilninfo.toml
//! ```
//!
//! Unqualified references use `_` for both user and channel.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use kiln_core::config::GlobalConfig;
use kiln_core::package_info::{PackageInfo, PACKAGE_INFO_FILE};
use kiln_core::pattern::RefPattern;
use kiln_core::reference::PackageReference;
use kiln_core::search::LocalSearch;
use kiln_util::errors::KilnError;
use kiln_util::fs::{ensure_dir, subdirectories};

/// Marks an exported recipe.
pub const RECIPE_FILE: &str = "kilnfile.toml";

const PACKAGES_DIR: &str = "packages";
const UNQUALIFIED: &str = "_";

/// The local cache rooted at the configured storage path.
#[derive(Debug, Clone)]
pub struct LocalCache {
    root: PathBuf,
}

impl LocalCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_config(config: &GlobalConfig) -> Self {
        Self::new(config.storage_path())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding one exported recipe.
    pub fn reference_dir(&self, reference: &PackageReference) -> PathBuf {
        self.root
            .join(&reference.name)
            .join(&reference.version)
            .join(reference.user.as_deref().unwrap_or(UNQUALIFIED))
            .join(reference.channel.as_deref().unwrap_or(UNQUALIFIED))
    }

    pub fn contains(&self, reference: &PackageReference) -> bool {
        self.reference_dir(reference).join(RECIPE_FILE).is_file()
    }

    /// Every exported reference, sorted.
    pub fn references(&self) -> Result<Vec<PackageReference>, KilnError> {
        let mut refs = Vec::new();
        for name in subdirectories(&self.root)? {
            let name_dir = self.root.join(&name);
            for version in subdirectories(&name_dir)? {
                let version_dir = name_dir.join(&version);
                for user in subdirectories(&version_dir)? {
                    let user_dir = version_dir.join(&user);
                    for channel in subdirectories(&user_dir)? {
                        if !user_dir.join(&channel).join(RECIPE_FILE).is_file() {
                            continue;
                        }
                        let reference = PackageReference::new(name.as_str(), version.as_str());
                        refs.push(if user == UNQUALIFIED && channel == UNQUALIFIED {
                            reference
                        } else {
                            reference.with_qualifiers(user.as_str(), channel.as_str())
                        });
                    }
                }
            }
        }
        refs.sort();
        Ok(refs)
    }

    /// Exported references matching `pattern`, sorted.
    pub fn search(&self, pattern: &RefPattern) -> Result<Vec<PackageReference>, KilnError> {
        let refs: Vec<PackageReference> = self
            .references()?
            .into_iter()
            .filter(|r| pattern.matches(r))
            .collect();
        debug!(
            "{} local references match {pattern} in {}",
            refs.len(),
            self.root.display()
        );
        Ok(refs)
    }

    /// Binary packages of `reference`, keyed by package id.
    pub fn packages(
        &self,
        reference: &PackageReference,
    ) -> Result<BTreeMap<String, PackageInfo>, KilnError> {
        if !self.contains(reference) {
            return Err(KilnError::Generic {
                message: format!("Recipe '{reference}' not found in local cache"),
            });
        }
        let packages_dir = self.reference_dir(reference).join(PACKAGES_DIR);
        let mut packages = BTreeMap::new();
        for id in subdirectories(&packages_dir)? {
            let info_path = packages_dir.join(&id).join(PACKAGE_INFO_FILE);
            if !info_path.is_file() {
                debug!("package {id} of {reference} has no {PACKAGE_INFO_FILE}, skipping");
                continue;
            }
            packages.insert(id, PackageInfo::from_path(&info_path)?);
        }
        Ok(packages)
    }

    /// Store a recipe in the cache, creating directories as needed.
    pub fn export(&self, reference: &PackageReference, recipe: &str) -> Result<PathBuf, KilnError> {
        let dir = self.reference_dir(reference);
        ensure_dir(&dir)?;
        let path = dir.join(RECIPE_FILE);
        fs::write(&path, recipe)?;
        Ok(path)
    }

    /// Store a binary package record for an exported recipe.
    pub fn put_package(
        &self,
        reference: &PackageReference,
        package_id: &str,
        info: &PackageInfo,
    ) -> Result<PathBuf, KilnError> {
        if !self.contains(reference) {
            return Err(KilnError::Generic {
                message: format!("Recipe '{reference}' must be exported before adding packages"),
            });
        }
        let dir = self.reference_dir(reference).join(PACKAGES_DIR).join(package_id);
        ensure_dir(&dir)?;
        let content = toml::to_string(info).map_err(|e| KilnError::Generic {
            message: format!("Failed to serialize {PACKAGE_INFO_FILE}: {e}"),
        })?;
        let path = dir.join(PACKAGE_INFO_FILE);
        fs::write(&path, content)?;
        Ok(path)
    }
}

impl LocalSearch for LocalCache {
    fn search(&self, pattern: &RefPattern) -> Result<Vec<PackageReference>, KilnError> {
        LocalCache::search(self, pattern)
    }
}
