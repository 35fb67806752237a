//! Binds version-range requirements to concrete references.
//!
//! For each requirement written with a range, the resolver lists every
//! version of the package with the same `user/channel`, keeps the ones inside
//! the range and binds the highest. The local cache is asked first; remotes
//! are only queried when nothing cached fits (or first, in update mode).
//! Candidate lists are built per call and never cached.

use std::fmt;

use tracing::{debug, warn};

use kiln_core::reference::PackageReference;
use kiln_core::requirement::{RangeRequirement, Requirement};
use kiln_core::search::{LocalSearch, RemoteSearch};
use kiln_util::errors::KilnError;
use kiln_util::output::Output;

use crate::version::VersionRange;

/// Where a candidate version was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locality {
    LocalCache,
    RemoteIndex,
}

impl fmt::Display for Locality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locality::LocalCache => f.write_str("local cache"),
            Locality::RemoteIndex => f.write_str("remote"),
        }
    }
}

/// One concrete version found for a package name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub reference: PackageReference,
    pub locality: Locality,
}

/// Knobs for a resolution pass.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Ask remotes before the local cache, so newer remote versions win.
    pub update: bool,
    /// Only query this remote.
    pub remote: Option<String>,
}

/// What [`RangeResolver::resolve`] did to a requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Pinned or already resolved; nothing was looked up.
    Unchanged,
    /// The range was bound to a candidate.
    Bound {
        reference: PackageReference,
        locality: Locality,
    },
    /// An overridden reference was checked against its range.
    Validated {
        reference: PackageReference,
        satisfied: bool,
    },
}

/// Resolves version ranges against a local cache and a set of remotes.
pub struct RangeResolver<'o, L, R> {
    local: L,
    remote: R,
    output: &'o dyn Output,
}

impl<'o, L: LocalSearch, R: RemoteSearch> RangeResolver<'o, L, R> {
    pub fn new(local: L, remote: R, output: &'o dyn Output) -> Self {
        Self {
            local,
            remote,
            output,
        }
    }

    /// Resolve one requirement declared by `requester`.
    ///
    /// A `Range` becomes `Resolved` on success. `Pinned` and `Resolved`
    /// requirements are left alone. An `Overridden` requirement is only
    /// validated: a reference outside the range is reported as a warning.
    pub fn resolve(
        &self,
        requirement: &mut Requirement,
        requester: &str,
        options: &ResolveOptions,
    ) -> Result<Resolution, KilnError> {
        match requirement {
            Requirement::Pinned(_) | Requirement::Resolved { .. } => Ok(Resolution::Unchanged),
            Requirement::Overridden { range, reference } => {
                self.validate(range, reference, requester)
            }
            Requirement::Range(range) => {
                let range = range.clone();
                let candidate = self.find(&range, requester, options)?;
                self.output.success(&format!(
                    "Version range '{}' required by '{}' resolved to '{}'",
                    range.range, requester, candidate.reference
                ));
                *requirement = Requirement::Resolved {
                    range,
                    reference: candidate.reference.clone(),
                };
                Ok(Resolution::Bound {
                    reference: candidate.reference,
                    locality: candidate.locality,
                })
            }
        }
    }

    /// Resolve every requirement of `requester`, continuing past failures.
    ///
    /// Results are returned in input order; the caller decides whether a
    /// failed edge aborts the whole graph.
    pub fn resolve_all<'r, I>(
        &self,
        requirements: I,
        requester: &str,
        options: &ResolveOptions,
    ) -> Vec<Result<Resolution, KilnError>>
    where
        I: IntoIterator<Item = &'r mut Requirement>,
    {
        requirements
            .into_iter()
            .map(|req| self.resolve(req, requester, options))
            .collect()
    }

    fn validate(
        &self,
        range: &RangeRequirement,
        reference: &PackageReference,
        requester: &str,
    ) -> Result<Resolution, KilnError> {
        let version_range = VersionRange::parse(&range.range)?;
        let selection = version_range.max_satisfying([reference.version.as_str()]);
        for bad in &selection.invalid {
            self.skip_invalid(bad);
        }
        let satisfied = selection.best.is_some();
        if satisfied {
            self.output.success(&format!(
                "Version range '{}' required by '{}' valid for downstream requirement '{}'",
                range.range, requester, reference
            ));
        } else {
            self.output.warn(&format!(
                "Version range '{}' required by '{}' not valid for downstream requirement '{}'",
                range.range, requester, reference
            ));
        }
        Ok(Resolution::Validated {
            reference: reference.clone(),
            satisfied,
        })
    }

    fn find(
        &self,
        range: &RangeRequirement,
        requester: &str,
        options: &ResolveOptions,
    ) -> Result<Candidate, KilnError> {
        let version_range = VersionRange::parse(&range.range)?;
        let pattern = range.search_pattern()?;

        let order = if options.update {
            [Locality::RemoteIndex, Locality::LocalCache]
        } else {
            [Locality::LocalCache, Locality::RemoteIndex]
        };

        for locality in order {
            let found = match locality {
                Locality::LocalCache => self.local.search(&pattern)?,
                Locality::RemoteIndex => {
                    self.output.info(&format!("remotes for '{range}'"));
                    self.remote
                        .search_remotes(&pattern, options.remote.as_deref())?
                }
            };
            debug!("{} candidates for {pattern} in {locality}", found.len());

            let versions: Vec<String> = found
                .into_iter()
                .filter(|r| r.name == range.name && r.user == range.user && r.channel == range.channel)
                .map(|r| r.version)
                .collect();
            if let Some(version) = self.select(&version_range, &versions) {
                return Ok(Candidate {
                    reference: range.bind(version),
                    locality,
                });
            }
        }

        Err(KilnError::UnsatisfiableRange {
            range: range.range.clone(),
            requirement: range.to_string(),
            requester: requester.to_string(),
        })
    }

    /// Highest version inside the range, warning about unparsable ones.
    fn select<'v>(&self, version_range: &VersionRange, versions: &'v [String]) -> Option<&'v str> {
        if versions.is_empty() {
            return None;
        }
        let selection = version_range.max_satisfying(versions.iter().map(String::as_str));
        for bad in &selection.invalid {
            self.skip_invalid(bad);
        }
        selection.best
    }

    fn skip_invalid(&self, version: &str) {
        warn!("skipping non-semver version '{version}'");
        self.output.warn(&format!(
            "Version '{version}' is not semver, cannot be compared with a range"
        ));
    }
}
