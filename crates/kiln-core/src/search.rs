//! Candidate lookups consumed by the range resolver.
//!
//! Implementations live in `kiln-store`; tests provide in-memory ones.

use kiln_util::errors::KilnError;

use crate::pattern::RefPattern;
use crate::reference::PackageReference;

/// Lists references stored in the local cache.
pub trait LocalSearch {
    /// All cached references matching `pattern`. Nothing found is `Ok(vec![])`.
    fn search(&self, pattern: &RefPattern) -> Result<Vec<PackageReference>, KilnError>;
}

/// Lists references known to the configured remotes.
pub trait RemoteSearch {
    /// References matching `pattern`, from `remote` only when given.
    ///
    /// May perform network I/O; connectivity failures are returned as errors.
    fn search_remotes(
        &self,
        pattern: &RefPattern,
        remote: Option<&str>,
    ) -> Result<Vec<PackageReference>, KilnError>;
}

impl<T: LocalSearch + ?Sized> LocalSearch for &T {
    fn search(&self, pattern: &RefPattern) -> Result<Vec<PackageReference>, KilnError> {
        (**self).search(pattern)
    }
}

impl<T: RemoteSearch + ?Sized> RemoteSearch for &T {
    fn search_remotes(
        &self,
        pattern: &RefPattern,
        remote: Option<&str>,
    ) -> Result<Vec<PackageReference>, KilnError> {
        (**self).search_remotes(pattern, remote)
    }
}
