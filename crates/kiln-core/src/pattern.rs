//! Glob patterns over package references.
//!
//! The resolver looks up candidates with `name/*@user/channel`; the search
//! command accepts free-form globs such as `zlib*` or `*@lasote/*`.

use std::fmt;

use globset::{GlobBuilder, GlobMatcher};
use kiln_util::errors::KilnError;

use crate::reference::{qualifier_suffix, PackageReference};

/// A compiled glob over the textual form of a [`PackageReference`].
#[derive(Debug, Clone)]
pub struct RefPattern {
    text: String,
    matcher: GlobMatcher,
}

impl RefPattern {
    /// Pattern matching every version of `name` with exactly these qualifiers.
    ///
    /// `*` does not cross `/` here, so `pkg/*` never matches
    /// `pkg/1.0@user/channel`.
    pub fn versions_of(name: &str, user: Option<&str>, channel: Option<&str>) -> Result<Self, KilnError> {
        let text = format!("{name}/*{}", qualifier_suffix(user, channel));
        Self::build(text, true)
    }

    /// Free-form glob as typed by a user.
    pub fn parse(pattern: &str) -> Result<Self, KilnError> {
        Self::build(pattern.trim().to_string(), false)
    }

    fn build(text: String, literal_separator: bool) -> Result<Self, KilnError> {
        let glob = GlobBuilder::new(&text)
            .literal_separator(literal_separator)
            .build()
            .map_err(|e| KilnError::InvalidReference {
                reference: text.clone(),
                reason: format!("invalid search pattern: {e}"),
            })?;
        Ok(Self {
            matcher: glob.compile_matcher(),
            text,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn matches(&self, reference: &PackageReference) -> bool {
        self.matcher.is_match(reference.to_string())
    }
}

impl fmt::Display for RefPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
