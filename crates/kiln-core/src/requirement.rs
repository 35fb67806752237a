//! Dependency edges as a tagged variant.
//!
//! A requirement is either pinned to a concrete reference or constrained by a
//! version range written `name/[range]@user/channel`. Range requirements move
//! through `Range` → `Resolved` when the resolver binds them, or are fixed
//! ahead of time by a downstream override (`Overridden`), in which case the
//! resolver only checks the bound reference against the range.

use std::fmt;
use std::str::FromStr;

use kiln_util::errors::KilnError;

use crate::pattern::RefPattern;
use crate::reference::{qualifier_suffix, split_reference, PackageReference};

/// The range part of a requirement: name, range expression and qualifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeRequirement {
    pub name: String,
    pub range: String,
    pub user: Option<String>,
    pub channel: Option<String>,
}

impl RangeRequirement {
    pub fn new(name: impl Into<String>, range: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            range: range.into(),
            user: None,
            channel: None,
        }
    }

    pub fn with_qualifiers(mut self, user: impl Into<String>, channel: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self.channel = Some(channel.into());
        self
    }

    /// Search pattern for every version of this package with the same qualifiers.
    pub fn search_pattern(&self) -> Result<RefPattern, KilnError> {
        RefPattern::versions_of(&self.name, self.user.as_deref(), self.channel.as_deref())
    }

    /// Concrete reference for `version`, keeping this requirement's qualifiers.
    pub fn bind(&self, version: impl Into<String>) -> PackageReference {
        PackageReference {
            name: self.name.clone(),
            version: version.into(),
            user: self.user.clone(),
            channel: self.channel.clone(),
        }
    }
}

impl fmt::Display for RangeRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/[{}]{}",
            self.name,
            self.range,
            qualifier_suffix(self.user.as_deref(), self.channel.as_deref())
        )
    }
}

/// One package's declared dependency on another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// A concrete reference; there is nothing to resolve.
    Pinned(PackageReference),
    /// A version range waiting to be bound.
    Range(RangeRequirement),
    /// A range whose reference was fixed by a downstream override.
    Overridden {
        range: RangeRequirement,
        reference: PackageReference,
    },
    /// A range bound by the resolver.
    Resolved {
        range: RangeRequirement,
        reference: PackageReference,
    },
}

impl Requirement {
    /// Parse `name/version[@user/channel]` or `name/[range][@user/channel]`.
    pub fn parse(s: &str) -> Result<Self, KilnError> {
        let (name, version, user, channel) = split_reference(s)?;
        match version.strip_prefix('[').and_then(|v| v.strip_suffix(']')) {
            Some(range) => Ok(Requirement::Range(RangeRequirement {
                name: name.to_string(),
                range: range.trim().to_string(),
                user: user.map(str::to_string),
                channel: channel.map(str::to_string),
            })),
            None => PackageReference::parse(s).map(Requirement::Pinned),
        }
    }

    /// The concrete reference, if this requirement is bound to one.
    pub fn reference(&self) -> Option<&PackageReference> {
        match self {
            Requirement::Pinned(reference)
            | Requirement::Overridden { reference, .. }
            | Requirement::Resolved { reference, .. } => Some(reference),
            Requirement::Range(_) => None,
        }
    }

    /// The range this requirement was declared with, if any.
    pub fn range(&self) -> Option<&RangeRequirement> {
        match self {
            Requirement::Pinned(_) => None,
            Requirement::Range(range)
            | Requirement::Overridden { range, .. }
            | Requirement::Resolved { range, .. } => Some(range),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Requirement::Pinned(reference) => &reference.name,
            Requirement::Range(range)
            | Requirement::Overridden { range, .. }
            | Requirement::Resolved { range, .. } => &range.name,
        }
    }

    /// Fix the reference ahead of resolution, as a downstream requirement does.
    ///
    /// A range becomes `Overridden`; anything else is replaced by the new pin.
    pub fn override_with(&mut self, reference: PackageReference) {
        *self = match std::mem::replace(self, Requirement::Pinned(reference.clone())) {
            Requirement::Range(range)
            | Requirement::Overridden { range, .. }
            | Requirement::Resolved { range, .. } => Requirement::Overridden { range, reference },
            Requirement::Pinned(_) => Requirement::Pinned(reference),
        };
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::Pinned(reference) => reference.fmt(f),
            Requirement::Range(range)
            | Requirement::Overridden { range, .. }
            | Requirement::Resolved { range, .. } => range.fmt(f),
        }
    }
}

impl FromStr for Requirement {
    type Err = KilnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_pinned() {
        let req = Requirement::parse("zlib/1.2.13@lasote/stable").unwrap();
        assert!(matches!(req, Requirement::Pinned(_)));
        assert!(req.reference().is_some());
        assert_eq!(req.name(), "zlib");
        assert_eq!(req.to_string(), "zlib/1.2.13@lasote/stable");
    }

    #[test]
    fn parse_range_with_qualifiers() {
        let req = Requirement::parse("pkg/[>=1.2,<2.0]@lasote/stable").unwrap();
        let range = req.range().unwrap();
        assert_eq!(range.name, "pkg");
        assert_eq!(range.range, ">=1.2,<2.0");
        assert_eq!(range.user.as_deref(), Some("lasote"));
        assert!(req.reference().is_none());
        assert_eq!(req.to_string(), "pkg/[>=1.2,<2.0]@lasote/stable");
    }

    #[test]
    fn parse_range_with_spaces_and_or() {
        let req = Requirement::parse("pkg/[>1.0 <1.5 || 2.x]").unwrap();
        assert_eq!(req.range().unwrap().range, ">1.0 <1.5 || 2.x");
        assert_eq!(req.to_string(), "pkg/[>1.0 <1.5 || 2.x]");
    }

    #[test]
    fn parse_rejects_trailing_garbage_after_range() {
        assert!(Requirement::parse("pkg/[>1.0]x").is_err());
        assert!(Requirement::parse("pkg/[>1.0").is_err());
    }

    #[test]
    fn bind_keeps_qualifiers() {
        let range = RangeRequirement::new("pkg", "<2.0").with_qualifiers("lasote", "stable");
        let bound = range.bind("1.9");
        assert_eq!(bound.to_string(), "pkg/1.9@lasote/stable");
    }

    #[test]
    fn search_pattern_uses_wildcard_version() {
        let range = RangeRequirement::new("pkg", "<2.0").with_qualifiers("lasote", "stable");
        assert_eq!(range.search_pattern().unwrap().as_str(), "pkg/*@lasote/stable");
    }

    #[test]
    fn override_range_keeps_range() {
        let mut req = Requirement::parse("pkg/[<2.0]").unwrap();
        req.override_with(PackageReference::new("pkg", "1.1"));
        match &req {
            Requirement::Overridden { range, reference } => {
                assert_eq!(range.range, "<2.0");
                assert_eq!(reference.version, "1.1");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn override_pinned_replaces_pin() {
        let mut req = Requirement::parse("pkg/1.0").unwrap();
        req.override_with(PackageReference::new("pkg", "1.1"));
        assert_eq!(req, Requirement::Pinned(PackageReference::new("pkg", "1.1")));
    }
}
