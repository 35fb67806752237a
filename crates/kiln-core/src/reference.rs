use std::fmt;
use std::str::FromStr;

use kiln_util::errors::KilnError;

/// A concrete package reference: `name/version` or `name/version@user/channel`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageReference {
    pub name: String,
    pub version: String,
    pub user: Option<String>,
    pub channel: Option<String>,
}

impl PackageReference {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            user: None,
            channel: None,
        }
    }

    /// Attach `user/channel` qualifiers.
    pub fn with_qualifiers(mut self, user: impl Into<String>, channel: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self.channel = Some(channel.into());
        self
    }

    /// Parse `name/version[@user/channel]`.
    pub fn parse(s: &str) -> Result<Self, KilnError> {
        let (name, version, user, channel) = split_reference(s)?;
        check_segment(s, "version", version)?;
        Ok(Self {
            name: name.to_string(),
            version: version.to_string(),
            user: user.map(str::to_string),
            channel: channel.map(str::to_string),
        })
    }

    /// The `@user/channel` suffix, or an empty string when unqualified.
    pub fn qualifier_suffix(&self) -> String {
        qualifier_suffix(self.user.as_deref(), self.channel.as_deref())
    }
}

impl fmt::Display for PackageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}{}", self.name, self.version, self.qualifier_suffix())
    }
}

impl FromStr for PackageReference {
    type Err = KilnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

pub(crate) fn qualifier_suffix(user: Option<&str>, channel: Option<&str>) -> String {
    match (user, channel) {
        (Some(u), Some(c)) => format!("@{u}/{c}"),
        _ => String::new(),
    }
}

/// Split `name/version[@user/channel]` into its raw parts.
///
/// The version part is returned verbatim so callers can decide whether it is
/// a concrete version or a bracketed range.
pub(crate) fn split_reference(s: &str) -> Result<(&str, &str, Option<&str>, Option<&str>), KilnError> {
    let invalid = |reason: &str| KilnError::InvalidReference {
        reference: s.to_string(),
        reason: reason.to_string(),
    };

    let s_trim = s.trim();
    let (name, rest) = s_trim
        .split_once('/')
        .ok_or_else(|| invalid("missing '/' between name and version"))?;
    check_segment(s, "name", name)?;

    // Qualifiers of a bracketed range follow the closing bracket.
    let at = if rest.starts_with('[') {
        let close = rest.find(']').ok_or_else(|| invalid("unclosed '[' in version range"))?;
        match &rest[close + 1..] {
            "" => None,
            tail if tail.starts_with('@') => Some(close + 1),
            _ => return Err(invalid("unexpected text after version range")),
        }
    } else {
        rest.find('@')
    };

    let Some(at) = at else {
        return Ok((name, rest, None, None));
    };

    let version = &rest[..at];
    let qualifiers = &rest[at + 1..];
    let (user, channel) = qualifiers
        .split_once('/')
        .ok_or_else(|| invalid("qualifiers must be written as user/channel"))?;
    check_segment(s, "user", user)?;
    check_segment(s, "channel", channel)?;
    Ok((name, version, Some(user), Some(channel)))
}

fn check_segment(reference: &str, what: &str, segment: &str) -> Result<(), KilnError> {
    let reason = if segment.is_empty() {
        format!("empty {what}")
    } else if segment.chars().any(|c| c.is_whitespace() || c == '/' || c == '@') {
        format!("invalid character in {what} '{segment}'")
    } else {
        return Ok(());
    };
    Err(KilnError::InvalidReference {
        reference: reference.to_string(),
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_unqualified() {
        let r = PackageReference::parse("zlib/1.2.13").unwrap();
        assert_eq!(r.name, "zlib");
        assert_eq!(r.version, "1.2.13");
        assert!(r.user.is_none());
        assert!(r.channel.is_none());
        assert_eq!(r.to_string(), "zlib/1.2.13");
    }

    #[test]
    fn parse_qualified() {
        let r: PackageReference = "boost/1.84.0@lasote/stable".parse().unwrap();
        assert_eq!(r.user.as_deref(), Some("lasote"));
        assert_eq!(r.channel.as_deref(), Some("stable"));
        assert_eq!(r.qualifier_suffix(), "@lasote/stable");
        assert_eq!(r.to_string(), "boost/1.84.0@lasote/stable");
    }

    #[test]
    fn rejects_missing_version() {
        assert!(PackageReference::parse("zlib").is_err());
        assert!(PackageReference::parse("zlib/").is_err());
    }

    #[test]
    fn rejects_half_qualifiers() {
        assert!(PackageReference::parse("zlib/1.0@lasote").is_err());
        assert!(PackageReference::parse("zlib/1.0@/stable").is_err());
    }

    #[test]
    fn rejects_whitespace_in_version() {
        let err = PackageReference::parse("zlib/1 .0").unwrap_err();
        assert!(err.to_string().contains("invalid character in version"));
    }
}
