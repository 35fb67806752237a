//! Loose semver parsing and version range expressions.
//!
//! Package versions in the wild are rarely strict semver, so candidates are
//! parsed loosely before they are compared:
//! - a leading `v` or `=` is ignored
//! - missing minor/patch components default to `0` (`1.2` is `1.2.0`)
//! - a prerelease (`-rc.1`) and build metadata (`+build5`) are kept
//! - anything else (`master`, `1.2.3.4`) is not a version
//!
//! Range expressions use npm-style comparators on top of the `semver` crate:
//! `>=1.2,<2.0`, `>1.0 <1.5 || 2.x`, `~1.2`, `^1.2.3`, `1.0 - 2.0`. Commas and
//! whitespace both mean AND, `||` means OR. Two option terms may appear among
//! the comma-separated terms: `loose=False` (candidates must be strict
//! semver) and `include_prerelease=True` (prerelease candidates are compared
//! by their own precedence: `1.0.0-rc.1` fails `>=1.0`, `2.0.0-rc.1` passes
//! `<2.0`). A `*` next to other comparators constrains nothing.

use std::fmt;

use semver::{BuildMetadata, Comparator, Op, Prerelease, Version, VersionReq};

use kiln_util::errors::KilnError;

const OP_CHARS: &[char] = &['<', '>', '=', '~', '^'];

/// Parse a version loosely. Returns `None` if `text` is not a version at all.
pub fn parse_loose(text: &str) -> Option<Version> {
    let s = text.trim();
    let s = s.strip_prefix('=').unwrap_or(s).trim_start();
    let s = s.strip_prefix(&['v', 'V'][..]).unwrap_or(s);

    let (rest, build) = match s.split_once('+') {
        Some((rest, build)) => (rest, Some(build)),
        None => (s, None),
    };
    let (core, pre) = match rest.split_once('-') {
        Some((core, pre)) => (core, Some(pre)),
        None => (rest, None),
    };

    let mut parts = core.split('.');
    let major = parts.next()?.parse::<u64>().ok()?;
    let minor = match parts.next() {
        Some(p) => p.parse::<u64>().ok()?,
        None => 0,
    };
    let patch = match parts.next() {
        Some(p) => p.parse::<u64>().ok()?,
        None => 0,
    };
    if parts.next().is_some() {
        return None;
    }

    let mut version = Version::new(major, minor, patch);
    if let Some(pre) = pre {
        if pre.is_empty() {
            return None;
        }
        version.pre = Prerelease::new(pre).ok()?;
    }
    if let Some(build) = build {
        if build.is_empty() {
            return None;
        }
        version.build = BuildMetadata::new(build).ok()?;
    }
    Some(version)
}

/// A parsed version range expression.
#[derive(Debug, Clone)]
pub struct VersionRange {
    text: String,
    alternatives: Vec<VersionReq>,
    loose: bool,
    include_prerelease: bool,
}

/// Outcome of [`VersionRange::max_satisfying`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection<'a> {
    /// Literal of the highest satisfying candidate.
    pub best: Option<&'a str>,
    /// Candidates that could not be parsed as versions, in input order.
    pub invalid: Vec<&'a str>,
}

impl VersionRange {
    /// Parse a range expression. An empty expression accepts any version.
    pub fn parse(expr: &str) -> Result<Self, KilnError> {
        let invalid = |reason: String| KilnError::InvalidRange {
            range: expr.to_string(),
            reason,
        };

        let mut loose = true;
        let mut include_prerelease = false;
        let mut terms = Vec::new();
        for term in expr.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            match term.split_once('=') {
                Some((key, value)) if key.trim() == "loose" => {
                    loose = parse_flag(value).ok_or_else(|| invalid(format!("bad flag '{term}'")))?;
                }
                Some((key, value)) if key.trim() == "include_prerelease" => {
                    include_prerelease =
                        parse_flag(value).ok_or_else(|| invalid(format!("bad flag '{term}'")))?;
                }
                _ => terms.push(term),
            }
        }

        let joined = terms.join(" ");
        let mut alternatives = Vec::new();
        for alternative in joined.split("||") {
            let mut comparators = parse_alternative(alternative).map_err(&invalid)?;
            comparators.retain(|c| c != "*");
            let req = if comparators.is_empty() {
                VersionReq::STAR
            } else {
                VersionReq::parse(&comparators.join(", ")).map_err(|e| invalid(e.to_string()))?
            };
            alternatives.push(req);
        }

        Ok(Self {
            text: expr.trim().to_string(),
            alternatives,
            loose,
            include_prerelease,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Parse a candidate under this range's loose/strict setting.
    pub fn parse_candidate(&self, text: &str) -> Option<Version> {
        if self.loose {
            parse_loose(text)
        } else {
            Version::parse(text.trim()).ok()
        }
    }

    pub fn matches(&self, version: &Version) -> bool {
        if !self.include_prerelease {
            return self.alternatives.iter().any(|req| req.matches(version));
        }
        let version = Version {
            build: BuildMetadata::EMPTY,
            ..version.clone()
        };
        self.alternatives
            .iter()
            .any(|req| req.comparators.iter().all(|c| allows(c, &version)))
    }

    /// Highest candidate satisfying this range.
    ///
    /// Literals that parse to the same version keep the first one seen.
    pub fn max_satisfying<'a, I>(&self, candidates: I) -> Selection<'a>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut best: Option<(Version, &'a str)> = None;
        let mut invalid = Vec::new();
        for literal in candidates {
            let Some(version) = self.parse_candidate(literal) else {
                invalid.push(literal);
                continue;
            };
            if !self.matches(&version) {
                continue;
            }
            if best.as_ref().map_or(true, |(current, _)| version > *current) {
                best = Some((version, literal));
            }
        }
        Selection {
            best: best.map(|(_, literal)| literal),
            invalid,
        }
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Turn one `||` alternative into `semver` comparator strings.
fn parse_alternative(text: &str) -> Result<Vec<String>, String> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let mut comparators = Vec::new();
    let mut pending_op = String::new();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i];
        if token.chars().all(|c| OP_CHARS.contains(&c)) {
            // `>= 1.2`: operator written apart from its version
            pending_op.push_str(token);
            i += 1;
            continue;
        }
        if pending_op.is_empty() && tokens.get(i + 1) == Some(&"-") {
            let upper = tokens
                .get(i + 2)
                .ok_or_else(|| format!("hyphen range '{token} -' has no upper bound"))?;
            comparators.push(format!(">={}", strip_v(token)));
            comparators.push(format!("<={}", strip_v(upper)));
            i += 3;
            continue;
        }
        comparators.push(comparator(&pending_op, token));
        pending_op.clear();
        i += 1;
    }
    if !pending_op.is_empty() {
        return Err(format!("operator '{pending_op}' is not followed by a version"));
    }
    Ok(comparators)
}

fn comparator(op_prefix: &str, token: &str) -> String {
    let split = token
        .find(|c: char| !OP_CHARS.contains(&c))
        .unwrap_or(token.len());
    let (op, version) = token.split_at(split);
    let version = strip_v(version);
    let op = format!("{op_prefix}{op}");
    if !op.is_empty() {
        // `>=1.x` is `>=1`: an operator on a partial version already covers
        // the wildcard part.
        let partial = concrete_parts(version);
        return if partial.is_empty() {
            "*".to_string()
        } else {
            format!("{op}{partial}")
        };
    }
    // A bare version is an exact match (partial versions match their whole
    // minor/major), not the caret default of the `semver` crate.
    if is_wildcard(version) {
        version
            .split('.')
            .map(|part| if is_wildcard_part(part) { "*" } else { part })
            .collect::<Vec<_>>()
            .join(".")
    } else {
        format!("={version}")
    }
}

/// Whether `version` satisfies `c` by plain precedence, prereleases included.
fn allows(c: &Comparator, v: &Version) -> bool {
    let lower = Version {
        major: c.major,
        minor: c.minor.unwrap_or(0),
        patch: c.patch.unwrap_or(0),
        pre: c.pre.clone(),
        build: BuildMetadata::EMPTY,
    };
    // first release past every version the written components cover
    let past_written = match (c.minor, c.patch) {
        (None, _) => Version::new(c.major + 1, 0, 0),
        (Some(minor), None) => Version::new(c.major, minor + 1, 0),
        (Some(minor), Some(patch)) => Version::new(c.major, minor, patch + 1),
    };
    let exact = c.patch.is_some();
    match c.op {
        Op::Exact | Op::Wildcard if exact => *v == lower,
        Op::Exact | Op::Wildcard => *v >= lower && *v < past_written,
        Op::Greater if exact => *v > lower,
        Op::Greater => *v >= past_written,
        Op::GreaterEq => *v >= lower,
        Op::Less => *v < lower,
        Op::LessEq if exact => *v <= lower,
        Op::LessEq => *v < past_written,
        Op::Tilde => {
            let upper = match c.minor {
                None => Version::new(c.major + 1, 0, 0),
                Some(minor) => Version::new(c.major, minor + 1, 0),
            };
            *v >= lower && *v < upper
        }
        Op::Caret => {
            let upper = match (c.major, c.minor, c.patch) {
                (0, Some(0), Some(patch)) => Version::new(0, 0, patch + 1),
                (0, Some(minor), _) => Version::new(0, minor + 1, 0),
                (major, _, _) => Version::new(major + 1, 0, 0),
            };
            *v >= lower && *v < upper
        }
        _ => false,
    }
}

fn strip_v(version: &str) -> &str {
    version.strip_prefix(&['v', 'V'][..]).unwrap_or(version)
}

fn is_wildcard_part(part: &str) -> bool {
    matches!(part, "*" | "x" | "X")
}

fn is_wildcard(version: &str) -> bool {
    version.split('.').any(is_wildcard_part)
}

/// Leading non-wildcard components of `version`, dot-joined.
fn concrete_parts(version: &str) -> String {
    version
        .split('.')
        .take_while(|part| !is_wildcard_part(part))
        .collect::<Vec<_>>()
        .join(".")
}
