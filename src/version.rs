use std::cmp::Ordering;
use std::fmt;

use semver::Version;

use crate::error::ConfigError;

/// A set of package versions, used to match package-level policy overrides.
///
/// Accepted notations:
/// - `*` or empty — any version
/// - `1.2.3` or `[1.2.3]` — exactly that version
/// - `[1.0,2.0)`, `(1.0,]`, `[,3)` — interval; `[`/`]` inclusive, `(`/`)` exclusive,
///   an empty side is unbounded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionRange {
    Any,
    Exact(String),
    Interval {
        lower: Option<Bound>,
        upper: Option<Bound>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bound {
    pub version: String,
    pub inclusive: bool,
}

impl VersionRange {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let s = raw.trim();
        if s.is_empty() || s == "*" {
            return Ok(VersionRange::Any);
        }

        let open = s.chars().next().unwrap_or_default();
        let close = s.chars().last().unwrap_or_default();
        if !matches!(open, '[' | '(') {
            return Ok(VersionRange::Exact(s.to_string()));
        }
        if !matches!(close, ']' | ')') || s.len() < 2 {
            return Err(invalid(raw, "unterminated interval"));
        }

        let inner = &s[1..s.len() - 1];
        match inner.split_once(',') {
            None => {
                // "[1.0]" pins a single version; "(1.0)" is meaningless
                if open == '[' && close == ']' && !inner.trim().is_empty() {
                    Ok(VersionRange::Exact(inner.trim().to_string()))
                } else {
                    Err(invalid(raw, "single version must be written as [x]"))
                }
            }
            Some((lo, hi)) => {
                if hi.contains(',') {
                    return Err(invalid(raw, "too many bounds"));
                }
                let lower = bound(lo, open == '[');
                let upper = bound(hi, close == ']');
                if let (Some(l), Some(u)) = (&lower, &upper) {
                    if compare_versions(&l.version, &u.version) == Ordering::Greater {
                        return Err(invalid(raw, "lower bound exceeds upper bound"));
                    }
                }
                Ok(VersionRange::Interval { lower, upper })
            }
        }
    }

    /// Whether `version` falls inside this range.
    pub fn contains(&self, version: &str) -> bool {
        match self {
            VersionRange::Any => true,
            VersionRange::Exact(v) => compare_versions(v, version) == Ordering::Equal,
            VersionRange::Interval { lower, upper } => {
                let above = lower.as_ref().map_or(true, |b| {
                    match compare_versions(version, &b.version) {
                        Ordering::Greater => true,
                        Ordering::Equal => b.inclusive,
                        Ordering::Less => false,
                    }
                });
                let below = upper.as_ref().map_or(true, |b| {
                    match compare_versions(version, &b.version) {
                        Ordering::Less => true,
                        Ordering::Equal => b.inclusive,
                        Ordering::Greater => false,
                    }
                });
                above && below
            }
        }
    }

    /// Whether every version of `other` is inside this range.
    ///
    /// Only exact and unbounded ranges are compared structurally; an interval
    /// is covered solely by `Any` or an identical interval.
    pub fn covers(&self, other: &VersionRange) -> bool {
        match (self, other) {
            (VersionRange::Any, _) => true,
            (_, VersionRange::Exact(v)) => self.contains(v),
            (a, b) => a == b,
        }
    }

    /// Rank used to pick the most specific override: exact > interval > any.
    pub fn specificity(&self) -> u8 {
        match self {
            VersionRange::Any => 0,
            VersionRange::Interval { .. } => 1,
            VersionRange::Exact(_) => 2,
        }
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionRange::Any => write!(f, "*"),
            VersionRange::Exact(v) => write!(f, "[{}]", v),
            VersionRange::Interval { lower, upper } => {
                let (open, lo) = match lower {
                    Some(b) => (if b.inclusive { '[' } else { '(' }, b.version.as_str()),
                    None => ('(', ""),
                };
                let (close, hi) = match upper {
                    Some(b) => (if b.inclusive { ']' } else { ')' }, b.version.as_str()),
                    None => (')', ""),
                };
                write!(f, "{}{},{}{}", open, lo, hi, close)
            }
        }
    }
}

fn bound(raw: &str, inclusive: bool) -> Option<Bound> {
    let v = raw.trim();
    if v.is_empty() {
        None
    } else {
        Some(Bound {
            version: v.to_string(),
            inclusive,
        })
    }
}

fn invalid(raw: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidVersionRange {
        range: raw.to_string(),
        reason: reason.to_string(),
    }
}

/// Compare two ecosystem version tokens.
///
/// Tokens that read as semver (a missing minor or patch counts as `0`) are
/// ordered by semver rules, so `1.0.0-beta < 1.0.0`. Anything else falls
/// back to a segment-wise comparison.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    match (as_semver(a), as_semver(b)) {
        (Some(x), Some(y)) => x.cmp_precedence(&y),
        _ => compare_segments(a, b),
    }
}

fn as_semver(raw: &str) -> Option<Version> {
    let s = raw.trim().trim_start_matches('v');
    if let Ok(v) = Version::parse(s) {
        return Some(v);
    }

    // "1.2" / "1.2-rc.1" → "1.2.0" / "1.2.0-rc.1"
    let split = s.find(['-', '+']).unwrap_or(s.len());
    let (core, rest) = s.split_at(split);
    let parts = core.split('.').count();
    if parts >= 3 || core.split('.').any(|p| p.parse::<u64>().is_err()) {
        return None;
    }
    let padded = format!("{}{}{}", core, ".0".repeat(3 - parts), rest);
    Version::parse(&padded).ok()
}

/// Segments split on `.`, `-` and `+`. Numeric segments compare numerically,
/// anything else lexically; a missing segment counts as `0`.
fn compare_segments(a: &str, b: &str) -> Ordering {
    let split = |s: &str| -> Vec<String> {
        s.trim()
            .trim_start_matches('v')
            .split(['.', '-', '+'])
            .map(str::to_string)
            .collect()
    };
    let (left, right) = (split(a), split(b));
    let len = left.len().max(right.len());

    for i in 0..len {
        let l = left.get(i).map(String::as_str).unwrap_or("0");
        let r = right.get(i).map(String::as_str).unwrap_or("0");
        let ord = match (l.parse::<u64>(), r.parse::<u64>()) {
            (Ok(x), Ok(y)) => x.cmp(&y),
            _ => l.cmp(r),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_any() {
        assert_eq!(VersionRange::parse("*").unwrap(), VersionRange::Any);
        assert_eq!(VersionRange::parse("  ").unwrap(), VersionRange::Any);
    }

    #[test]
    fn test_parse_exact() {
        assert_eq!(
            VersionRange::parse("1.0.0").unwrap(),
            VersionRange::Exact("1.0.0".into())
        );
        assert_eq!(
            VersionRange::parse("[2.1]").unwrap(),
            VersionRange::Exact("2.1".into())
        );
    }

    #[test]
    fn test_interval_bounds() {
        let r = VersionRange::parse("[1.0,2.0)").unwrap();
        assert!(r.contains("1.0"));
        assert!(r.contains("1.9.9"));
        assert!(!r.contains("2.0.0"));
        assert!(!r.contains("0.9"));

        let open_low = VersionRange::parse("(,3]").unwrap();
        assert!(open_low.contains("0.1"));
        assert!(open_low.contains("3.0.0"));
        assert!(!open_low.contains("3.0.1"));
    }

    #[test]
    fn test_invalid_ranges() {
        assert!(VersionRange::parse("[1.0,2.0").is_err());
        assert!(VersionRange::parse("[3.0,1.0]").is_err());
        assert!(VersionRange::parse("(1.0)").is_err());
        assert!(VersionRange::parse("[1,2,3]").is_err());
    }

    #[test]
    fn test_compare_numeric_segments() {
        assert_eq!(compare_versions("1.10.0", "1.9.0"), Ordering::Greater);
        assert_eq!(compare_versions("1.0", "1.0.0"), Ordering::Equal);
        assert_eq!(compare_versions("v2.0", "2.0"), Ordering::Equal);
    }

    #[test]
    fn test_compare_prereleases() {
        assert_eq!(compare_versions("1.0.0-beta", "1.0.0"), Ordering::Less);
        assert_eq!(compare_versions("1.0.0-0", "1.0.0"), Ordering::Less);
        assert_eq!(compare_versions("1.0.0-alpha", "1.0.0-beta"), Ordering::Less);
        assert_eq!(compare_versions("2.0.0-beta.1", "2.0.0-beta.11"), Ordering::Less);
        assert_eq!(compare_versions("1.0.0+build.5", "1.0.0"), Ordering::Equal);
        assert_eq!(compare_versions("2.0-rc.1", "2.0"), Ordering::Less);
    }

    #[test]
    fn test_compare_non_semver_tokens() {
        assert_eq!(compare_versions("1.2.3.4", "1.2.3.10"), Ordering::Less);
        assert_eq!(compare_versions("2020.10", "2020.9.1"), Ordering::Greater);
    }

    #[test]
    fn test_prerelease_ranges() {
        let r = VersionRange::parse("[1.0.0,2.0.0)").unwrap();
        assert!(r.contains("2.0.0-beta.1"));
        assert!(!r.contains("1.0.0-rc.1"));
        assert!(!r.contains("2.0.0"));

        let exact = VersionRange::Exact("1.0.0".into());
        assert!(!exact.contains("1.0.0-0"));
        assert!(exact.contains("v1.0.0"));
    }

    #[test]
    fn test_covers_single_version() {
        let any = VersionRange::Any;
        let exact = VersionRange::Exact("1.2.3".into());
        let interval = VersionRange::parse("[1.0,2.0)").unwrap();

        assert!(any.covers(&exact));
        assert!(interval.covers(&exact));
        assert!(exact.covers(&VersionRange::Exact("1.2.3".into())));
        assert!(!exact.covers(&VersionRange::Exact("1.2.4".into())));
        assert!(!exact.covers(&any));
    }

    #[test]
    fn test_display_roundtrips_interval() {
        let r = VersionRange::parse("[1.0,2.0)").unwrap();
        assert_eq!(r.to_string(), "[1.0,2.0)");
    }
}
