//! Version parsing and stability rules
//!
//! Repository documents carry "semantic-like" version tokens: plain semver
//! (`1.2.0-beta.1`), calendar versions (`2024.1.0`), short forms (`2024.1`)
//! and PEP 440 style pre-releases (`1.0.0b1`, `2.0rc2`, `1.0.0.dev3`). All of
//! them are normalized into [`semver::Version`] so that ordering follows
//! semver precedence.

use semver::{BuildMetadata, Prerelease, Version};

use crate::error::{Error, Result};

/// Parse a version token leniently into a [`Version`]
///
/// Accepted shape: optional leading `v`, one to three numeric segments,
/// then an optional pre-release (`-beta.1` or `b1`) and build metadata.
pub fn parse_version(raw: &str) -> Result<Version> {
    let trimmed = raw.trim();
    let token = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);

    let split = token
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(token.len());
    let (numeric, suffix) = token.split_at(split);

    // "1.0.0.dev3" leaves a dangling separator on the numeric part
    let numeric = if suffix.is_empty() {
        numeric
    } else {
        numeric.strip_suffix('.').unwrap_or(numeric)
    };

    let segments: Vec<&str> = numeric.split('.').collect();
    if numeric.is_empty() || segments.len() > 3 || segments.iter().any(|s| s.is_empty()) {
        return Err(Error::invalid_version(raw));
    }

    let mut parts = [0u64; 3];
    for (slot, segment) in parts.iter_mut().zip(&segments) {
        *slot = segment
            .parse()
            .map_err(|_| Error::invalid_version(raw))?;
    }

    let mut version = Version::new(parts[0], parts[1], parts[2]);

    let (pre, build) = match suffix.split_once('+') {
        Some((pre, build)) => (pre, Some(build)),
        None => (suffix, None),
    };

    let pre = match pre.strip_prefix('-') {
        Some("") => return Err(Error::invalid_version(raw)),
        Some(rest) => rest.to_string(),
        None => pep440_prerelease(pre).unwrap_or_else(|| pre.to_string()),
    };

    if !pre.is_empty() {
        version.pre = Prerelease::new(&pre).map_err(|_| Error::invalid_version(raw))?;
    }

    if let Some(build) = build {
        version.build = BuildMetadata::new(build).map_err(|_| Error::invalid_version(raw))?;
    }

    Ok(version)
}

/// Rewrite a PEP 440 pre-release into semver identifiers
///
/// The serial becomes its own numeric identifier (`b10` -> `b.10`) and the
/// labels order as dev < a < b < rc: `dev` gets a leading numeric
/// identifier, which sorts below every alphanumeric one.
fn pep440_prerelease(suffix: &str) -> Option<String> {
    if suffix.is_empty() {
        return None;
    }

    let label_end = suffix
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(suffix.len());
    let (label, serial) = suffix.split_at(label_end);
    let serial = serial.trim_start_matches(['.', '-', '_']);
    let serial: u64 = if serial.is_empty() {
        0
    } else {
        serial.parse().ok()?
    };

    let label = match label.to_ascii_lowercase().as_str() {
        "dev" => return Some(format!("0.dev.{}", serial)),
        "a" | "alpha" => "a",
        "b" | "beta" => "b",
        "c" | "rc" | "pre" | "preview" => "rc",
        _ => return None,
    };

    Some(format!("{}.{}", label, serial))
}

/// A version is stable when it carries no pre-release marker
/// (alpha, beta, dev, release candidate or any other tag).
pub fn is_stable(version: &Version) -> bool {
    version.pre.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_semver() {
        let v = parse_version("1.2.3").unwrap();
        assert_eq!(v, Version::new(1, 2, 3));
    }

    #[test]
    fn test_parse_calendar_version_with_leading_zeros() {
        let v = parse_version("2024.01.0").unwrap();
        assert_eq!(v, Version::new(2024, 1, 0));
    }

    #[test]
    fn test_parse_short_forms_are_padded() {
        assert_eq!(parse_version("2024.1").unwrap(), Version::new(2024, 1, 0));
        assert_eq!(parse_version("3").unwrap(), Version::new(3, 0, 0));
    }

    #[test]
    fn test_parse_leading_v() {
        assert_eq!(parse_version("v1.0.0").unwrap(), Version::new(1, 0, 0));
        assert_eq!(parse_version(" V2.0 ").unwrap(), Version::new(2, 0, 0));
    }

    #[test]
    fn test_parse_semver_prerelease_and_build() {
        let v = parse_version("1.0.0-beta.1+build.5").unwrap();
        assert_eq!(v.pre.as_str(), "beta.1");
        assert_eq!(v.build.as_str(), "build.5");
    }

    #[test]
    fn test_parse_pep440_prereleases() {
        assert_eq!(parse_version("2024.1.0b1").unwrap().pre.as_str(), "b.1");
        assert_eq!(parse_version("2.0rc2").unwrap().pre.as_str(), "rc.2");
        assert_eq!(parse_version("1.0.0.dev3").unwrap().pre.as_str(), "0.dev.3");
        assert_eq!(parse_version("1.0a1").unwrap().pre.as_str(), "a.1");
        assert_eq!(parse_version("1.0.0beta2").unwrap().pre.as_str(), "b.2");
        assert_eq!(parse_version("1.0.0c1").unwrap().pre.as_str(), "rc.1");
    }

    #[test]
    fn test_pep440_serials_compare_numerically() {
        assert!(parse_version("1.0.0b2").unwrap() < parse_version("1.0.0b10").unwrap());
        assert!(parse_version("1.0.0rc9").unwrap() < parse_version("1.0.0rc10").unwrap());
        assert!(parse_version("1.0.0a10").unwrap() < parse_version("1.0.0b1").unwrap());
    }

    #[test]
    fn test_pep440_dev_sorts_below_alpha() {
        let dev = parse_version("1.0.0.dev1").unwrap();
        let alpha = parse_version("1.0.0a1").unwrap();
        assert!(dev < alpha);
        assert!(parse_version("1.0.0.dev2").unwrap() < parse_version("1.0.0.dev10").unwrap());
        assert!(dev < parse_version("1.0.0").unwrap());
        assert!(dev > parse_version("0.9.0").unwrap());
    }

    #[test]
    fn test_normalized_prerelease_reparses() {
        for raw in ["1.0.0b10", "1.0.0.dev3", "2.0rc2"] {
            let version = parse_version(raw).unwrap();
            assert_eq!(parse_version(&version.to_string()).unwrap(), version);
        }
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for raw in ["", "v", "latest", "1..0", "1.2.3.4", "1.0.0-", "1.0.", ".1.0", "1.0.0-be ta"] {
            assert!(parse_version(raw).is_err(), "expected {:?} to be rejected", raw);
        }
    }

    #[test]
    fn test_prerelease_sorts_below_release() {
        let beta = parse_version("1.0.0b1").unwrap();
        let rc = parse_version("1.0.0rc1").unwrap();
        let release = parse_version("1.0.0").unwrap();
        assert!(beta < rc);
        assert!(rc < release);
    }

    #[test]
    fn test_numeric_segments_compare_numerically() {
        assert!(parse_version("1.10.0").unwrap() > parse_version("1.9.0").unwrap());
        assert!(parse_version("2024.10").unwrap() > parse_version("2024.2.5").unwrap());
    }

    #[test]
    fn test_stability() {
        assert!(is_stable(&parse_version("1.0.0").unwrap()));
        assert!(is_stable(&parse_version("1.0.0+build.1").unwrap()));
        assert!(!is_stable(&parse_version("1.0.0-alpha").unwrap()));
        assert!(!is_stable(&parse_version("1.0.0b2").unwrap()));
        assert!(!is_stable(&parse_version("1.0.0.dev1").unwrap()));
        assert!(!is_stable(&parse_version("1.0.0rc1").unwrap()));
    }
}
