//! Host-compatibility resolution of component versions

use crate::types::ComponentDescription;
use crate::version::is_stable;
use semver::Version;
use std::collections::BTreeSet;
use tracing::debug;

/// Versions of a component that can be installed on the given host
///
/// A version is included when it is stable (or `allow_unstable` is set) and
/// its entry accepts the host version. The set is ordered by semver
/// precedence, so the last element is the newest installable version.
pub fn supported_versions(
    component: &ComponentDescription,
    host_version: &Version,
    allow_unstable: bool,
) -> BTreeSet<Version> {
    let supported: BTreeSet<Version> = component
        .versions
        .iter()
        .filter(|(version, _)| allow_unstable || is_stable(version))
        .filter(|(_, entry)| entry.supports_host(host_version))
        .map(|(version, _)| version.clone())
        .collect();

    debug!(
        "{}: {} of {} versions supported on host {}",
        component.name,
        supported.len(),
        component.versions.len(),
        host_version
    );

    supported
}

/// Newest installable version, `None` when nothing supports the host
pub fn latest_version(
    component: &ComponentDescription,
    host_version: &Version,
    allow_unstable: bool,
) -> Option<Version> {
    supported_versions(component, host_version, allow_unstable)
        .into_iter()
        .next_back()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VersionEntry;
    use crate::version::parse_version;
    use std::collections::BTreeMap;
    use url::Url;

    fn component(entries: &[(&str, &str, Option<&str>)]) -> ComponentDescription {
        let versions = entries
            .iter()
            .map(|(v, min, max)| {
                (
                    parse_version(v).unwrap(),
                    VersionEntry {
                        tag: v.to_string(),
                        host_min_version: parse_version(min).unwrap(),
                        host_max_version: max.map(|m| parse_version(m).unwrap()),
                        release_file: Url::parse(&format!("http://x/{}.zip", v)).unwrap(),
                        homepage: None,
                    },
                )
            })
            .collect::<BTreeMap<_, _>>();

        ComponentDescription {
            name: "foo".to_string(),
            description: None,
            homepage: None,
            changelog: None,
            versions,
        }
    }

    fn host(v: &str) -> Version {
        parse_version(v).unwrap()
    }

    #[test]
    fn test_compatible_host_returns_version() {
        let foo = component(&[("1.0.0", "2024.1.0", None)]);
        let versions = supported_versions(&foo, &host("2024.2.0"), false);
        assert_eq!(versions.into_iter().collect::<Vec<_>>(), vec![host("1.0.0")]);
    }

    #[test]
    fn test_old_host_returns_nothing() {
        let foo = component(&[("1.0.0", "2024.1.0", None)]);
        assert!(supported_versions(&foo, &host("2023.1.0"), false).is_empty());
        assert_eq!(latest_version(&foo, &host("2023.1.0"), false), None);
    }

    #[test]
    fn test_unstable_versions_need_opt_in() {
        let foo = component(&[
            ("1.0.0", "2024.1.0", None),
            ("1.1.0b1", "2024.1.0", None),
            ("2.0.0-rc.1", "2024.1.0", None),
        ]);

        let stable = supported_versions(&foo, &host("2024.2.0"), false);
        assert!(stable.iter().all(is_stable));
        assert_eq!(stable.len(), 1);

        let all = supported_versions(&foo, &host("2024.2.0"), true);
        assert_eq!(all.len(), 3);
        assert_eq!(latest_version(&foo, &host("2024.2.0"), true), Some(host("2.0.0-rc.1")));
    }

    #[test]
    fn test_host_max_is_inclusive() {
        let foo = component(&[("1.0.0", "2024.1.0", Some("2024.6.0"))]);
        assert_eq!(supported_versions(&foo, &host("2024.6.0"), false).len(), 1);
        assert!(supported_versions(&foo, &host("2024.6.1"), false).is_empty());
    }

    #[test]
    fn test_latest_prefers_final_release_over_prerelease() {
        let foo = component(&[
            ("1.2.0", "2024.1.0", None),
            ("1.2.0-beta.1", "2024.1.0", None),
            ("1.10.0", "2024.1.0", None),
        ]);
        assert_eq!(latest_version(&foo, &host("2024.2.0"), true), Some(host("1.10.0")));
    }

    #[test]
    fn test_latest_orders_pep440_serials_numerically() {
        let foo = component(&[
            ("1.0.0b2", "2024.1.0", None),
            ("1.0.0b10", "2024.1.0", None),
            ("1.0.0.dev5", "2024.1.0", None),
        ]);
        assert_eq!(
            latest_version(&foo, &host("2024.2.0"), true),
            Some(host("1.0.0b10"))
        );
    }

    #[test]
    fn test_supported_set_is_subset_of_catalog() {
        let foo = component(&[
            ("0.9.0", "2023.1.0", Some("2023.12.0")),
            ("1.0.0", "2024.1.0", None),
            ("1.1.0-alpha.1", "2024.1.0", None),
            ("2.0.0", "2025.1.0", None),
        ]);

        for h in ["2022.1.0", "2023.6.0", "2024.2.0", "2025.3.0"] {
            for allow_unstable in [false, true] {
                for v in supported_versions(&foo, &host(h), allow_unstable) {
                    let entry = foo.entry(&v).unwrap();
                    assert!(entry.supports_host(&host(h)));
                    assert!(allow_unstable || is_stable(&v));
                }
            }
        }
    }
}
