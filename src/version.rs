//! # Go Module Version Ordering
//!
//! Replace directives pin a module to a version such as `v1.4.2`,
//! `v0.0.0-20230101120000-abcdef123456` (a pseudo-version) or
//! `v2.0.0+incompatible`. When several dependencies pin the same module, the
//! reconciler keeps the lowest version, so it needs an ordering that agrees
//! with the Go toolchain:
//!
//! - A leading `v` is required.
//! - `vMAJOR` and `vMAJOR.MINOR` are shorthands for `vMAJOR.0.0` and
//!   `vMAJOR.MINOR.0`.
//! - Pre-release versions (pseudo-versions included) order before the release
//!   they precede.
//! - Build metadata is ignored.
//!
//! Versions that are not valid under these rules order after every valid
//! version, and compare lexicographically among themselves.

use std::cmp::Ordering;

use semver::{BuildMetadata, Version};

/// Parse a Go module version into a `semver::Version`.
///
/// Returns `None` for anything the Go toolchain would not accept as a
/// semantic version, including versions without the leading `v`.
pub fn parse_go_version(version: &str) -> Option<Version> {
    let stripped = version.strip_prefix('v')?;

    let core_end = stripped.find(['-', '+']).unwrap_or(stripped.len());
    let (core, suffix) = stripped.split_at(core_end);
    let padded = match core.split('.').count() {
        // Shorthands are only valid without pre-release or build suffixes
        1 if suffix.is_empty() => format!("{}.0.0", core),
        2 if suffix.is_empty() => format!("{}.0", core),
        3 => stripped.to_string(),
        _ => return None,
    };

    let mut parsed = Version::parse(&padded).ok()?;
    parsed.build = BuildMetadata::EMPTY;
    Some(parsed)
}

/// Compare two Go module versions.
///
/// Valid versions compare by semantic-version precedence. An invalid version
/// is greater than any valid one, and two invalid versions compare as plain
/// strings.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    match (parse_go_version(a), parse_go_version(b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}
