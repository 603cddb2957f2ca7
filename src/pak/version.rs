// src/pak/version.rs
//! Pak version normalization

use semver::Version;
use std::fmt;

/// A Pak package version as published in case metadata.
///
/// Versions are usually semver (`3.12.5`, `6.2.0+20250530.152516.232`) but
/// some products publish looser forms (`3.12`, `1.1.2667`). The raw string
/// is kept for display; `base` is the version with build metadata removed,
/// which is what store paths and manifest file names use.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PakVersion {
    raw: String,
    base: String,
}

impl PakVersion {
    pub fn new(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            base: strip_build_metadata(raw),
        }
    }

    /// The version exactly as published
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The version without `+build` metadata
    pub fn base(&self) -> &str {
        &self.base
    }
}

impl fmt::Display for PakVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Remove semver build metadata, falling back to a plain `+` split for
/// versions semver cannot parse
fn strip_build_metadata(raw: &str) -> String {
    if let Ok(v) = Version::parse(raw) {
        if v.build.is_empty() {
            return raw.to_string();
        }
        let mut base = format!("{}.{}.{}", v.major, v.minor, v.patch);
        if !v.pre.is_empty() {
            base.push('-');
            base.push_str(v.pre.as_str());
        }
        return base;
    }
    raw.split_once('+').map(|(v, _)| v).unwrap_or(raw).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_semver_is_unchanged() {
        assert_eq!(PakVersion::new("3.12.5").base(), "3.12.5");
        assert_eq!(PakVersion::new("1.1.2667").base(), "1.1.2667");
    }

    #[test]
    fn build_metadata_is_stripped() {
        let v = PakVersion::new("6.2.0+20250530.152516.232");
        assert_eq!(v.base(), "6.2.0");
        assert_eq!(v.raw(), "6.2.0+20250530.152516.232");
    }

    #[test]
    fn prerelease_survives_stripping() {
        assert_eq!(PakVersion::new("2.0.0-rc.1+build.7").base(), "2.0.0-rc.1");
    }

    #[test]
    fn non_semver_falls_back_to_plus_split() {
        assert_eq!(PakVersion::new("3.12").base(), "3.12");
        assert_eq!(PakVersion::new("3.12+hotfix").base(), "3.12");
    }

    #[test]
    fn display_shows_raw() {
        assert_eq!(PakVersion::new("6.2.0+x").to_string(), "6.2.0+x");
    }
}
