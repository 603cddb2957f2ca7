// src/convert/rules.rs
//! Per-package conversion rules
//!
//! Most packages convert with no configuration at all. The rules file
//! exists for the handful that need shaping: restricting architectures,
//! keeping a single image group, or fanning one definition out into
//! suffixed variant manifests (Db2 engine levels, it-only image sets, and
//! the like).
//!
//! ```toml
//! [package.ibm-mas]
//! exclude_group = "ibmmasMaximoIT"
//!
//! [[package.ibm-mas.variant]]
//! suffix = "it"
//! include_group = "ibmmasMaximoIT"
//!
//! [package.ibm-db2u]
//! include_group = "ibmdb2u-standalone"
//! skip_base = true
//!
//! [[package.ibm-db2u.variant]]
//! suffix = "s11"
//! exclude_tag_prefixes = ["s12.", "12.", "standalone-12."]
//! ```

use crate::error::{Error, Result};
use crate::pak::ImageRecord;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Root of the rules file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConversionRules {
    pub package: HashMap<String, PackageRule>,
}

/// Rules for one package
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PackageRule {
    /// Architectures to generate for, overriding the run-wide list
    pub architectures: Option<Vec<String>>,
    /// Keep only rows whose groups column equals this value
    pub include_group: Option<String>,
    /// Drop rows whose groups column equals this value
    pub exclude_group: Option<String>,
    /// Do not emit the unsuffixed manifest, variants only
    pub skip_base: bool,
    /// Suffixed variant manifests derived from the same definition
    pub variant: Vec<VariantRule>,
}

/// One suffixed variant manifest
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VariantRule {
    /// Appended to the package name: `ibm-db2u` + `s11` makes `ibm-db2u-s11`
    pub suffix: String,
    /// Overrides the package-level include group when set
    pub include_group: Option<String>,
    /// Overrides the package-level exclude group when set
    pub exclude_group: Option<String>,
    /// Drop rows whose tag starts with any of these prefixes
    pub exclude_tag_prefixes: Vec<String>,
}

impl ConversionRules {
    /// Load rules from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::RulesError(format!("cannot read '{}': {}", path.display(), e)))?;
        let rules: ConversionRules = toml::from_str(&text)
            .map_err(|e| Error::RulesError(format!("cannot parse '{}': {}", path.display(), e)))?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn for_package(&self, name: &str) -> Option<&PackageRule> {
        self.package.get(name)
    }

    fn validate(&self) -> Result<()> {
        for (name, rule) in &self.package {
            if rule.skip_base && rule.variant.is_empty() {
                return Err(Error::RulesError(format!(
                    "package '{}' skips its base manifest but has no variants",
                    name
                )));
            }
            for variant in &rule.variant {
                if variant.suffix.is_empty() {
                    return Err(Error::RulesError(format!(
                        "package '{}' has a variant without a suffix",
                        name
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Effective row filter for one manifest, base or variant
#[derive(Debug, Clone, Default)]
pub struct ImageFilter {
    pub include_group: Option<String>,
    pub exclude_group: Option<String>,
    pub exclude_tag_prefixes: Vec<String>,
}

impl ImageFilter {
    /// Filter for a package's base manifest
    pub fn base(rule: Option<&PackageRule>) -> Self {
        match rule {
            Some(rule) => Self {
                include_group: rule.include_group.clone(),
                exclude_group: rule.exclude_group.clone(),
                exclude_tag_prefixes: Vec::new(),
            },
            None => Self::default(),
        }
    }

    /// Filter for a variant, inheriting unset groups from the package rule
    pub fn variant(rule: &PackageRule, variant: &VariantRule) -> Self {
        Self {
            include_group: variant
                .include_group
                .clone()
                .or_else(|| rule.include_group.clone()),
            exclude_group: variant
                .exclude_group
                .clone()
                .or_else(|| rule.exclude_group.clone()),
            exclude_tag_prefixes: variant.exclude_tag_prefixes.clone(),
        }
    }

    /// Group comparisons are exact matches against the whole groups column
    pub fn keeps(&self, row: &ImageRecord) -> bool {
        if let Some(exclude) = &self.exclude_group {
            if row.groups == *exclude {
                return false;
            }
        }
        if let Some(include) = &self.include_group {
            if row.groups != *include {
                return false;
            }
        }
        !self
            .exclude_tag_prefixes
            .iter()
            .any(|prefix| row.tag.starts_with(prefix.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(tag: &str, groups: &str) -> ImageRecord {
        ImageRecord {
            registry: "cp.icr.io".into(),
            name: "cp/img".into(),
            tag: tag.into(),
            digest: "sha256:aaa".into(),
            arch: "amd64".into(),
            groups: groups.into(),
        }
    }

    #[test]
    fn parses_variant_rules() {
        let toml = r#"
            [package.ibm-db2u]
            include_group = "ibmdb2u-standalone"
            skip_base = true

            [[package.ibm-db2u.variant]]
            suffix = "s11"
            exclude_tag_prefixes = ["s12.", "12.", "standalone-12."]

            [[package.ibm-db2u.variant]]
            suffix = "s12"
            exclude_tag_prefixes = ["s11.", "11.", "standalone-11."]
        "#;
        let rules: ConversionRules = toml::from_str(toml).unwrap();
        rules.validate().unwrap();
        let rule = rules.for_package("ibm-db2u").unwrap();
        assert!(rule.skip_base);
        assert_eq!(rule.variant.len(), 2);
        assert_eq!(rule.variant[0].suffix, "s11");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let toml = r#"
            [package.ibm-sls]
            includegroup = "typo"
        "#;
        assert!(toml::from_str::<ConversionRules>(toml).is_err());
    }

    #[test]
    fn skip_base_without_variants_is_invalid() {
        let toml = r#"
            [package.ibm-sls]
            skip_base = true
        "#;
        let rules: ConversionRules = toml::from_str(toml).unwrap();
        assert!(matches!(rules.validate(), Err(Error::RulesError(_))));
    }

    #[test]
    fn missing_rules_file_is_a_rules_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConversionRules::load(&dir.path().join("rules.toml")).unwrap_err();
        assert!(matches!(err, Error::RulesError(_)));
        assert!(err.to_string().contains("rules.toml"));
    }

    #[test]
    fn group_matching_is_exact() {
        let filter = ImageFilter {
            include_group: Some("ibmmasMaximoIT".into()),
            ..Default::default()
        };
        assert!(filter.keeps(&row("1.0", "ibmmasMaximoIT")));
        assert!(!filter.keeps(&row("1.0", "ibmmasMaximoIT-extra")));
        assert!(!filter.keeps(&row("1.0", "")));
    }

    #[test]
    fn exclude_group_wins_over_include() {
        let filter = ImageFilter {
            include_group: Some("a".into()),
            exclude_group: Some("a".into()),
            ..Default::default()
        };
        assert!(!filter.keeps(&row("1.0", "a")));
    }

    #[test]
    fn tag_prefixes_drop_rows() {
        let filter = ImageFilter {
            exclude_tag_prefixes: vec!["s12.".into(), "12.".into()],
            ..Default::default()
        };
        assert!(filter.keeps(&row("s11.5.9.0", "")));
        assert!(!filter.keeps(&row("s12.1.0.0", "")));
        assert!(!filter.keeps(&row("12.1.0", "")));
    }

    #[test]
    fn variant_filter_inherits_package_groups() {
        let rule = PackageRule {
            include_group: Some("ibmdb2u-standalone".into()),
            ..Default::default()
        };
        let variant = VariantRule {
            suffix: "s11".into(),
            exclude_tag_prefixes: vec!["s12.".into()],
            ..Default::default()
        };
        let filter = ImageFilter::variant(&rule, &variant);
        assert_eq!(filter.include_group.as_deref(), Some("ibmdb2u-standalone"));
        assert!(filter.keeps(&row("s11.5.9.0", "ibmdb2u-standalone")));
        assert!(!filter.keeps(&row("s12.1.0.0", "ibmdb2u-standalone")));
        assert!(!filter.keeps(&row("s11.5.9.0", "other")));
    }
}
