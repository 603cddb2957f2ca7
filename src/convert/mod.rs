// src/convert/mod.rs
//! Pak definition to manifest conversion
//!
//! Conversion is a pure function from definitions plus rules to manifests:
//! discovery and loading read the input tree, planning turns each
//! definition into the manifests it produces, and a final pass writes the
//! plans into the store. A malformed definition fails alone; the run keeps
//! going and reports every failure at the end.

pub mod rules;

pub use rules::{ConversionRules, ImageFilter, PackageRule, VariantRule};

use crate::error::{Error, Result};
use crate::manifest::store::{self, ManifestStore};
use crate::manifest::{AdditionalImage, ImageSetConfiguration};
use crate::pak::{self, PakDefinition};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Architectures manifests are generated for when neither the command line
/// nor a package rule narrows the list
pub const DEFAULT_ARCHITECTURES: [&str; 3] = ["amd64", "ppc64le", "s390x"];

/// Settings for one conversion run
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Pak case directory, or a single image list file
    pub input: PathBuf,
    /// Manifest store root
    pub store_root: PathBuf,
    pub architectures: Vec<String>,
    pub rules: ConversionRules,
    /// archiveSize written into each manifest, in GiB
    pub archive_size: u64,
    pub dry_run: bool,
}

/// One manifest a definition produces
#[derive(Debug, Clone)]
pub struct PlannedManifest {
    /// Definition the manifest came from
    pub source: PathBuf,
    /// Store path relative to the store root
    pub output: PathBuf,
    pub config: ImageSetConfiguration,
}

/// Outcome of a conversion run
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Definition files found under the input
    pub discovered: usize,
    /// Manifests written, or planned in a dry run
    pub written: usize,
    /// Manifest/arch combinations skipped because no rows survived filtering
    pub skipped_empty: usize,
    /// Output paths claimed by more than one definition
    pub conflicts: usize,
    /// Definitions that failed, with the error each produced
    pub failures: Vec<(PathBuf, Error)>,
}

impl RunSummary {
    /// A run succeeds only when every discovered definition converted
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Plan the manifests one definition produces. Pure: no filesystem access.
///
/// Returns the plans plus the number of manifest/arch combinations that
/// ended up empty after filtering.
pub fn plan_definition(
    def: &PakDefinition,
    architectures: &[String],
    rule: Option<&PackageRule>,
    archive_size: u64,
) -> (Vec<PlannedManifest>, usize) {
    let mut planned = Vec::new();
    let mut skipped_empty = 0;

    let arches: Vec<&str> = rule
        .and_then(|r| r.architectures.as_ref())
        .map(|v| v.iter().map(String::as_str).collect())
        .unwrap_or_else(|| architectures.iter().map(String::as_str).collect());

    let mut targets: Vec<(String, ImageFilter)> = Vec::new();
    if !rule.map(|r| r.skip_base).unwrap_or(false) {
        targets.push((def.name.clone(), ImageFilter::base(rule)));
    }
    if let Some(rule) = rule {
        for variant in &rule.variant {
            targets.push((
                format!("{}-{}", def.name, variant.suffix),
                ImageFilter::variant(rule, variant),
            ));
        }
    }

    for (manifest_name, filter) in &targets {
        for arch in &arches {
            let mut refs: Vec<String> = def
                .images
                .iter()
                .filter(|row| row.matches_arch(arch) && filter.keeps(row))
                .map(|row| row.reference())
                .collect();
            refs.sort();
            refs.dedup();

            if refs.is_empty() {
                debug!(
                    "No images for {} {} on {}, skipping",
                    manifest_name, def.version, arch
                );
                skipped_empty += 1;
                continue;
            }

            let images = refs
                .into_iter()
                .map(|name| AdditionalImage { name })
                .collect();
            planned.push(PlannedManifest {
                source: def.source.clone(),
                output: store::relative_manifest_path(manifest_name, def.version.base(), arch),
                config: ImageSetConfiguration::new(images, archive_size),
            });
        }
    }

    (planned, skipped_empty)
}

/// Run a full conversion: discover, load, plan, resolve conflicts, write.
///
/// Only a missing input tree is fatal. Everything that goes wrong with a
/// single definition lands in the summary's failure list instead.
pub fn run(opts: &ConvertOptions) -> Result<RunSummary> {
    let files = pak::find_definition_files(&opts.input)?;
    let mut summary = RunSummary {
        discovered: files.len(),
        ..Default::default()
    };
    info!(
        "Converting {} Pak definitions from {}",
        files.len(),
        opts.input.display()
    );

    // Definitions are processed in lexicographic source order, which makes
    // conflict resolution deterministic: when two claim the same output
    // path, the later source wins.
    let mut plans: BTreeMap<PathBuf, PlannedManifest> = BTreeMap::new();
    for path in &files {
        let def = match pak::load_definition(path) {
            Ok(def) => def,
            Err(err) => {
                warn!("Skipping {}: {}", path.display(), err);
                summary.failures.push((path.clone(), err));
                continue;
            }
        };

        let rule = opts.rules.for_package(&def.name);
        let (planned, skipped) =
            plan_definition(&def, &opts.architectures, rule, opts.archive_size);
        summary.skipped_empty += skipped;

        for plan in planned {
            let source = plan.source.clone();
            let output = plan.output.clone();
            if let Some(previous) = plans.insert(output.clone(), plan) {
                summary.conflicts += 1;
                warn!(
                    "Manifest {} claimed by both {} and {}; keeping the latter",
                    output.display(),
                    previous.source.display(),
                    source.display()
                );
            }
        }
    }

    let store = ManifestStore::new(&opts.store_root);
    for plan in plans.values() {
        let path = store.root().join(&plan.output);
        let yaml = match plan.config.to_yaml() {
            Ok(yaml) => yaml,
            Err(err) => {
                warn!("Skipping {}: {}", plan.output.display(), err);
                summary.failures.push((plan.source.clone(), err));
                continue;
            }
        };

        if opts.dry_run {
            info!(
                "Would write {} ({} images)",
                path.display(),
                plan.config.image_count()
            );
            summary.written += 1;
            continue;
        }

        match store.write(&path, &yaml) {
            Ok(()) => {
                info!(
                    "Wrote {} ({} images)",
                    path.display(),
                    plan.config.image_count()
                );
                summary.written += 1;
            }
            Err(err) => {
                warn!("Failed to write {}: {}", path.display(), err);
                summary.failures.push((plan.source.clone(), err));
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pak::{ImageRecord, PakVersion};

    fn record(name: &str, tag: &str, arch: &str, groups: &str) -> ImageRecord {
        ImageRecord {
            registry: "cp.icr.io".into(),
            name: name.into(),
            tag: tag.into(),
            digest: format!("sha256:{}", name.replace('/', "-")),
            arch: arch.into(),
            groups: groups.into(),
        }
    }

    fn definition(name: &str, version: &str, images: Vec<ImageRecord>) -> PakDefinition {
        PakDefinition {
            name: name.into(),
            version: PakVersion::new(version),
            source: format!("{}/{}/{}-{}-images.csv", name, version, name, version).into(),
            images,
        }
    }

    fn default_arches() -> Vec<String> {
        DEFAULT_ARCHITECTURES.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn plans_one_manifest_per_populated_arch() {
        let def = definition(
            "ibm-sls",
            "3.12.5",
            vec![
                record("cp/sls", "3.12.5", "amd64", ""),
                record("cp/sls", "3.12.5", "ppc64le", ""),
            ],
        );
        let (planned, skipped) = plan_definition(&def, &default_arches(), None, 2);

        assert_eq!(planned.len(), 2);
        assert_eq!(skipped, 1); // s390x has no rows
        assert_eq!(
            planned[0].output,
            PathBuf::from("packages/ibm-sls/3.12.5/amd64/ibm-sls-3.12.5-amd64.yaml")
        );
    }

    #[test]
    fn image_references_are_sorted_and_deduplicated() {
        let def = definition(
            "ibm-sls",
            "3.12.5",
            vec![
                record("cp/zeta", "1.0", "amd64", ""),
                record("cp/alpha", "1.0", "amd64", ""),
                record("cp/alpha", "1.0", "amd64", ""),
            ],
        );
        let (planned, _) = plan_definition(&def, &default_arches(), None, 2);
        let names: Vec<&str> = planned[0]
            .config
            .mirror
            .additional_images
            .iter()
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(
            names,
            vec![
                "cp.icr.io/cp/alpha:1.0@sha256:cp-alpha",
                "cp.icr.io/cp/zeta:1.0@sha256:cp-zeta"
            ]
        );
    }

    #[test]
    fn empty_arch_rows_land_in_amd64_only() {
        let def = definition(
            "ibm-sls",
            "3.12.5",
            vec![record("cp/sls", "3.12.5", "", "")],
        );
        let (planned, skipped) = plan_definition(&def, &default_arches(), None, 2);
        assert_eq!(planned.len(), 1);
        assert_eq!(skipped, 2);
        assert!(planned[0].output.to_string_lossy().contains("/amd64/"));
    }

    #[test]
    fn build_metadata_is_stripped_from_store_paths() {
        let def = definition(
            "ibm-mas-optimizer",
            "6.2.0+20250530.152516.232",
            vec![record("cp/opt", "6.2.0", "amd64", "")],
        );
        let (planned, _) = plan_definition(&def, &default_arches(), None, 2);
        assert_eq!(
            planned[0].output,
            PathBuf::from(
                "packages/ibm-mas-optimizer/6.2.0/amd64/ibm-mas-optimizer-6.2.0-amd64.yaml"
            )
        );
    }

    #[test]
    fn variants_fan_out_with_suffixed_names() {
        let rule = PackageRule {
            include_group: Some("ibmdb2u-standalone".into()),
            skip_base: true,
            architectures: Some(vec!["amd64".into()]),
            variant: vec![
                VariantRule {
                    suffix: "s11".into(),
                    exclude_tag_prefixes: vec!["s12.".into()],
                    ..Default::default()
                },
                VariantRule {
                    suffix: "s12".into(),
                    exclude_tag_prefixes: vec!["s11.".into()],
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let def = definition(
            "ibm-db2u",
            "5.9.0",
            vec![
                record("cp/db2-s11", "s11.5.9.0", "amd64", "ibmdb2u-standalone"),
                record("cp/db2-s12", "s12.1.0.0", "amd64", "ibmdb2u-standalone"),
                record("cp/db2-op", "5.9.0", "amd64", "other"),
            ],
        );
        let (planned, _) = plan_definition(&def, &default_arches(), Some(&rule), 2);

        assert_eq!(planned.len(), 2);
        let outputs: Vec<String> = planned
            .iter()
            .map(|p| p.output.to_string_lossy().into_owned())
            .collect();
        assert!(outputs[0].contains("ibm-db2u-s11/5.9.0/amd64/ibm-db2u-s11-5.9.0-amd64.yaml"));
        assert!(outputs[1].contains("ibm-db2u-s12/5.9.0/amd64/ibm-db2u-s12-5.9.0-amd64.yaml"));
        assert_eq!(planned[0].config.image_count(), 1);
        assert_eq!(
            planned[0].config.mirror.additional_images[0].name,
            "cp.icr.io/cp/db2-s11:s11.5.9.0@sha256:cp-db2-s11"
        );
    }

    #[test]
    fn rule_architectures_override_run_list() {
        let rule = PackageRule {
            architectures: Some(vec!["s390x".into()]),
            ..Default::default()
        };
        let def = definition(
            "ibm-sls",
            "3.12.5",
            vec![
                record("cp/sls", "3.12.5", "amd64", ""),
                record("cp/sls", "3.12.5", "s390x", ""),
            ],
        );
        let (planned, skipped) = plan_definition(&def, &default_arches(), Some(&rule), 2);
        assert_eq!(planned.len(), 1);
        assert_eq!(skipped, 0);
        assert!(planned[0].output.to_string_lossy().contains("/s390x/"));
    }
}
