// src/commands/convert.rs

//! Convert Pak definitions into image-set manifests

use anyhow::{bail, Context, Result};
use mirrorpak::convert::{self, ConversionRules, ConvertOptions, DEFAULT_ARCHITECTURES};
use mirrorpak::pak;
use std::path::Path;

/// Convert every Pak definition under the input into the manifest store
///
/// # Arguments
/// * `input` - Case directory or single image list (None = ~/.ibm-pak/data/cases)
/// * `store` - Manifest store root
/// * `arches` - Architectures to generate (empty = amd64, ppc64le, s390x)
/// * `rules_path` - Optional TOML rules file
pub fn cmd_convert(
    input: Option<&Path>,
    store: &Path,
    arches: &[String],
    rules_path: Option<&Path>,
    archive_size: u64,
    dry_run: bool,
) -> Result<()> {
    let input = input
        .map(Path::to_path_buf)
        .unwrap_or_else(pak::default_input_dir);

    let rules = match rules_path {
        Some(path) => ConversionRules::load(path)
            .with_context(|| format!("Failed to load conversion rules from {}", path.display()))?,
        None => ConversionRules::default(),
    };

    let architectures: Vec<String> = if arches.is_empty() {
        DEFAULT_ARCHITECTURES.iter().map(|s| s.to_string()).collect()
    } else {
        arches.to_vec()
    };

    let opts = ConvertOptions {
        input,
        store_root: store.to_path_buf(),
        architectures,
        rules,
        archive_size,
        dry_run,
    };

    let summary = convert::run(&opts).with_context(|| {
        format!(
            "Failed to convert Pak definitions from {}",
            opts.input.display()
        )
    })?;

    // Per-definition failures go to stderr, the summary line to stdout
    if !summary.failures.is_empty() {
        eprintln!("{} definition(s) failed to convert:", summary.failures.len());
        for (path, err) in &summary.failures {
            eprintln!("  {}: {}", path.display(), err);
        }
    }

    let verb = if dry_run { "Planned" } else { "Wrote" };
    println!(
        "{} {} manifest(s) from {} definition(s) ({} empty combination(s) skipped, {} conflict(s))",
        verb, summary.written, summary.discovered, summary.skipped_empty, summary.conflicts
    );

    if !summary.is_success() {
        bail!(
            "{} of {} Pak definitions failed to convert",
            summary.failures.len(),
            summary.discovered
        );
    }

    Ok(())
}
