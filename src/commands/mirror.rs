// src/commands/mirror.rs

//! Mirror one package's images with oc-mirror

use anyhow::{bail, Context, Result};
use mirrorpak::manifest::store::relative_manifest_path;
use mirrorpak::{
    mirror, ImageSetConfiguration, MirrorMode, MirrorProgress, MirrorRequest, PakVersion,
};
use std::path::{Path, PathBuf};
use tracing::info;

/// Conventional registry auth file, used when it exists and none was given
fn default_authfile() -> Option<PathBuf> {
    let path = dirs::home_dir()?.join(".ibm-mas").join("auth.json");
    path.exists().then_some(path)
}

/// Run oc-mirror for one package manifest out of the store
///
/// # Arguments
/// * `config` - Explicit manifest path (None = resolved from the store)
/// * `oc_mirror_bin` - Binary name or path, resolved through PATH
#[allow(clippy::too_many_arguments)]
pub fn cmd_mirror(
    package: &str,
    version: &str,
    store: &Path,
    arch: &str,
    mode: MirrorMode,
    target_registry: Option<String>,
    authfile: Option<PathBuf>,
    config: Option<PathBuf>,
    workspace: PathBuf,
    archive_dir: PathBuf,
    oc_mirror_bin: &Path,
) -> Result<()> {
    let version = PakVersion::new(version);
    let config = config
        .unwrap_or_else(|| store.join(relative_manifest_path(package, version.base(), arch)));
    let config_display = config.display().to_string();

    let manifest = ImageSetConfiguration::from_yaml_file(&config)
        .with_context(|| format!("Failed to read image-set manifest {}", config_display))?;
    let expected = manifest.image_count() as u64;
    if expected == 0 {
        bail!("Manifest {} lists no images to mirror", config_display);
    }

    let binary = which::which(oc_mirror_bin).with_context(|| {
        format!(
            "'{}' not found; install oc-mirror or pass --oc-mirror-bin",
            oc_mirror_bin.display()
        )
    })?;

    let request = MirrorRequest {
        package: package.to_string(),
        version: version.base().to_string(),
        arch: arch.to_string(),
        mode,
        config,
        target_registry,
        authfile: authfile.or_else(default_authfile),
        workspace,
        archive_dir,
        binary,
    };

    info!(
        "Mirroring {} {} {} ({} images, mode {})",
        package,
        version,
        arch,
        expected,
        mode.as_str()
    );
    let progress = MirrorProgress::new(
        expected,
        &format!("Mirroring {} {} {}", package, version.base(), arch),
    );
    progress.set_status("Running oc-mirror...");

    let result = match mirror::run(&request, expected, &progress) {
        Ok(result) => result,
        Err(err) => {
            progress.finish_with_error("Mirror run failed");
            return Err(err)
                .with_context(|| format!("Failed to mirror {} {}", package, version));
        }
    };

    if result.is_complete() {
        progress.finish(&format!(
            "Mirrored {}/{} images",
            result.mirrored, result.images
        ));
        println!(
            "{} {} {}: {}/{} images mirrored",
            package,
            version.base(),
            arch,
            result.mirrored,
            result.images
        );
        Ok(())
    } else {
        progress.finish_with_error(&format!(
            "Mirrored {}/{} images",
            result.mirrored, result.images
        ));
        bail!(
            "Mirror run incomplete for {} {} {}: {}/{} images mirrored",
            package,
            version.base(),
            arch,
            result.mirrored,
            result.images
        );
    }
}
