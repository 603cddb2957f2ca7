// src/manifest/store.rs
//! Manifest store layout and atomic writes
//!
//! Manifests live at `packages/<name>/<version>/<arch>/<name>-<version>-<arch>.yaml`
//! relative to the store root, one file per package, version, and
//! architecture. Writes go through a temp file in the final directory
//! followed by a rename, so a crashed run never leaves a partial manifest
//! behind.

use crate::error::{Error, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory under the store root that holds generated manifests
pub const PACKAGES_DIR: &str = "packages";

/// Store path of a manifest, relative to the store root
pub fn relative_manifest_path(name: &str, version: &str, arch: &str) -> PathBuf {
    PathBuf::from(PACKAGES_DIR)
        .join(name)
        .join(version)
        .join(arch)
        .join(format!("{}-{}-{}.yaml", name, version, arch))
}

/// A manifest store rooted at a directory
#[derive(Debug, Clone)]
pub struct ManifestStore {
    root: PathBuf,
}

impl ManifestStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of the manifest for one package, version, and arch
    pub fn manifest_path(&self, name: &str, version: &str, arch: &str) -> PathBuf {
        self.root.join(relative_manifest_path(name, version, arch))
    }

    /// Write a manifest atomically: temp file in the target directory,
    /// fsync, then rename over the final path.
    pub fn write(&self, path: &Path, contents: &str) -> Result<()> {
        let write_err = |source: std::io::Error| Error::WriteError {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let temp_path = path.with_extension("yaml.tmp");
        let mut file = File::create(&temp_path).map_err(write_err)?;
        file.write_all(contents.as_bytes()).map_err(write_err)?;
        file.sync_all().map_err(write_err)?;
        fs::rename(&temp_path, path).map_err(write_err)?;

        debug!("Wrote manifest {} ({} bytes)", path.display(), contents.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_follows_store_convention() {
        assert_eq!(
            relative_manifest_path("ibm-sls", "3.12.5", "amd64"),
            PathBuf::from("packages/ibm-sls/3.12.5/amd64/ibm-sls-3.12.5-amd64.yaml")
        );
    }

    #[test]
    fn write_creates_directories_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = ManifestStore::new(dir.path());
        let path = store.manifest_path("ibm-sls", "3.12.5", "amd64");

        store.write(&path, "kind: ImageSetConfiguration\n").unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "kind: ImageSetConfiguration\n"
        );
        assert!(!path.with_extension("yaml.tmp").exists());
    }

    #[test]
    fn write_replaces_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let store = ManifestStore::new(dir.path());
        let path = store.manifest_path("ibm-sls", "3.12.5", "amd64");

        store.write(&path, "first\n").unwrap();
        store.write(&path, "second\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second\n");
    }

    #[test]
    fn unwritable_target_reports_write_error() {
        let dir = tempfile::tempdir().unwrap();
        // A file where a directory is needed forces create_dir_all to fail
        let blocker = dir.path().join("packages");
        fs::write(&blocker, "not a directory").unwrap();

        let store = ManifestStore::new(dir.path());
        let path = store.manifest_path("ibm-sls", "3.12.5", "amd64");
        let err = store.write(&path, "x\n").unwrap_err();
        assert!(matches!(err, Error::WriteError { .. }));
    }
}
