// tests/common/mod.rs

//! Shared test utilities for integration tests.

use mirrorpak::convert::{ConversionRules, ConvertOptions, DEFAULT_ARCHITECTURES};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Header row of a Pak image list
pub const CSV_HEADER: &str = "registry,image_name,tag,digest,mtype,os,arch,variant,insecure,digest_source,image_type,groups";

/// Build one 12-column image row with the fields conversion reads
pub fn image_row(
    registry: &str,
    name: &str,
    tag: &str,
    digest: &str,
    arch: &str,
    groups: &str,
) -> String {
    format!(
        "{},{},{},{},IMAGE,linux,{},,false,CASE,operandImage,{}",
        registry, name, tag, digest, arch, groups
    )
}

/// Write a Pak definition under `cases/<name>/<version>/` the way
/// `oc ibm-pak get` lays case metadata out. Returns the CSV path.
pub fn write_definition(cases: &Path, name: &str, version: &str, rows: &[String]) -> PathBuf {
    let dir = cases.join(name).join(version);
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(format!("{}-{}-images.csv", name, version));
    write_image_list(&path, rows);
    path
}

/// Write an image list file with the standard header plus the given rows
pub fn write_image_list(path: &Path, rows: &[String]) {
    let mut text = String::from(CSV_HEADER);
    for row in rows {
        text.push('\n');
        text.push_str(row);
    }
    text.push('\n');
    fs::write(path, text).unwrap();
}

/// A cases directory plus a store directory for one test run.
///
/// Returns (TempDir, cases, store) - keep the TempDir alive to prevent cleanup.
pub fn setup_dirs() -> (TempDir, PathBuf, PathBuf) {
    let temp = tempfile::tempdir().unwrap();
    let cases = temp.path().join("cases");
    let store = temp.path().join("store");
    fs::create_dir_all(&cases).unwrap();
    fs::create_dir_all(&store).unwrap();
    (temp, cases, store)
}

/// Default options for a conversion run over `cases` into `store`
pub fn options(cases: &Path, store: &Path) -> ConvertOptions {
    ConvertOptions {
        input: cases.to_path_buf(),
        store_root: store.to_path_buf(),
        architectures: DEFAULT_ARCHITECTURES.iter().map(|s| s.to_string()).collect(),
        rules: ConversionRules::default(),
        archive_size: 2,
        dry_run: false,
    }
}

/// Write an executable stub standing in for oc-mirror
pub fn write_stub_tool(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}", body)).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}
