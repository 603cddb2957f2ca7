// src/pak/images.rs
//! Pak image list (CSV) parsing

use crate::error::{Error, Result};
use std::path::Path;

/// Column layout of a Pak `<name>-<version>-images.csv` file:
/// registry, image_name, tag, digest, mtype, os, arch, variant, insecure,
/// digest_source, image_type, groups
pub const CSV_COLUMNS: usize = 12;

const COL_REGISTRY: usize = 0;
const COL_IMAGE_NAME: usize = 1;
const COL_TAG: usize = 2;
const COL_DIGEST: usize = 3;
const COL_ARCH: usize = 6;
const COL_GROUPS: usize = 11;

/// One image row from a Pak image list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    pub registry: String,
    pub name: String,
    pub tag: String,
    pub digest: String,
    /// Architecture column; empty for multi-arch manifest lists
    pub arch: String,
    /// Free-form grouping label, empty for most rows
    pub groups: String,
}

impl ImageRecord {
    /// Fully pinned image reference: `<registry>/<name>:<tag>@<digest>`
    pub fn reference(&self) -> String {
        format!("{}/{}:{}@{}", self.registry, self.name, self.tag, self.digest)
    }

    /// Whether this row applies to the given architecture.
    ///
    /// Rows with an empty arch column are multi-arch manifest lists, which
    /// Pak metadata only materializes under amd64.
    pub fn matches_arch(&self, arch: &str) -> bool {
        self.arch == arch || (self.arch.is_empty() && arch == "amd64")
    }
}

/// Parse a Pak image list.
///
/// The first row is a header and is skipped. A row narrower than the
/// documented layout, or with an empty registry, image name, tag, or
/// digest, makes the whole definition malformed.
pub fn parse_images_csv(path: &Path) -> Result<Vec<ImageRecord>> {
    let malformed = |reason: String| Error::MalformedInputError {
        path: path.to_path_buf(),
        reason,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| malformed(format!("cannot open image list: {}", e)))?;

    let mut images = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| malformed(e.to_string()))?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        if record.len() < CSV_COLUMNS {
            return Err(malformed(format!(
                "line {}: expected {} columns, found {}",
                line,
                CSV_COLUMNS,
                record.len()
            )));
        }

        let field = |idx: usize| record.get(idx).unwrap_or_default().to_string();
        let row = ImageRecord {
            registry: field(COL_REGISTRY),
            name: field(COL_IMAGE_NAME),
            tag: field(COL_TAG),
            digest: field(COL_DIGEST),
            arch: field(COL_ARCH),
            groups: field(COL_GROUPS),
        };

        for (value, label) in [
            (&row.registry, "registry"),
            (&row.name, "image name"),
            (&row.tag, "tag"),
            (&row.digest, "digest"),
        ] {
            if value.is_empty() {
                return Err(malformed(format!("line {}: empty {}", line, label)));
            }
        }

        images.push(row);
    }

    Ok(images)
}
