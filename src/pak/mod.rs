// src/pak/mod.rs
//! IBM Pak case metadata: definition discovery and loading
//!
//! `oc ibm-pak get` drops case metadata under `~/.ibm-pak/data/cases`, and
//! each downloaded case version carries a `<name>-<version>-images.csv`
//! listing every container image that release needs. A definition here is
//! one such file plus the identity parsed from its name.

pub mod images;
pub mod version;

pub use images::ImageRecord;
pub use version::PakVersion;

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// File name suffix that marks a Pak image list
pub const IMAGES_SUFFIX: &str = "-images.csv";

/// One Pak definition: identity plus its image rows
#[derive(Debug, Clone)]
pub struct PakDefinition {
    pub name: String,
    pub version: PakVersion,
    /// The image list file this definition was loaded from
    pub source: PathBuf,
    pub images: Vec<ImageRecord>,
}

/// Default location of downloaded case metadata
pub fn default_input_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".ibm-pak")
        .join("data")
        .join("cases")
}

/// Find every Pak image list under `input`, sorted by path.
///
/// `input` may also name a single image list file directly. Files that do
/// not end in `-images.csv` are ignored.
pub fn find_definition_files(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        return Err(Error::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("input path '{}' does not exist", input.display()),
        )));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(input) {
        let entry = entry.map_err(|e| Error::IoError(e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.file_name().to_string_lossy().ends_with(IMAGES_SUFFIX) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Load a single definition: identity from the file name, rows from the CSV
pub fn load_definition(path: &Path) -> Result<PakDefinition> {
    let malformed = |reason: String| Error::MalformedInputError {
        path: path.to_path_buf(),
        reason,
    };

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| malformed("missing file name".to_string()))?;

    let (name, version) = parse_identity(&file_name).ok_or_else(|| {
        malformed(format!(
            "file name does not follow <name>-<version>{}",
            IMAGES_SUFFIX
        ))
    })?;
    if name.is_empty() {
        return Err(malformed("empty package name".to_string()));
    }

    let images = images::parse_images_csv(path)?;
    debug!(
        "Loaded Pak definition {} {} with {} image rows",
        name,
        version,
        images.len()
    );

    Ok(PakDefinition {
        name,
        version: PakVersion::new(&version),
        source: path.to_path_buf(),
        images,
    })
}

/// Split `<name>-<version>-images.csv` into name and version.
///
/// Package names themselves contain hyphens (`ibm-sls`, `ibm-mas`), so the
/// version starts at the first hyphen-delimited segment that leads with a
/// digit: `ibm-mas-8.11.15-images.csv` parses as `ibm-mas` / `8.11.15`.
fn parse_identity(file_name: &str) -> Option<(String, String)> {
    let stem = file_name.strip_suffix(IMAGES_SUFFIX)?;
    for (idx, _) in stem.match_indices('-') {
        let version = &stem[idx + 1..];
        if version.starts_with(|c: char| c.is_ascii_digit()) {
            return Some((stem[..idx].to_string(), version.to_string()));
        }
    }
    None
}
