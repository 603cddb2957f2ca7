// src/manifest/mod.rs
//! oc-mirror ImageSetConfiguration manifests

pub mod store;

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// API version oc-mirror accepts for image-set configurations
pub const API_VERSION: &str = "mirror.openshift.io/v1alpha2";
/// Manifest kind
pub const KIND: &str = "ImageSetConfiguration";
/// Default image archive chunk size in GiB
pub const DEFAULT_ARCHIVE_SIZE: u64 = 2;

/// An oc-mirror image-set configuration.
///
/// Only the `additionalImages` form is produced here: every image is fully
/// pinned by tag and digest, so no catalog or platform resolution happens
/// at mirror time. Deserialization is lenient because operators sometimes
/// point the mirror command at hand-written configurations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSetConfiguration {
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_kind")]
    pub kind: String,
    #[serde(default = "default_archive_size")]
    pub archive_size: u64,
    #[serde(default)]
    pub mirror: MirrorSection,
}

/// The `mirror:` section of an image-set configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MirrorSection {
    #[serde(default)]
    pub additional_images: Vec<AdditionalImage>,
}

/// One pinned image entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionalImage {
    pub name: String,
}

fn default_api_version() -> String {
    API_VERSION.to_string()
}

fn default_kind() -> String {
    KIND.to_string()
}

fn default_archive_size() -> u64 {
    DEFAULT_ARCHIVE_SIZE
}

impl ImageSetConfiguration {
    /// Build a manifest around a pinned image list
    pub fn new(images: Vec<AdditionalImage>, archive_size: u64) -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            archive_size,
            mirror: MirrorSection {
                additional_images: images,
            },
        }
    }

    /// Serialize to the YAML document stored in the manifest store
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Read a manifest back from a file
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&text)?)
    }

    /// Number of images the manifest pins
    pub fn image_count(&self) -> usize {
        self.mirror.additional_images.len()
    }
}
