// src/lib.rs

//! Mirrorpak
//!
//! Converts IBM Pak package metadata into oc-mirror image-set manifests
//! and drives oc-mirror runs for the resulting packages.
//!
//! # Architecture
//!
//! - Pak definitions: one `<name>-<version>-images.csv` per case release
//! - Manifest store: `packages/<name>/<version>/<arch>/...` YAML files,
//!   written atomically and byte-identical across re-runs
//! - Conversion: pure planning over loaded definitions, fail-soft per
//!   definition, deterministic conflict resolution
//! - Mirroring: oc-mirror subprocess with live output analysis

pub mod convert;
pub mod manifest;
pub mod mirror;
pub mod pak;
pub mod progress;

mod error;

pub use convert::{ConversionRules, ConvertOptions, RunSummary, DEFAULT_ARCHITECTURES};
pub use error::{Error, Result};
pub use manifest::store::ManifestStore;
pub use manifest::{AdditionalImage, ImageSetConfiguration, DEFAULT_ARCHIVE_SIZE};
pub use mirror::{MirrorMode, MirrorRequest, MirrorResult};
pub use pak::{PakDefinition, PakVersion};
pub use progress::MirrorProgress;
