// src/cli.rs
//! CLI definitions for mirrorpak
//!
//! This module contains all command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use mirrorpak::MirrorMode;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mirrorpak")]
#[command(version)]
#[command(
    about = "Generate oc-mirror image-set manifests from IBM Pak metadata and drive air-gapped mirroring",
    long_about = None
)]
pub struct Cli {
    /// Write log output to a file instead of stderr
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert IBM Pak image lists into image-set manifests
    Convert {
        /// Pak case directory or a single <name>-<version>-images.csv file
        /// [default: ~/.ibm-pak/data/cases]
        #[arg(short, long, value_name = "PATH")]
        input: Option<PathBuf>,

        /// Manifest store root directory
        #[arg(short, long, value_name = "DIR", default_value = ".")]
        store: PathBuf,

        /// Architecture to generate manifests for (repeatable)
        /// [default: amd64 ppc64le s390x]
        #[arg(short, long, value_name = "ARCH")]
        arch: Vec<String>,

        /// TOML file with per-package conversion rules
        #[arg(long, value_name = "PATH")]
        rules: Option<PathBuf>,

        /// archiveSize written into each manifest, in GiB
        #[arg(long, value_name = "GIB", default_value_t = mirrorpak::DEFAULT_ARCHIVE_SIZE)]
        archive_size: u64,

        /// Show what would be written without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Mirror one package's images with oc-mirror
    Mirror {
        /// Package name, e.g. ibm-sls
        package: String,

        /// Package version, e.g. 3.12.5
        version: String,

        /// Manifest store root directory
        #[arg(short, long, value_name = "DIR", default_value = ".")]
        store: PathBuf,

        /// Architecture to mirror
        #[arg(short, long, default_value = "amd64")]
        arch: String,

        /// Transfer mode
        #[arg(short, long, value_enum)]
        mode: MirrorMode,

        /// Target registry for m2m and d2m, e.g. registry.example.com/mirror
        #[arg(short, long, value_name = "REGISTRY")]
        target_registry: Option<String>,

        /// Registry auth file [default: ~/.ibm-mas/auth.json if present]
        #[arg(long, value_name = "PATH")]
        authfile: Option<PathBuf>,

        /// Image-set manifest to mirror [default: resolved from the store]
        #[arg(short, long, value_name = "PATH")]
        config: Option<PathBuf>,

        /// oc-mirror workspace root for m2m
        #[arg(long, value_name = "DIR", default_value = "workspace")]
        workspace: PathBuf,

        /// Archive root for m2d and d2m
        #[arg(long, value_name = "DIR", default_value = "output-dir")]
        archive_dir: PathBuf,

        /// oc-mirror binary to invoke
        #[arg(long, value_name = "PATH", default_value = "oc-mirror")]
        oc_mirror_bin: PathBuf,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
