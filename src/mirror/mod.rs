// src/mirror/mod.rs
//! oc-mirror invocation
//!
//! Runs `oc-mirror --v2` for one package manifest and watches its output.
//! Three transfer modes cover the air-gap workflow: mirror-to-mirror for
//! connected registries, mirror-to-disk to build a portable archive, and
//! disk-to-mirror to load that archive into the disconnected registry.

pub mod output;

use crate::error::{Error, Result};
use crate::progress::MirrorProgress;
use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::{debug, error, info, warn};

/// Transfer direction for a mirror run
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum MirrorMode {
    /// Registry to registry
    M2m,
    /// Registry to local archive
    M2d,
    /// Local archive to registry
    D2m,
}

impl MirrorMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MirrorMode::M2m => "m2m",
            MirrorMode::M2d => "m2d",
            MirrorMode::D2m => "d2m",
        }
    }

    /// Whether the mode pushes into a target registry
    pub fn needs_target(&self) -> bool {
        matches!(self, MirrorMode::M2m | MirrorMode::D2m)
    }
}

/// Everything needed to run oc-mirror once
#[derive(Debug, Clone)]
pub struct MirrorRequest {
    pub package: String,
    pub version: String,
    pub arch: String,
    pub mode: MirrorMode,
    /// Image-set manifest to mirror
    pub config: PathBuf,
    /// Required for modes that push into a registry
    pub target_registry: Option<String>,
    pub authfile: Option<PathBuf>,
    /// Workspace root for m2m runs
    pub workspace: PathBuf,
    /// Archive root for m2d and d2m runs
    pub archive_dir: PathBuf,
    /// Resolved oc-mirror binary
    pub binary: PathBuf,
}

impl MirrorRequest {
    /// Per-package subdirectory shared by the workspace and archive layouts
    fn subdir(&self) -> String {
        format!("{}/{}/{}", self.package, self.arch, self.version)
    }

    /// Arguments passed to oc-mirror
    pub fn command_args(&self) -> Result<Vec<String>> {
        let mut args = vec![
            "--v2".to_string(),
            "--config".to_string(),
            self.config.display().to_string(),
        ];
        if let Some(authfile) = &self.authfile {
            args.push("--authfile".to_string());
            args.push(authfile.display().to_string());
        }

        let target = match &self.target_registry {
            Some(target) => target.as_str(),
            None if self.mode.needs_target() => {
                return Err(Error::MirrorError(format!(
                    "--target-registry is required for {} runs",
                    self.mode.as_str()
                )));
            }
            None => "",
        };

        match self.mode {
            MirrorMode::M2m => {
                args.push("--workspace".to_string());
                args.push(format!(
                    "file://{}/{}",
                    self.workspace.display(),
                    self.subdir()
                ));
                args.push(format!("docker://{}", target));
            }
            MirrorMode::M2d => {
                args.push(format!(
                    "file://{}/{}",
                    self.archive_dir.display(),
                    self.subdir()
                ));
            }
            MirrorMode::D2m => {
                args.push("--from".to_string());
                args.push(format!(
                    "file://{}/{}",
                    self.archive_dir.display(),
                    self.subdir()
                ));
                args.push(format!("docker://{}", target));
            }
        }

        Ok(args)
    }
}

/// Outcome of a mirror run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MirrorResult {
    /// Images the run was asked to mirror
    pub images: u64,
    /// Images oc-mirror reported mirrored
    pub mirrored: u64,
}

impl MirrorResult {
    /// Complete means every requested image made it across
    pub fn is_complete(&self) -> bool {
        self.images != 0 && self.images == self.mirrored
    }
}

/// Which child stream a line arrived on; decides its log level
#[derive(Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

/// Run oc-mirror and scan its output.
///
/// `expected` is the image count from the manifest; the summary line the
/// tool prints near the end is the authoritative result and overrides it.
pub fn run(req: &MirrorRequest, expected: u64, progress: &MirrorProgress) -> Result<MirrorResult> {
    let args = req.command_args()?;
    info!("Running {} {}", req.binary.display(), args.join(" "));

    let mut child = Command::new(&req.binary)
        .args(&args)
        .stdin(Stdio::null()) // CRITICAL: prevent stdin hangs
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            Error::MirrorError(format!("failed to spawn {}: {}", req.binary.display(), e))
        })?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let (out_summary, err_summary) = std::thread::scope(|scope| {
        let out = scope.spawn(|| {
            stdout
                .map(|s| scan_stream(s, Stream::Stdout, progress))
                .unwrap_or_default()
        });
        let err = scope.spawn(|| {
            stderr
                .map(|s| scan_stream(s, Stream::Stderr, progress))
                .unwrap_or_default()
        });
        (out.join().unwrap_or_default(), err.join().unwrap_or_default())
    });

    let status = child
        .wait()
        .map_err(|e| Error::MirrorError(format!("failed to wait for oc-mirror: {}", e)))?;
    if !status.success() {
        return Err(Error::MirrorError(format!("oc-mirror exited with {}", status)));
    }

    match out_summary.or(err_summary) {
        Some((mirrored, total)) => Ok(MirrorResult {
            images: total,
            mirrored,
        }),
        None => {
            warn!("oc-mirror printed no mirror summary; treating the run as incomplete");
            Ok(MirrorResult {
                images: expected,
                mirrored: 0,
            })
        }
    }
}

/// Read one child stream line by line, ticking progress and capturing the
/// summary. Invalid UTF-8 is replaced rather than aborting the scan.
fn scan_stream<R: Read>(source: R, stream: Stream, progress: &MirrorProgress) -> Option<(u64, u64)> {
    let mut reader = BufReader::new(source);
    let mut buf = Vec::new();
    let mut summary = None;

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {}
            Err(err) => {
                debug!("Stopped reading oc-mirror output: {}", err);
                break;
            }
        }

        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end();
        if line.is_empty() || output::is_noise(line) {
            continue;
        }

        if output::is_copy_success(line) {
            progress.image_copied();
        }
        if let Some(counts) = output::parse_summary(line) {
            summary = Some(counts);
        }

        let message = output::strip_log_prefix(line);
        match stream {
            Stream::Stdout => debug!("oc-mirror: {}", message),
            Stream::Stderr => error!("oc-mirror: {}", message),
        }
    }

    summary
}
