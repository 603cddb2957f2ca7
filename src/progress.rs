// src/progress.rs
//! Progress display for mirror runs
//!
//! Shows an overall bar tracking images copied with a status line below
//! for the current oc-mirror phase. All methods take `&self`, so the
//! display can be shared with the output reader threads.

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress tracker for one oc-mirror run
pub struct MirrorProgress {
    multi: MultiProgress,
    overall: ProgressBar,
    status: ProgressBar,
}

impl MirrorProgress {
    /// Create a tracker for a run expected to copy `total_images` images
    ///
    /// # Arguments
    /// * `total_images` - Image count from the manifest being mirrored
    /// * `operation` - Description shown next to the bar (e.g. "Mirroring ibm-sls 3.12.5 amd64")
    pub fn new(total_images: u64, operation: &str) -> Self {
        let multi = MultiProgress::new();

        // Overall progress bar
        let overall = ProgressBar::new(total_images);
        overall.set_style(
            ProgressStyle::default_bar()
                .template("{msg} ({pos}/{len}) [{bar:40.green/dim}] {percent}%")
                .expect("Invalid progress bar template")
                .progress_chars("##-"),
        );
        overall.set_message(operation.to_string());

        // Status line below (spinner with message)
        let status = ProgressBar::new_spinner();
        status.set_style(
            ProgressStyle::default_spinner()
                .template("  {spinner:.cyan} {msg}")
                .expect("Invalid spinner template"),
        );
        status.enable_steady_tick(Duration::from_millis(100));

        let overall = multi.add(overall);
        let status = multi.add(status);

        Self {
            multi,
            overall,
            status,
        }
    }

    /// Create a tracker that draws nothing; used by tests and log-only runs
    pub fn hidden() -> Self {
        let multi = MultiProgress::new();
        let overall = multi.add(ProgressBar::hidden());
        let status = multi.add(ProgressBar::hidden());
        Self {
            multi,
            overall,
            status,
        }
    }

    /// Update the status message for the current phase
    pub fn set_status(&self, message: &str) {
        self.status.set_message(message.to_string());
    }

    /// Advance the overall bar by one copied image
    pub fn image_copied(&self) {
        self.overall.inc(1);
    }

    /// Finish with a success message
    pub fn finish(&self, message: &str) {
        self.status.finish_and_clear();
        self.overall.finish_with_message(message.to_string());
    }

    /// Finish with a failure message, leaving the bar where it stopped
    pub fn finish_with_error(&self, message: &str) {
        self.status.finish_and_clear();
        self.overall.abandon_with_message(message.to_string());
    }

    /// Get the MultiProgress handle for adding custom progress bars
    pub fn multi(&self) -> &MultiProgress {
        &self.multi
    }
}
