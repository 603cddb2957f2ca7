// src/mirror/output.rs
//! oc-mirror output analysis
//!
//! oc-mirror is chatty: banner lines, per-image copy logs behind a
//! `[worker] 2025/05/30 10:01:02` style prefix, and one summary line near
//! the end of the run. These helpers turn that stream into progress ticks
//! and a final mirrored/total count.

use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;

/// Banner lines that add nothing to a log file (matched case-insensitively)
const NOISE_PATTERNS: [&str; 3] = [
    "hello, welcome to oc-mirror",
    "setting up the environment for you",
    "using digest to pull, but tag only for mirroring",
];

struct Patterns {
    timestamp: Regex,
    summary: Regex,
    noise: Regex,
}

static PATTERNS: LazyLock<Patterns> = LazyLock::new(|| Patterns {
    timestamp: Regex::new(r"^.*?\d{4}/\d{2}/\d{2}\s+\d{2}:\d{2}:\d{2}").unwrap(),
    summary: Regex::new(r"(\d+)\s+/\s+(\d+)\s+additional images mirrored successfully").unwrap(),
    noise: RegexBuilder::new(
        &NOISE_PATTERNS
            .iter()
            .map(|p| regex::escape(p))
            .collect::<Vec<_>>()
            .join("|"),
    )
    .case_insensitive(true)
    .build()
    .unwrap(),
});

/// Strip the `[worker] 2025/05/30 10:01:02` style prefix from a line.
///
/// Only lines carrying both a bracketed tag and a timestamp are touched;
/// anything else comes back unchanged.
pub fn strip_log_prefix(line: &str) -> &str {
    if PATTERNS.timestamp.is_match(line) {
        if let Some((head, tail)) = line.split_once(": ") {
            if head.contains('[') {
                return tail;
            }
        }
    }
    line
}

/// Whether the line is a banner worth dropping from logs
pub fn is_noise(line: &str) -> bool {
    PATTERNS.noise.is_match(line)
}

/// Whether the line reports one image finishing its copy
pub fn is_copy_success(line: &str) -> bool {
    line.contains("Success copying")
}

/// Parse the end-of-run summary line into `(mirrored, total)`
pub fn parse_summary(line: &str) -> Option<(u64, u64)> {
    let caps = PATTERNS.summary.captures(line)?;
    let mirrored = caps.get(1)?.as_str().parse().ok()?;
    let total = caps.get(2)?.as_str().parse().ok()?;
    Some((mirrored, total))
}
