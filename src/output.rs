//! CLI output formatting for all pipeline stages.
//!
//! Output is information-centric: the primary display for every track is
//! its title and position, with filesystem detail indented underneath as
//! secondary context. Skipped directories show up in the same listing with
//! the reason, so a run reads as a content inventory rather than a log.
//!
//! ```text
//! Tracks
//! 001 My Song (3 images)
//!     Source: my-song/
//! 002 Night Drive (1 image)
//!     Source: night-drive/
//! Skipped
//!     demo-take: no WAV master
//!
//! [1/2] My Song
//!     MP3 encoded
//!     my-song/my-song.mp3: uploaded
//!     my-song/my-song.wav: already current (etag 1f2a…)
//! ```
//!
//! Each stage has a `format_*` function returning lines (testable, no I/O)
//! and a `print_*` wrapper that writes them to stdout.

use crate::encode::EncodeOutcome;
use crate::pipeline::BuildSummary;
use crate::publish::{ArtifactOutcome, ArtifactStatus};
use crate::scan::ScanResult;

const INDENT: &str = "    ";

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn count(n: usize, singular: &str, plural: &str) -> String {
    if n == 1 {
        format!("{n} {singular}")
    } else {
        format!("{n} {plural}")
    }
}

// ============================================================================
// Scan
// ============================================================================

pub fn format_scan(result: &ScanResult) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("Tracks".to_string());
    for (i, track) in result.tracks.iter().enumerate() {
        lines.push(format!(
            "{} {} ({})",
            format_index(i + 1),
            track.metadata.title,
            count(track.images.len(), "image", "images")
        ));
        lines.push(format!("{INDENT}Source: {}/", track.slug));
    }
    if result.tracks.is_empty() {
        lines.push(format!("{INDENT}(none)"));
    }

    if !result.skipped.is_empty() {
        lines.push("Skipped".to_string());
        for skipped in &result.skipped {
            lines.push(format!("{INDENT}{}: {}", skipped.slug, skipped.reason));
        }
    }

    lines
}

pub fn print_scan(result: &ScanResult) {
    for line in format_scan(result) {
        println!("{line}");
    }
}

// ============================================================================
// Per-track progress
// ============================================================================

pub fn format_track_header(position: usize, total: usize, title: &str) -> String {
    format!("[{position}/{total}] {title}")
}

pub fn format_encode_outcome(outcome: &EncodeOutcome) -> String {
    match outcome {
        EncodeOutcome::Encoded(_) => format!("{INDENT}MP3 encoded"),
        EncodeOutcome::Fresh(_) => format!("{INDENT}MP3 up to date"),
    }
}

pub fn format_encode_failure(error: &str) -> String {
    format!("{INDENT}MP3 encoding failed, publish skipped: {error}")
}

pub fn format_publish_skipped() -> String {
    format!("{INDENT}Upload skipped (publishing not configured)")
}

pub fn format_artifact_outcome(outcome: &ArtifactOutcome) -> String {
    let detail = match &outcome.status {
        ArtifactStatus::Uploaded(_) => "uploaded".to_string(),
        ArtifactStatus::UploadedBlind(query_error) => {
            format!("uploaded (remote state unknown: {query_error})")
        }
        ArtifactStatus::Current(decision) => match decision.remote_tag() {
            Some(tag) => format!("already current (etag {tag})"),
            None => "already current".to_string(),
        },
        ArtifactStatus::Failed(error) => format!("upload failed: {error}"),
    };
    format!("{INDENT}{}: {}", outcome.key, detail)
}

// ============================================================================
// Summary
// ============================================================================

pub fn format_summary(summary: &BuildSummary) -> Vec<String> {
    let mut lines = vec![format!(
        "Built {} into {}",
        count(summary.track_count, "track", "tracks"),
        summary.output_dir.display()
    )];
    if summary.skipped > 0 {
        lines.push(format!(
            "{INDENT}{} skipped",
            count(summary.skipped, "directory", "directories")
        ));
    }
    if summary.encode_failures > 0 {
        lines.push(format!(
            "{INDENT}{} failed to encode",
            count(summary.encode_failures, "track", "tracks")
        ));
    }
    if summary.uploaded > 0 {
        lines.push(format!(
            "{INDENT}{} uploaded",
            count(summary.uploaded, "artifact", "artifacts")
        ));
    }
    lines
}

pub fn print_summary(summary: &BuildSummary) {
    for line in format_summary(summary) {
        println!("{line}");
    }
}
