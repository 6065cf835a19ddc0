//! Build orchestration.
//!
//! Drives the full sequence: encoder dependency check → track scan →
//! per-track encode and publish → site render. Execution is single-threaded
//! and strictly sequential; each track runs to completion before the next
//! begins, and each [`Track`] is owned by the loop iteration processing it.
//!
//! ## Failure classification
//!
//! - *Fatal* (the build aborts): encoder unavailable, zero valid tracks,
//!   render failure.
//! - *Per-track* (logged, the track is excluded or left unpublished, the
//!   build continues): invalid directories found during the scan, encoder
//!   errors and timeouts, store query and transport failures.
//!
//! ## Static-only mode
//!
//! `static_only` bypasses encode and publish entirely and just re-renders
//! the site. The encoder probe is skipped too: a static rebuild must work
//! on a machine with neither ffmpeg nor network. Remote URLs cannot be
//! recovered in this mode (there is no persistent publish manifest), so
//! detail pages omit the player and download link.

use crate::config::Config;
use crate::encode::{self, AudioEncoder, EncodeError, FfmpegEncoder};
use crate::generate::{self, GenerateError};
use crate::output;
use crate::publish::Publisher;
use crate::scan::{self, ScanError};
use crate::store::{ObjectStore, S3Store};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("{0} (install ffmpeg)")]
    EncoderUnavailable(EncodeError),
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("no valid tracks found")]
    NoValidTracks,
    #[error("render failed: {0}")]
    Render(#[from] GenerateError),
}

/// Where to read from and write to, plus the run mode.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub tracks_dir: PathBuf,
    pub output_dir: PathBuf,
    pub assets_dir: PathBuf,
    /// Skip encode and publish; only re-render the site.
    pub static_only: bool,
}

/// Counters reported after a successful build.
#[derive(Debug)]
pub struct BuildSummary {
    pub track_count: usize,
    pub skipped: usize,
    pub encode_failures: usize,
    pub uploaded: usize,
    pub track_pages: usize,
    pub output_dir: PathBuf,
}

/// Run the full build with the production encoder and store.
pub fn build(config: &Config, options: &BuildOptions) -> Result<BuildSummary, BuildError> {
    let encoder = FfmpegEncoder::new();
    let store = if !options.static_only && config.publishing_enabled() {
        match S3Store::new(config) {
            Ok(store) => Some(store),
            // Same treatment as incomplete configuration: warn, build the
            // site, upload nothing.
            Err(e) => {
                eprintln!("Warning: could not initialize object store: {e}");
                None
            }
        }
    } else {
        None
    };
    build_with(
        &encoder,
        store.as_ref().map(|s| s as &dyn ObjectStore),
        config,
        options,
    )
}

/// Run the build with explicit backends (tests substitute mocks here).
pub fn build_with(
    encoder: &dyn AudioEncoder,
    store: Option<&dyn ObjectStore>,
    config: &Config,
    options: &BuildOptions,
) -> Result<BuildSummary, BuildError> {
    if !options.static_only {
        encoder.probe().map_err(BuildError::EncoderUnavailable)?;
    }

    let scan_result = scan::scan_tracks(&options.tracks_dir)?;
    output::print_scan(&scan_result);

    let mut tracks = scan_result.tracks;
    if tracks.is_empty() {
        return Err(BuildError::NoValidTracks);
    }

    let publisher = match (store, &config.s3_base_url) {
        (Some(store), Some(base_url)) => Some(Publisher { store, base_url }),
        _ => None,
    };

    let mut encode_failures = 0;
    let mut uploaded = 0;

    if !options.static_only {
        let total = tracks.len();
        for (i, track) in tracks.iter_mut().enumerate() {
            println!(
                "{}",
                output::format_track_header(i + 1, total, &track.metadata.title)
            );

            match encode::encode_track(encoder, track, config.mp3_bitrate, config.mp3_quality) {
                Ok(outcome) => {
                    println!("{}", output::format_encode_outcome(&outcome));
                    track.compressed_audio_path = Some(outcome.path().clone());
                }
                Err(e) => {
                    // The track stays in the site, just without fresh audio.
                    println!("{}", output::format_encode_failure(&e.to_string()));
                    encode_failures += 1;
                    continue;
                }
            }

            match &publisher {
                Some(publisher) => {
                    for outcome in publisher.publish_track(track) {
                        println!("{}", output::format_artifact_outcome(&outcome));
                        if outcome.status.published() {
                            uploaded += 1;
                        }
                    }
                }
                None => println!("{}", output::format_publish_skipped()),
            }
        }
    }

    let stats = generate::generate(&tracks, config, &options.output_dir, &options.assets_dir)?;

    Ok(BuildSummary {
        track_count: tracks.len(),
        skipped: scan_result.skipped.len(),
        encode_failures,
        uploaded,
        track_pages: stats.track_pages,
        output_dir: options.output_dir.clone(),
    })
}
