//! Track-directory scanning.
//!
//! Walks the tracks directory and builds one valid [`Track`] per
//! subdirectory. A track directory looks like:
//!
//! ```text
//! tracks/
//! ├── my-song/
//! │   ├── info.md           # front matter + markdown body (exactly one .md)
//! │   ├── master.wav        # the lossless master (exactly one expected)
//! │   ├── cover.jpg         # first sorted image becomes the cover
//! │   └── studio.png        # further images feed the detail-page carousel
//! └── example-track/        # shipped starter content, always skipped
//! ```
//!
//! ## Validation
//!
//! A directory yields a track only when all three hold:
//! - the content file parses and carries a title,
//! - a WAV master is present (case-insensitive extension),
//! - at least one image is present (case-insensitive, fixed extension set).
//!
//! Anything else excludes just that directory: the reason is recorded as a
//! [`SkippedTrack`] and the scan continues. Image order is lexicographic by
//! filename and nothing else, so the cover choice is deterministic across
//! machines and runs.

use crate::frontmatter::{self, FrontMatterError};
use crate::track::Track;
use serde::{Serialize, Serializer};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("tracks directory not found: {0}")]
    TracksDirMissing(PathBuf),
}

/// Accepted image extensions, matched case-insensitively.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Extension of the lossless master, matched case-insensitively.
const AUDIO_EXTENSION: &str = "wav";

/// Shipped starter content; never built or published.
const EXAMPLE_TRACK_DIR: &str = "example-track";

/// Result of scanning the tracks directory.
#[derive(Debug, Serialize)]
pub struct ScanResult {
    /// Fully valid tracks, in directory order.
    pub tracks: Vec<Track>,
    /// Directories excluded from the build, with the reason.
    pub skipped: Vec<SkippedTrack>,
}

/// A track directory excluded from the build.
#[derive(Debug, Serialize)]
pub struct SkippedTrack {
    pub slug: String,
    pub reason: SkipReason,
}

/// Why a track directory was excluded.
#[derive(Error, Debug)]
pub enum SkipReason {
    #[error("no content (.md) file")]
    NoContentFile,
    #[error("unreadable content file: {0}")]
    UnreadableContent(std::io::Error),
    #[error("{0}")]
    FrontMatter(#[from] FrontMatterError),
    #[error("no WAV master")]
    NoAudioMaster,
    #[error("no images")]
    NoImages,
}

impl Serialize for SkipReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Scan the tracks directory into valid tracks and skip records.
///
/// Only the absence of the tracks directory itself (or an IO failure listing
/// it) is an error; anything wrong with an individual track directory lands
/// in [`ScanResult::skipped`].
pub fn scan_tracks(tracks_dir: &Path) -> Result<ScanResult, ScanError> {
    if !tracks_dir.is_dir() {
        return Err(ScanError::TracksDirMissing(tracks_dir.to_path_buf()));
    }

    let mut dirs: Vec<PathBuf> = fs::read_dir(tracks_dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .filter(|p| {
            let name = dir_name(p);
            !name.starts_with('.') && name != EXAMPLE_TRACK_DIR
        })
        .collect();
    dirs.sort();

    let mut tracks = Vec::new();
    let mut skipped = Vec::new();

    for dir in dirs {
        let slug = dir_name(&dir);
        match load_track(&dir, &slug) {
            Ok(track) => tracks.push(track),
            Err(reason) => skipped.push(SkippedTrack { slug, reason }),
        }
    }

    Ok(ScanResult { tracks, skipped })
}

/// Build one track from its directory, or explain why it can't be built.
fn load_track(dir: &Path, slug: &str) -> Result<Track, SkipReason> {
    let content_path = find_content_file(dir).ok_or(SkipReason::NoContentFile)?;
    let content = fs::read_to_string(&content_path).map_err(SkipReason::UnreadableContent)?;
    let document = frontmatter::parse(&content)?;

    let source_audio_path = find_audio_master(dir).ok_or(SkipReason::NoAudioMaster)?;

    let images = find_images(dir);
    if images.is_empty() {
        return Err(SkipReason::NoImages);
    }

    Ok(Track {
        slug: slug.to_string(),
        directory: dir.to_path_buf(),
        metadata: document.metadata,
        body_html: document.body_html,
        source_audio_path,
        compressed_audio_path: None,
        images,
        remote_compressed_url: None,
        remote_source_url: None,
    })
}

/// The track's content file: the first sorted `.md` in the directory.
fn find_content_file(dir: &Path) -> Option<PathBuf> {
    files_with_extensions(dir, &["md"]).into_iter().next()
}

/// The lossless master: the first sorted `.wav` in the directory.
fn find_audio_master(dir: &Path) -> Option<PathBuf> {
    files_with_extensions(dir, &[AUDIO_EXTENSION])
        .into_iter()
        .next()
}

/// All images in the directory, sorted lexicographically by filename.
fn find_images(dir: &Path) -> Vec<PathBuf> {
    files_with_extensions(dir, IMAGE_EXTENSIONS)
}

/// Files in `dir` whose extension case-insensitively matches one of `exts`,
/// sorted by filename.
fn files_with_extensions(dir: &Path, exts: &[&str]) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = match fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .filter(|p| {
                p.extension()
                    .map(|e| {
                        let ext = e.to_string_lossy().to_lowercase();
                        exts.contains(&ext.as_str())
                    })
                    .unwrap_or(false)
            })
            .collect(),
        Err(_) => Vec::new(),
    };
    files.sort_by_key(|p| p.file_name().map(|n| n.to_os_string()));
    files
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{write_track_dir, TrackDirSpec};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn scans_valid_track() {
        let tmp = TempDir::new().unwrap();
        write_track_dir(tmp.path(), &TrackDirSpec::valid("my-song"));

        let result = scan_tracks(tmp.path()).unwrap();

        assert_eq!(result.tracks.len(), 1);
        assert!(result.skipped.is_empty());
        let track = &result.tracks[0];
        assert_eq!(track.slug, "my-song");
        assert_eq!(track.metadata.title, "My Song");
        assert!(track.source_audio_path.ends_with("master.wav"));
        assert!(track.compressed_audio_path.is_none());
        assert!(track.remote_compressed_url.is_none());
    }

    #[test]
    fn missing_tracks_dir_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = scan_tracks(&tmp.path().join("nope"));
        assert!(matches!(result, Err(ScanError::TracksDirMissing(_))));
    }

    #[test]
    fn tracks_sorted_by_directory_name() {
        let tmp = TempDir::new().unwrap();
        write_track_dir(tmp.path(), &TrackDirSpec::valid("zebra"));
        write_track_dir(tmp.path(), &TrackDirSpec::valid("alpha"));

        let result = scan_tracks(tmp.path()).unwrap();
        let slugs: Vec<&str> = result.tracks.iter().map(|t| t.slug.as_str()).collect();
        assert_eq!(slugs, vec!["alpha", "zebra"]);
    }

    #[test]
    fn example_track_always_skipped_silently() {
        let tmp = TempDir::new().unwrap();
        write_track_dir(tmp.path(), &TrackDirSpec::valid("example-track"));
        write_track_dir(tmp.path(), &TrackDirSpec::valid("real-song"));

        let result = scan_tracks(tmp.path()).unwrap();
        assert_eq!(result.tracks.len(), 1);
        assert_eq!(result.tracks[0].slug, "real-song");
        assert!(result.skipped.is_empty());
    }

    #[test]
    fn loose_files_in_tracks_dir_ignored() {
        let tmp = TempDir::new().unwrap();
        write_track_dir(tmp.path(), &TrackDirSpec::valid("my-song"));
        fs::write(tmp.path().join("README.md"), "not a track").unwrap();

        let result = scan_tracks(tmp.path()).unwrap();
        assert_eq!(result.tracks.len(), 1);
        assert!(result.skipped.is_empty());
    }

    #[test]
    fn missing_content_file_excludes_track() {
        let tmp = TempDir::new().unwrap();
        let mut spec = TrackDirSpec::valid("no-md");
        spec.content = None;
        write_track_dir(tmp.path(), &spec);

        let result = scan_tracks(tmp.path()).unwrap();
        assert!(result.tracks.is_empty());
        assert!(matches!(
            result.skipped[0].reason,
            SkipReason::NoContentFile
        ));
    }

    #[test]
    fn missing_title_excludes_track() {
        let tmp = TempDir::new().unwrap();
        let mut spec = TrackDirSpec::valid("untitled");
        spec.content = Some("---\nyear: 2024\n---\nbody".to_string());
        write_track_dir(tmp.path(), &spec);

        let result = scan_tracks(tmp.path()).unwrap();
        assert!(result.tracks.is_empty());
        assert!(matches!(
            result.skipped[0].reason,
            SkipReason::FrontMatter(FrontMatterError::MissingTitle)
        ));
    }

    #[test]
    fn malformed_front_matter_excludes_track() {
        let tmp = TempDir::new().unwrap();
        let mut spec = TrackDirSpec::valid("broken");
        spec.content = Some("no front matter here".to_string());
        write_track_dir(tmp.path(), &spec);

        let result = scan_tracks(tmp.path()).unwrap();
        assert!(matches!(
            result.skipped[0].reason,
            SkipReason::FrontMatter(FrontMatterError::MissingDelimiter)
        ));
    }

    #[test]
    fn missing_wav_excludes_track_despite_valid_metadata() {
        let tmp = TempDir::new().unwrap();
        let mut spec = TrackDirSpec::valid("images-only");
        spec.wav = None;
        spec.images = vec!["cover.jpg".into(), "back.jpg".into()];
        write_track_dir(tmp.path(), &spec);

        let result = scan_tracks(tmp.path()).unwrap();
        assert!(result.tracks.is_empty());
        assert!(matches!(
            result.skipped[0].reason,
            SkipReason::NoAudioMaster
        ));
    }

    #[test]
    fn missing_images_excludes_track() {
        let tmp = TempDir::new().unwrap();
        let mut spec = TrackDirSpec::valid("coverless");
        spec.images = vec![];
        write_track_dir(tmp.path(), &spec);

        let result = scan_tracks(tmp.path()).unwrap();
        assert!(matches!(result.skipped[0].reason, SkipReason::NoImages));
    }

    #[test]
    fn one_bad_track_does_not_stop_the_scan() {
        let tmp = TempDir::new().unwrap();
        let mut bad = TrackDirSpec::valid("bad");
        bad.wav = None;
        write_track_dir(tmp.path(), &bad);
        write_track_dir(tmp.path(), &TrackDirSpec::valid("good"));

        let result = scan_tracks(tmp.path()).unwrap();
        assert_eq!(result.tracks.len(), 1);
        assert_eq!(result.tracks[0].slug, "good");
        assert_eq!(result.skipped.len(), 1);
        assert_eq!(result.skipped[0].slug, "bad");
    }

    #[test]
    fn wav_extension_matched_case_insensitively() {
        let tmp = TempDir::new().unwrap();
        let mut spec = TrackDirSpec::valid("shouty");
        spec.wav = Some("MASTER.WAV".to_string());
        write_track_dir(tmp.path(), &spec);

        let result = scan_tracks(tmp.path()).unwrap();
        assert_eq!(result.tracks.len(), 1);
        assert!(result.tracks[0].source_audio_path.ends_with("MASTER.WAV"));
    }

    #[test]
    fn images_sorted_and_cover_is_first() {
        let tmp = TempDir::new().unwrap();
        let mut spec = TrackDirSpec::valid("sorted");
        spec.images = vec![
            "studio.png".into(),
            "Artwork.JPEG".into(),
            "back.webp".into(),
        ];
        write_track_dir(tmp.path(), &spec);

        let result = scan_tracks(tmp.path()).unwrap();
        let names: Vec<String> = result.tracks[0]
            .images
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        // Byte order: uppercase sorts before lowercase.
        assert_eq!(names, vec!["Artwork.JPEG", "back.webp", "studio.png"]);
        assert_eq!(
            result.tracks[0].cover_filename(),
            "sorted-Artwork.JPEG"
        );
    }

    #[test]
    fn non_image_files_not_collected() {
        let tmp = TempDir::new().unwrap();
        let spec = TrackDirSpec::valid("tidy");
        let dir = write_track_dir(tmp.path(), &spec);
        fs::write(dir.join("notes.txt"), "session notes").unwrap();
        fs::write(dir.join("session.flac"), "other audio").unwrap();

        let result = scan_tracks(tmp.path()).unwrap();
        assert_eq!(result.tracks[0].images.len(), 1);
    }

    #[test]
    fn body_markdown_rendered() {
        let tmp = TempDir::new().unwrap();
        let mut spec = TrackDirSpec::valid("noted");
        spec.content =
            Some("---\ntitle: Noted\n---\nMixed at *home*.".to_string());
        write_track_dir(tmp.path(), &spec);

        let result = scan_tracks(tmp.path()).unwrap();
        assert!(result.tracks[0].body_html.contains("<em>home</em>"));
    }
}
