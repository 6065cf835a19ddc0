//! The track record shared across all pipeline stages.
//!
//! A [`Track`] is one published unit of content: the metadata and body from
//! its markdown file, the lossless WAV master, the ordered image list, the
//! derived MP3 artifact, and the remote URLs once published. Tracks are
//! constructed during the scan, mutated in place by the encode and publish
//! stages, consumed read-only by the renderer, and discarded at process exit.
//! Nothing persists between runs beyond the filesystem and the remote store.
//!
//! ## Validity invariant
//!
//! A `Track` only exists in the fully valid state: mandatory title, exactly
//! one WAV master, at least one image. Directories that fail any of these are
//! excluded during the scan and never reach this type, so the renderer never
//! sees a partially-populated record.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Extension of the derived compressed artifact.
pub const COMPRESSED_EXT: &str = "mp3";
/// Extension of the lossless master.
pub const SOURCE_EXT: &str = "wav";

/// Front-matter fields of a track's markdown file.
///
/// Every field except `title` is optional with an explicit default; unknown
/// keys are ignored so authors can keep private notes in the header.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackMetadata {
    /// Mandatory display title. An empty title excludes the track.
    pub title: String,
    /// Release year, e.g. `2024`.
    pub year: Option<u16>,
    /// Free-form category, e.g. `ambient` or `film score`.
    pub category: Option<String>,
    /// Workflow status. Default: `final`.
    pub status: String,
    /// Free-form tag list. Default: empty.
    pub tags: Vec<String>,
    /// Creation date as written by the author (not parsed).
    pub created: Option<String>,
    /// Last-modified date as written by the author (not parsed).
    pub modified: Option<String>,
}

impl Default for TrackMetadata {
    fn default() -> Self {
        Self {
            title: String::new(),
            year: None,
            category: None,
            status: "final".to_string(),
            tags: Vec::new(),
            created: None,
            modified: None,
        }
    }
}

/// One track: a source directory plus everything derived from it.
#[derive(Debug, Clone, Serialize)]
pub struct Track {
    /// Directory-name-derived identifier; local folder name and remote key
    /// prefix.
    pub slug: String,
    /// Absolute or CLI-relative path of the track directory.
    pub directory: PathBuf,
    /// Parsed front matter.
    pub metadata: TrackMetadata,
    /// Markdown body rendered to HTML.
    pub body_html: String,
    /// The single lossless WAV master.
    pub source_audio_path: PathBuf,
    /// Derived MP3; set by the transcoder, absent until encoding succeeds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compressed_audio_path: Option<PathBuf>,
    /// All images in the directory, sorted by filename. Never empty; the
    /// first entry is the cover.
    pub images: Vec<PathBuf>,
    /// Public URL of the published MP3; set only after a successful publish
    /// decision (upload performed or remote already current).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_compressed_url: Option<String>,
    /// Public URL of the published WAV.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_source_url: Option<String>,
}

impl Track {
    /// The designated cover: the lexicographically first image.
    pub fn cover_path(&self) -> &Path {
        &self.images[0]
    }

    /// Output filename of the cover, slug-prefixed to avoid collisions
    /// between tracks (`my-song-cover.jpg`).
    pub fn cover_filename(&self) -> String {
        format!("{}-{}", self.slug, file_name(&self.images[0]))
    }

    /// Slug-prefixed output filenames for every image, in cover-first order.
    pub fn image_filenames(&self) -> Vec<String> {
        self.images
            .iter()
            .map(|p| format!("{}-{}", self.slug, file_name(p)))
            .collect()
    }

    /// Remote key of the compressed artifact: `<slug>/<slug>.mp3`.
    pub fn compressed_key(&self) -> String {
        format!("{}/{}.{}", self.slug, self.slug, COMPRESSED_EXT)
    }

    /// Remote key of the lossless master: `<slug>/<slug>.wav`.
    pub fn source_key(&self) -> String {
        format!("{}/{}.{}", self.slug, self.slug, SOURCE_EXT)
    }

    /// Local path where the transcoder writes the compressed artifact.
    pub fn compressed_output_path(&self) -> PathBuf {
        self.directory
            .join(format!("{}.{}", self.slug, COMPRESSED_EXT))
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}
