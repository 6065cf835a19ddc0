//! Shared test utilities for the trackfolio test suite.
//!
//! Two kinds of fixtures:
//!
//! - [`TrackDirSpec`] + [`write_track_dir`] synthesize track directories on
//!   disk for scan and pipeline tests. Start from [`TrackDirSpec::valid`]
//!   and knock out the piece the test is about.
//! - [`sample_track`] builds an in-memory [`Track`] for renderer, publish,
//!   and key-scheme tests that never touch the filesystem.

use crate::track::{Track, TrackMetadata};
use std::fs;
use std::path::{Path, PathBuf};

/// Recipe for a synthesized track directory.
pub struct TrackDirSpec {
    pub slug: String,
    /// Contents of `info.md`; `None` writes no content file.
    pub content: Option<String>,
    /// Filename of the WAV master; `None` writes no audio.
    pub wav: Option<String>,
    /// Image filenames to create.
    pub images: Vec<String>,
}

impl TrackDirSpec {
    /// A fully valid track: titled front matter, `master.wav`, `cover.jpg`.
    pub fn valid(slug: &str) -> Self {
        Self {
            slug: slug.to_string(),
            content: Some(format!(
                "---\ntitle: {}\n---\nLiner notes.",
                title_case(slug)
            )),
            wav: Some("master.wav".to_string()),
            images: vec!["cover.jpg".to_string()],
        }
    }
}

/// Materialize a recipe under `root`, returning the track directory.
pub fn write_track_dir(root: &Path, spec: &TrackDirSpec) -> PathBuf {
    let dir = root.join(&spec.slug);
    fs::create_dir_all(&dir).unwrap();

    if let Some(content) = &spec.content {
        fs::write(dir.join("info.md"), content).unwrap();
    }
    if let Some(wav) = &spec.wav {
        fs::write(dir.join(wav), b"RIFF fake wav data").unwrap();
    }
    for image in &spec.images {
        fs::write(dir.join(image), b"fake image bytes").unwrap();
    }

    dir
}

/// An in-memory valid track for tests that don't need real files.
///
/// Paths point under a notional `tracks/<slug>/` directory; tests that do
/// touch the filesystem overwrite them with real locations.
pub fn sample_track(slug: &str) -> Track {
    let directory = PathBuf::from("tracks").join(slug);
    Track {
        slug: slug.to_string(),
        metadata: TrackMetadata {
            title: title_case(slug),
            ..TrackMetadata::default()
        },
        body_html: String::new(),
        source_audio_path: directory.join("master.wav"),
        compressed_audio_path: None,
        images: vec![directory.join("cover.jpg")],
        remote_compressed_url: None,
        remote_source_url: None,
        directory,
    }
}

/// `my-song` → `My Song`, matching how fixtures title their front matter.
pub fn title_case(slug: &str) -> String {
    slug.split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
