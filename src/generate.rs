//! HTML site generation.
//!
//! The final pipeline stage: takes the fully-populated tracks and renders
//! the static site. This stage has no branching complexity — it is pure
//! templating and file copying, and it never touches the network.
//!
//! ## Output Structure
//!
//! ```text
//! site/
//! ├── index.html                 # Listing page with the cover grid
//! ├── tracks/
//! │   └── my-song.html           # One detail page per track
//! ├── covers/
//! │   └── my-song-cover.jpg      # Every track image, slug-prefixed
//! └── assets/                    # User static assets, copied through
//! ```
//!
//! `tracks/`, `covers/`, and `assets/` are deleted and recreated on every
//! run, so renamed or removed source files never leave stale copies behind.
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating:
//! malformed markup is a build error and all interpolation is auto-escaped.
//! The stylesheet is embedded at compile time and inlined into every page,
//! so the generated site carries no runtime template or style files.

use crate::config::Config;
use crate::track::Track;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

const CSS: &str = include_str!("../static/style.css");

/// Counters for the render stage, reported by the CLI.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub track_pages: usize,
    pub images_copied: usize,
    pub assets_copied: bool,
}

/// Render the full site into `output_dir`.
///
/// `assets_dir` is the user's static-assets directory; it is optional and
/// simply skipped when absent.
pub fn generate(
    tracks: &[Track],
    config: &Config,
    output_dir: &Path,
    assets_dir: &Path,
) -> Result<RenderStats, GenerateError> {
    let mut stats = RenderStats::default();

    fs::create_dir_all(output_dir)?;

    let tracks_dir = output_dir.join("tracks");
    let covers_dir = output_dir.join("covers");
    let assets_out = output_dir.join("assets");

    // Recreate the derived subtrees so stale copies never survive a rename.
    for dir in [&tracks_dir, &covers_dir, &assets_out] {
        if dir.exists() {
            fs::remove_dir_all(dir)?;
        }
    }
    fs::create_dir_all(&tracks_dir)?;
    fs::create_dir_all(&covers_dir)?;

    if assets_dir.is_dir() {
        fs::create_dir_all(&assets_out)?;
        copy_dir_recursive(assets_dir, &assets_out)?;
        stats.assets_copied = true;
    }

    // Copy all track images, slug-prefixed to avoid collisions.
    for track in tracks {
        for (image, filename) in track.images.iter().zip(track.image_filenames()) {
            fs::copy(image, covers_dir.join(filename))?;
            stats.images_copied += 1;
        }
    }

    for track in tracks {
        let page = render_track_page(track, config);
        fs::write(
            tracks_dir.join(format!("{}.html", track.slug)),
            page.into_string(),
        )?;
        stats.track_pages += 1;
    }

    let index = render_index(tracks, config);
    fs::write(output_dir.join("index.html"), index.into_string())?;

    Ok(stats)
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure.
fn base_document(title: &str, config: &Config, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                meta name="description" content=(config.site_description);
                meta name="author" content=(config.site_author);
                title { (title) }
                style { (PreEscaped(CSS)) }
            }
            body {
                (content)
                footer.site-footer {
                    (config.site_author) " · " (config.site_title)
                }
            }
        }
    }
}

/// Renders the site header with title and tagline.
fn site_header(config: &Config, home_href: &str) -> Markup {
    html! {
        header.site-header {
            h1 { a href=(home_href) { (config.site_title) } }
            p.tagline { (config.site_description) }
        }
    }
}

/// One-line "2024 · ambient" style metadata summary, skipping absent parts.
fn meta_line(track: &Track) -> String {
    let mut parts = Vec::new();
    if let Some(year) = track.metadata.year {
        parts.push(year.to_string());
    }
    if let Some(category) = &track.metadata.category {
        parts.push(category.clone());
    }
    parts.join(" · ")
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Renders the listing page with the cover grid.
fn render_index(tracks: &[Track], config: &Config) -> Markup {
    let content = html! {
        (site_header(config, "index.html"))
        main.index-page {
            div.track-grid {
                @for track in tracks {
                    a.track-card href={ "tracks/" (track.slug) ".html" } {
                        img src={ "covers/" (track.cover_filename()) }
                            alt=(track.metadata.title) loading="lazy";
                        span.track-title { (track.metadata.title) }
                        @let line = meta_line(track);
                        @if !line.is_empty() {
                            span.track-meta { (line) }
                        }
                    }
                }
            }
        }
    };

    base_document(&config.site_title, config, content)
}

/// Renders a track detail page (lives under `tracks/`, hence the `../`
/// prefixes on covers and the home link).
fn render_track_page(track: &Track, config: &Config) -> Markup {
    let title = &track.metadata.title;

    let content = html! {
        (site_header(config, "../index.html"))
        main.track-page {
            header.track-header {
                h1 { (title) }
                @let line = meta_line(track);
                @if !line.is_empty() {
                    p.track-meta { (line) }
                }
                @if track.metadata.status != "final" {
                    p.track-meta { "Status: " (track.metadata.status) }
                }
                @if !track.metadata.tags.is_empty() {
                    ul.tags {
                        @for tag in &track.metadata.tags {
                            li { (tag) }
                        }
                    }
                }
            }

            div.cover-strip {
                @for filename in track.image_filenames() {
                    img src={ "../covers/" (filename) } alt=(title) loading="lazy";
                }
            }

            @if let Some(url) = &track.remote_compressed_url {
                div.player {
                    audio controls preload="none" {
                        source src=(url) type="audio/mpeg";
                    }
                }
            }
            @if let Some(url) = &track.remote_source_url {
                p.download {
                    a href=(url) download { "Download lossless master (WAV)" }
                }
            }

            @if !track.body_html.is_empty() {
                article.track-body {
                    (PreEscaped(track.body_html.clone()))
                }
            }

            @if let Some(created) = &track.metadata.created {
                p.track-meta { "Created " (created) }
            }
            @if let Some(modified) = &track.metadata.modified {
                p.track-meta { "Updated " (modified) }
            }
        }
    };

    base_document(title, config, content)
}

// ============================================================================
// Tests
// ============================================================================
