//! Front-matter parsing for track content files.
//!
//! Each track directory carries one markdown file whose header is a YAML
//! block delimited by `---` markers:
//!
//! ```text
//! ---
//! title: My Song
//! year: 2024
//! tags: [ambient, piano]
//! ---
//! Liner notes in **markdown**.
//! ```
//!
//! The document must start with `---` and contain a closing `---`; the
//! header is deserialized into [`TrackMetadata`] and the body is rendered to
//! HTML. Malformed documents are errors the scan reports per track — the
//! build continues without the offending directory.

use crate::track::TrackMetadata;
use pulldown_cmark::{Parser, html as md_html};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrontMatterError {
    #[error("document does not start with a '---' front-matter block")]
    MissingDelimiter,
    #[error("front-matter block is never closed by a second '---'")]
    UnterminatedHeader,
    #[error("invalid YAML header: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("no title in front matter")]
    MissingTitle,
}

/// A parsed content file: typed header plus rendered body.
#[derive(Debug, Clone)]
pub struct Document {
    pub metadata: TrackMetadata,
    pub body_html: String,
}

/// Parse a content file into metadata and rendered body.
pub fn parse(content: &str) -> Result<Document, FrontMatterError> {
    let rest = content
        .strip_prefix("---")
        .ok_or(FrontMatterError::MissingDelimiter)?;
    let (header, body) = rest
        .split_once("---")
        .ok_or(FrontMatterError::UnterminatedHeader)?;

    // An empty header is tolerated; the title check below rejects it.
    let metadata: TrackMetadata = if header.trim().is_empty() {
        TrackMetadata::default()
    } else {
        serde_yaml::from_str(header)?
    };

    if metadata.title.trim().is_empty() {
        return Err(FrontMatterError::MissingTitle);
    }

    Ok(Document {
        metadata,
        body_html: render_markdown(body.trim()),
    })
}

/// Render markdown to HTML.
pub fn render_markdown(markdown: &str) -> String {
    let parser = Parser::new(markdown);
    let mut out = String::new();
    md_html::push_html(&mut out, parser);
    out
}
