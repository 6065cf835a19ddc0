//! # trackfolio
//!
//! A minimal static site generator for music portfolios. Your filesystem is
//! the data source: each directory under `tracks/` holds one track's
//! markdown file (YAML front matter + liner notes), its lossless WAV
//! master, and its cover art.
//!
//! # Architecture: Scan → Encode → Publish → Render
//!
//! ```text
//! 1. Scan      tracks/   →  Vec<Track>     (filesystem → validated records)
//! 2. Encode    WAV       →  <slug>.mp3     (ffmpeg, skipped when fresh)
//! 3. Publish   artifacts →  object store   (skipped when remote matches)
//! 4. Render    tracks    →  site/          (final HTML site)
//! ```
//!
//! Stages 2 and 3 are incremental: encoding is skipped when the MP3 is
//! newer than its master, and uploading is skipped when the remote
//! integrity tag already matches the local file. A build where nothing
//! changed does no encoding and transfers no bytes.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Walks the tracks directory, validates each track, produces `Track` records |
//! | [`frontmatter`] | YAML-header/markdown-body split and body rendering |
//! | [`track`] | The `Track` record and its derived names and keys |
//! | [`encode`] | WAV→MP3 transcoding through an external ffmpeg, with a staleness check |
//! | [`store`] | Object-store trait and the S3 implementation |
//! | [`publish`] | Upload decisions (tag comparison) and artifact publishing |
//! | [`generate`] | Renders the final HTML site with Maud |
//! | [`config`] | Environment-driven configuration with startup validation |
//! | [`pipeline`] | Orchestrates the stages and classifies failures |
//! | [`output`] | CLI output formatting — progress and summaries |
//!
//! # Design Decisions
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/), a compile-time
//! HTML macro system: malformed markup is a build error, interpolation is
//! auto-escaped, and there is no template directory to ship or get out of
//! sync.
//!
//! ## External Encoder, Not In-Process Codecs
//!
//! Audio encoding delegates to `ffmpeg` with libmp3lame. Masters are large,
//! LAME is the reference MP3 encoder, and musicians already have ffmpeg
//! installed; its availability is verified up front so a missing binary
//! fails the build before any work happens.
//!
//! ## Trust the Store's Metadata, Transfer Nothing to Compare
//!
//! Incremental uploads compare the store's integrity tag against a local
//! hash (or, for multipart tags, the object size) from a metadata query
//! alone. A portfolio of WAV masters is many gigabytes; deciding "already
//! published" must not involve downloading any of it.
//!
//! ## Tracks Are Valid or Absent
//!
//! A directory missing its title, master, or cover art is excluded with a
//! warning and the build moves on. The renderer only ever sees complete
//! records, so templates have no half-populated cases to defend against.

pub mod config;
pub mod encode;
pub mod frontmatter;
pub mod generate;
pub mod output;
pub mod pipeline;
pub mod publish;
pub mod scan;
pub mod store;
pub mod track;

#[cfg(test)]
pub(crate) mod test_helpers;
