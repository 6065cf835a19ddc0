//! Incremental publishing of audio artifacts.
//!
//! For each artifact (the MP3 and the WAV master) the publisher asks the
//! comparator whether the remote copy already matches, uploads only on a
//! mismatch, and records the resulting public URL on the track. Nothing is
//! ever downloaded; the comparison works entirely from the store's metadata.
//!
//! ## Decision algorithm
//!
//! 1. `head` the object at `<slug>/<slug>.<ext>`.
//! 2. No object ⇒ [`UploadDecision::NoRemoteCopy`].
//! 3. Composite tag (multipart upload, detected by the `-` the part count
//!    adds — plain MD5 hex never contains one) ⇒ compare sizes only.
//!    Equal ⇒ `SizeMatch`, else `Mismatch`. A same-size changed file is
//!    therefore skipped; the tag is not a content hash, so exact equality
//!    cannot be established without a transfer, and the rare false skip is
//!    accepted.
//! 4. Plain tag ⇒ compare against a streamed MD5 of the local file.
//!    Equal ⇒ `HashMatch`, else `Mismatch`.
//!
//! A failed `head` is `Err`, never a decision — but the publisher treats it
//! as "upload anyway": a redundant transfer is preferred over silently
//! leaving a stale object published.

use crate::store::{ObjectStore, StoreError};
use crate::track::Track;
use md5::{Digest, Md5};
use std::fs::File;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Content type for the compressed artifact.
pub const MP3_CONTENT_TYPE: &str = "audio/mpeg";
/// Content type for the lossless master.
pub const WAV_CONTENT_TYPE: &str = "audio/wav";

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The comparator's verdict for one artifact/key pair.
///
/// Matching variants carry the observed remote tag for diagnostics. A store
/// query failure is `Err(...)` from [`upload_decision`], never a variant, so
/// a caller cannot mistake "mismatch" for "error".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadDecision {
    /// Nothing at the key; upload.
    NoRemoteCopy,
    /// Composite remote tag, sizes equal; assume unchanged and skip.
    SizeMatch(String),
    /// Remote tag equals the local content hash; skip.
    HashMatch(String),
    /// Remote copy differs; upload.
    Mismatch(String),
}

impl UploadDecision {
    /// Whether the artifact must be transferred.
    pub fn needs_upload(&self) -> bool {
        matches!(
            self,
            UploadDecision::NoRemoteCopy | UploadDecision::Mismatch(_)
        )
    }

    /// The remote tag observed during comparison, if any object existed.
    pub fn remote_tag(&self) -> Option<&str> {
        match self {
            UploadDecision::NoRemoteCopy => None,
            UploadDecision::SizeMatch(tag)
            | UploadDecision::HashMatch(tag)
            | UploadDecision::Mismatch(tag) => Some(tag),
        }
    }
}

/// Decide whether the remote copy at `key` already matches `local`.
pub fn upload_decision(
    store: &dyn ObjectStore,
    key: &str,
    local: &Path,
) -> Result<UploadDecision, PublishError> {
    let Some(remote) = store.head(key)? else {
        return Ok(UploadDecision::NoRemoteCopy);
    };

    if is_composite_tag(&remote.etag) {
        let local_size = std::fs::metadata(local)?.len();
        return Ok(match remote.size {
            Some(size) if size == local_size => UploadDecision::SizeMatch(remote.etag),
            // Unknown or differing size: cannot assume a match.
            _ => UploadDecision::Mismatch(remote.etag),
        });
    }

    let local_hash = md5_hex(local)?;
    if local_hash == remote.etag {
        Ok(UploadDecision::HashMatch(remote.etag))
    } else {
        Ok(UploadDecision::Mismatch(remote.etag))
    }
}

/// A multipart tag is `<hex>-<parts>`; a plain content hash has no dash.
fn is_composite_tag(tag: &str) -> bool {
    tag.contains('-')
}

/// MD5 of a file's contents as lowercase hex, streamed so large masters
/// never sit in memory.
pub fn md5_hex(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Md5::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}

/// What happened to one artifact during publishing.
#[derive(Debug)]
pub enum ArtifactStatus {
    /// Transferred after the comparator reported a missing or stale copy.
    Uploaded(UploadDecision),
    /// Transferred because the remote query failed; the optimistic bias
    /// prefers a redundant upload over a silent skip.
    UploadedBlind(String),
    /// Remote copy already current; no transfer.
    Current(UploadDecision),
    /// Upload attempted and failed; the URL stays unset.
    Failed(String),
}

impl ArtifactStatus {
    /// Whether the artifact is now published (URL recorded).
    pub fn published(&self) -> bool {
        !matches!(self, ArtifactStatus::Failed(_))
    }
}

/// Per-artifact publish record, for progress output and tests.
#[derive(Debug)]
pub struct ArtifactOutcome {
    pub key: String,
    pub status: ArtifactStatus,
}

/// Publisher: an object store plus the public URL prefix published keys
/// resolve under.
pub struct Publisher<'a> {
    pub store: &'a dyn ObjectStore,
    pub base_url: &'a str,
}

impl Publisher<'_> {
    /// Publish a track's artifacts: the MP3 (when encoded) and the WAV
    /// master. Sets the track's URL fields on success; a failure on one
    /// artifact does not stop the other.
    pub fn publish_track(&self, track: &mut Track) -> Vec<ArtifactOutcome> {
        let mut outcomes = Vec::new();

        if let Some(mp3) = track.compressed_audio_path.clone() {
            let key = track.compressed_key();
            let (status, url) = self.publish_artifact(&key, &mp3, MP3_CONTENT_TYPE);
            track.remote_compressed_url = url;
            outcomes.push(ArtifactOutcome { key, status });
        }

        let wav = track.source_audio_path.clone();
        let key = track.source_key();
        let (status, url) = self.publish_artifact(&key, &wav, WAV_CONTENT_TYPE);
        track.remote_source_url = url;
        outcomes.push(ArtifactOutcome { key, status });

        outcomes
    }

    /// Publish one artifact; returns its status and, when published, the
    /// public URL.
    fn publish_artifact(
        &self,
        key: &str,
        local: &Path,
        content_type: &str,
    ) -> (ArtifactStatus, Option<String>) {
        let decision: Result<UploadDecision, String> =
            match upload_decision(self.store, key, local) {
                Ok(decision) if !decision.needs_upload() => {
                    return (ArtifactStatus::Current(decision), Some(self.url_for(key)));
                }
                Ok(decision) => Ok(decision),
                // A local IO problem would fail the transfer too; only a
                // store-side query failure triggers the optimistic upload.
                Err(PublishError::Io(e)) => {
                    return (ArtifactStatus::Failed(e.to_string()), None);
                }
                Err(PublishError::Store(e)) => Err(e.to_string()),
            };

        match self.store.put_file(key, local, content_type) {
            Ok(()) => {
                let status = match decision {
                    Ok(decision) => ArtifactStatus::Uploaded(decision),
                    Err(query_error) => ArtifactStatus::UploadedBlind(query_error),
                };
                (status, Some(self.url_for(key)))
            }
            Err(e) => (ArtifactStatus::Failed(e.to_string()), None),
        }
    }

    fn url_for(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }
}
