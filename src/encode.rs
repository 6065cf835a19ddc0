//! Audio transcoding via an external encoder.
//!
//! The [`AudioEncoder`] trait defines the two operations the pipeline needs:
//! a cheap availability probe and a WAV→MP3 encode. The production
//! implementation is [`FfmpegEncoder`], which shells out to `ffmpeg` with the
//! LAME codec; tests substitute a recording mock so pipeline logic can be
//! exercised without the binary installed.
//!
//! ## Staleness check
//!
//! [`encode_track`] skips the encoder entirely when the MP3 already exists
//! and its modification time is newer than the WAV's. This is a cheap mtime
//! comparison, not a content hash: touching the master forces a re-encode,
//! and nothing else does.
//!
//! ## Timeouts
//!
//! `ffmpeg` is bounded by a fixed wall-clock timeout (300 s for an encode,
//! 5 s for the version probe). The child is polled with `try_wait` and
//! killed on deadline; a timeout is an encode failure for that track only.

use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::track::Track;

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("encoder not available: {0}")]
    Unavailable(String),
    #[error("encoder exited with an error: {0}")]
    Failed(String),
    #[error("encoder timed out after {0:?}")]
    TimedOut(Duration),
}

/// Encoding parameters for one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeParams {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Target bitrate in kbit/s.
    pub bitrate: u32,
    /// LAME VBR quality (0 = best, 9 = worst).
    pub quality: u32,
}

/// Trait for audio encoders.
///
/// `probe` is the orchestrator's dependency check; `encode` produces one
/// compressed artifact. Both are blocking.
pub trait AudioEncoder {
    /// Verify the encoder is installed and runnable.
    fn probe(&self) -> Result<(), EncodeError>;

    /// Encode `params.source` into `params.output`, overwriting it.
    fn encode(&self, params: &EncodeParams) -> Result<(), EncodeError>;
}

const ENCODE_TIMEOUT: Duration = Duration::from_secs(300);
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Production encoder: shells out to `ffmpeg` with libmp3lame.
pub struct FfmpegEncoder {
    timeout: Duration,
}

impl Default for FfmpegEncoder {
    fn default() -> Self {
        Self {
            timeout: ENCODE_TIMEOUT,
        }
    }
}

impl FfmpegEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl AudioEncoder for FfmpegEncoder {
    fn probe(&self) -> Result<(), EncodeError> {
        let mut cmd = Command::new("ffmpeg");
        cmd.arg("-version");
        match run_with_timeout(&mut cmd, PROBE_TIMEOUT) {
            Ok((status, _)) if status.success() => Ok(()),
            Ok((_, stderr)) => Err(EncodeError::Unavailable(first_line(&stderr))),
            Err(EncodeError::Io(e)) => Err(EncodeError::Unavailable(e.to_string())),
            Err(e) => Err(e),
        }
    }

    fn encode(&self, params: &EncodeParams) -> Result<(), EncodeError> {
        let mut cmd = Command::new("ffmpeg");
        cmd.arg("-i")
            .arg(&params.source)
            .args(["-codec:a", "libmp3lame"])
            .args(["-b:a", &format!("{}k", params.bitrate)])
            .args(["-q:a", &params.quality.to_string()])
            .arg("-y")
            .arg(&params.output);

        let (status, stderr) = run_with_timeout(&mut cmd, self.timeout)?;
        if status.success() {
            Ok(())
        } else {
            Err(EncodeError::Failed(last_lines(&stderr, 4)))
        }
    }
}

/// Outcome of [`encode_track`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeOutcome {
    /// The encoder ran and produced the artifact.
    Encoded(PathBuf),
    /// The artifact was already newer than the master; the encoder was not
    /// invoked.
    Fresh(PathBuf),
}

impl EncodeOutcome {
    pub fn path(&self) -> &PathBuf {
        match self {
            EncodeOutcome::Encoded(p) | EncodeOutcome::Fresh(p) => p,
        }
    }
}

/// Produce the track's compressed artifact, skipping when it is up to date.
pub fn encode_track(
    encoder: &dyn AudioEncoder,
    track: &Track,
    bitrate: u32,
    quality: u32,
) -> Result<EncodeOutcome, EncodeError> {
    let output = track.compressed_output_path();

    if is_fresh(&output, &track.source_audio_path) {
        return Ok(EncodeOutcome::Fresh(output));
    }

    encoder.encode(&EncodeParams {
        source: track.source_audio_path.clone(),
        output: output.clone(),
        bitrate,
        quality,
    })?;

    Ok(EncodeOutcome::Encoded(output))
}

/// True when `artifact` exists and was modified strictly after `source`.
fn is_fresh(artifact: &std::path::Path, source: &std::path::Path) -> bool {
    let artifact_mtime = match std::fs::metadata(artifact).and_then(|m| m.modified()) {
        Ok(t) => t,
        Err(_) => return false,
    };
    let source_mtime = match std::fs::metadata(source).and_then(|m| m.modified()) {
        Ok(t) => t,
        Err(_) => return false,
    };
    artifact_mtime > source_mtime
}

/// Run a command to completion with a wall-clock deadline.
///
/// stderr is drained on a separate thread so a chatty child (ffmpeg reports
/// progress there) can't fill the pipe and stall. Returns the exit status
/// and captured stderr; on deadline the child is killed.
fn run_with_timeout(
    cmd: &mut Command,
    timeout: Duration,
) -> Result<(std::process::ExitStatus, String), EncodeError> {
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()?;

    let stderr_reader = child.stderr.take().map(|mut pipe| {
        std::thread::spawn(move || {
            let mut buf = String::new();
            let _ = pipe.read_to_string(&mut buf);
            buf
        })
    });

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait()? {
            Some(status) => break status,
            None if Instant::now() >= deadline => {
                kill_and_reap(&mut child);
                return Err(EncodeError::TimedOut(timeout));
            }
            None => std::thread::sleep(POLL_INTERVAL),
        }
    };

    let stderr = stderr_reader
        .and_then(|h| h.join().ok())
        .unwrap_or_default();
    Ok((status, stderr))
}

fn kill_and_reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

fn first_line(text: &str) -> String {
    text.lines().next().unwrap_or("").to_string()
}

/// The last `n` lines of encoder output; ffmpeg puts the actual error there,
/// after pages of banner and progress noise.
fn last_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}
