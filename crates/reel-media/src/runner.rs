//! External process runner for FFmpeg and FFprobe.

use async_trait::async_trait;
use std::path::Path;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::command::{check_ffmpeg, check_ffprobe, FfmpegCommand};
use crate::error::{MediaError, MediaResult};
use crate::probe::{duration_probe_args, parse_duration_output, FALLBACK_DURATION_SECS};

/// Maximum number of stderr characters kept on failure.
pub const STDERR_TAIL_CHARS: usize = 500;

/// Executes encode and probe commands.
///
/// The composer only talks to this trait, so tests can swap in a runner that
/// never spawns a process.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run one FFmpeg invocation to completion.
    async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<()>;

    /// Duration of a media file in seconds.
    async fn probe_duration(&self, path: &Path) -> MediaResult<f64>;
}

/// Runner that spawns the real binaries.
#[derive(Debug, Clone, Default)]
pub struct FfmpegRunner {
    /// Timeout in seconds
    timeout_secs: Option<u64>,
}

impl FfmpegRunner {
    /// Create a new runner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Spawn a program and collect its output, killing it on timeout.
    async fn output(&self, program: &str, args: &[String]) -> MediaResult<Output> {
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        match self.timeout_secs {
            Some(secs) => match tokio::time::timeout(Duration::from_secs(secs), child).await {
                Ok(result) => Ok(result?),
                Err(_) => {
                    warn!("{} timed out after {} seconds, killing process", program, secs);
                    Err(MediaError::Timeout(secs))
                }
            },
            None => Ok(child.await?),
        }
    }
}

#[async_trait]
impl CommandRunner for FfmpegRunner {
    async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<()> {
        check_ffmpeg()?;

        let args = cmd.build_args();
        debug!("Running FFmpeg: ffmpeg {}", args.join(" "));

        let output = self.output("ffmpeg", &args).await?;
        if output.status.success() {
            Ok(())
        } else {
            Err(MediaError::ffmpeg_failed(
                Some(stderr_tail(&output.stderr, STDERR_TAIL_CHARS)),
                output.status.code(),
            ))
        }
    }

    async fn probe_duration(&self, path: &Path) -> MediaResult<f64> {
        if !path.exists() {
            return Err(MediaError::FileNotFound(path.to_path_buf()));
        }
        check_ffprobe()?;

        let args = duration_probe_args(path);
        let output = self.output("ffprobe", &args).await?;
        if !output.status.success() {
            warn!(
                path = %path.display(),
                code = ?output.status.code(),
                "ffprobe failed, using fallback duration {}",
                FALLBACK_DURATION_SECS
            );
            return Ok(FALLBACK_DURATION_SECS);
        }

        Ok(parse_duration_output(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Last `max_chars` characters of a process's stderr.
pub fn stderr_tail(stderr: &[u8], max_chars: usize) -> String {
    let text = String::from_utf8_lossy(stderr);
    let count = text.chars().count();
    text.chars().skip(count.saturating_sub(max_chars)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stderr_tail_bounded() {
        let long = "x".repeat(2000) + "the real error";
        let tail = stderr_tail(long.as_bytes(), STDERR_TAIL_CHARS);
        assert_eq!(tail.chars().count(), STDERR_TAIL_CHARS);
        assert!(tail.ends_with("the real error"));
    }

    #[test]
    fn test_stderr_tail_short_and_multibyte() {
        assert_eq!(stderr_tail(b"short", 500), "short");
        let text = "ñandú".repeat(10);
        let tail = stderr_tail(text.as_bytes(), 5);
        assert_eq!(tail, "ñandú");
    }

    #[tokio::test]
    async fn test_probe_missing_file() {
        let runner = FfmpegRunner::new();
        let err = runner
            .probe_duration(Path::new("/definitely/not/here.mp3"))
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::FileNotFound(_)));
    }
}
