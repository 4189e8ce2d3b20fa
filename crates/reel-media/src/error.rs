//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur during media processing.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFprobe not found in PATH")]
    FfprobeNotFound,

    #[error("FFmpeg command failed: {message}")]
    FfmpegFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid composition input: {0}")]
    InvalidInput(String),
}

impl MediaError {
    /// Create an FFmpeg failure error.
    ///
    /// The message carries the exit code and the stderr tail so it reads well
    /// when surfaced as a job error.
    pub fn ffmpeg_failed(stderr: Option<String>, exit_code: Option<i32>) -> Self {
        let code = exit_code.map_or_else(|| "signal".to_string(), |c| c.to_string());
        let message = match stderr.as_deref() {
            Some(tail) if !tail.trim().is_empty() => {
                format!("FFmpeg error (code {}): {}", code, tail.trim())
            }
            _ => format!("FFmpeg error (code {})", code),
        };
        Self::FfmpegFailed {
            message,
            stderr,
            exit_code,
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ffmpeg_failed_message() {
        let err = MediaError::ffmpeg_failed(Some("No such filter\n".to_string()), Some(1));
        assert_eq!(
            err.to_string(),
            "FFmpeg command failed: FFmpeg error (code 1): No such filter"
        );

        let err = MediaError::ffmpeg_failed(None, None);
        assert_eq!(err.to_string(), "FFmpeg command failed: FFmpeg error (code signal)");
    }
}
