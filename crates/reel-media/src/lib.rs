//! FFmpeg CLI wrapper for reel composition.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building with multiple inputs
//! - A process runner with bounded stderr capture and timeouts
//! - Caption timing and SubRip rendering
//! - The slideshow, mux, subtitle, music and export pipeline
//! - Placeholder image rendering

pub mod captions;
pub mod command;
pub mod compose;
pub mod error;
pub mod filters;
pub mod fs_utils;
pub mod placeholder;
pub mod probe;
pub mod runner;

pub use captions::{build_captions, render_srt, CHUNK_WORDS};
pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand};
pub use compose::{ComposeRequest, VideoComposer};
pub use error::{MediaError, MediaResult};
pub use fs_utils::{move_file, remove_dir_if_exists, remove_file_if_exists};
pub use placeholder::{placeholder_colors, render_placeholder_png, PALETTE};
pub use probe::{parse_duration_output, FALLBACK_DURATION_SECS};
pub use runner::{CommandRunner, FfmpegRunner};
