//! Reel generation worker.
//!
//! This crate provides:
//! - The pipeline that drives one job from topic to finished reel
//! - A background executor that runs jobs with bounded concurrency
//! - Per-job artifact paths and deletion
//! - Structured job logging and job metrics

pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod metrics;
pub mod paths;
pub mod pipeline;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use executor::JobExecutor;
pub use logging::JobLogger;
pub use paths::JobPaths;
pub use pipeline::ReelPipeline;
