//! Job store for reel generation jobs.
//!
//! This crate provides:
//! - The [`JobStore`] capability used by the orchestrator and the API
//! - An in-memory implementation with per-process lifetime

pub mod error;
pub mod memory;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryJobStore;
pub use store::JobStore;
