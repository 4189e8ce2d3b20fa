//! Request handlers.

pub mod health;
pub mod reels;

pub use health::*;
pub use reels::*;
