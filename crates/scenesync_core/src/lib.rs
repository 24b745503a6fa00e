//! Scene Sync Core - Backend logic for Scene Sync
//!
//! Re-synchronizes an audio or subtitle track from one release of a video
//! (the source) with another release (the target) by matching scene-cut
//! fingerprints and building a piecewise timing curve between them.
//!
//! This crate contains all business logic with zero UI dependencies.
//! It can be used by the CLI tool or any other front end.

pub mod alignment;
pub mod config;
pub mod export;
pub mod fingerprint;
pub mod logging;
pub mod models;
pub mod orchestrator;
pub mod process;
pub mod subtitles;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
