//! VSA Core - pipeline logic for the Vertical Short Assembler
//!
//! This crate assembles short vertical videos from a hook clip, a main
//! audio track, subtitles, a thumbnail and a folder of background footage.
//! It contains all business logic with zero UI dependencies; external
//! tools are reached through [`media::MediaTools`].

pub mod audio;
pub mod background;
pub mod compose;
pub mod config;
pub mod jobs;
pub mod logging;
pub mod media;
pub mod orchestrator;
pub mod presets;
pub mod subtitles;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
