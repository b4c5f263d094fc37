//! Media inspection and the external tool seam.
//!
//! - [`MediaTools`]: probe durations, check readability, run ffmpeg
//! - [`FfmpegTools`]: the subprocess implementation
//! - [`MediaAsset`]: a path with a probe-once duration

mod asset;
mod error;
mod tools;

#[cfg(test)]
pub(crate) mod testing;

pub use asset::MediaAsset;
pub use error::{ProbeError, ToolError};
pub use tools::{parse_duration_json, FfmpegCommand, FfmpegTools, MediaTools, ToolOutput};

use std::path::Path;

/// Exact duration of `path` in seconds.
pub fn duration(tools: &dyn MediaTools, path: &Path) -> Result<f64, ProbeError> {
    tools.probe_duration(path)
}
