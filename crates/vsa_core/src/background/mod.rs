//! Background footage: pick enough shuffled clips to cover the audio and
//! join them without re-encoding.

mod concat;
mod selector;

pub use concat::{concat_command, concatenate, manifest_line, write_manifest, ConcatOutput};
pub use selector::{BackgroundPlan, BackgroundSelector, SelectedClip, SelectorOptions};

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::media::ToolError;

/// What to do when the folder holds less footage than the audio needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShortfallPolicy {
    /// Repeat the selected clips in the same order until covered.
    #[default]
    Loop,
    /// Refuse with [`BackgroundError::InsufficientCoverage`].
    Fail,
    /// Use everything available and let the video end early.
    Proceed,
}

#[derive(Error, Debug)]
pub enum BackgroundError {
    #[error("No usable background videos in '{}'", .folder.display())]
    NoBackground { folder: PathBuf },

    #[error("Background footage covers {available:.3}s of the required {required:.3}s")]
    InsufficientCoverage { available: f64, required: f64 },

    #[error("Background concatenation failed: {0}")]
    Concat(#[from] ToolError),

    #[error("I/O error at '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BackgroundError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
