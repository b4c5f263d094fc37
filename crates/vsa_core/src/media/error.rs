//! Media tool error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure to obtain an asset's duration.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// The asset does not exist.
    #[error("Media file not found: {0}")]
    NotFound(PathBuf),

    /// The inspector could not be started.
    #[error("Failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    /// The inspector rejected the file.
    #[error("{tool} could not inspect '{path}' (exit code {exit_code}): {message}")]
    CommandFailed {
        tool: String,
        path: PathBuf,
        exit_code: i32,
        message: String,
    },

    /// The inspector ran but reported no usable duration.
    #[error("No duration reported for '{path}': {output}")]
    InvalidOutput { path: PathBuf, output: String },
}

impl ProbeError {
    pub fn invalid_output(path: impl Into<PathBuf>, output: impl Into<String>) -> Self {
        Self::InvalidOutput {
            path: path.into(),
            output: output.into(),
        }
    }
}

/// Failure of an ffmpeg invocation.
#[derive(Error, Debug)]
pub enum ToolError {
    /// The tool could not be started.
    #[error("Failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    /// The tool exited unsuccessfully.
    #[error("{tool} failed with exit code {exit_code}: {}", last_line(.stderr))]
    Failed {
        tool: String,
        exit_code: i32,
        stderr: String,
    },
}

impl ToolError {
    pub fn failed(tool: impl Into<String>, exit_code: i32, stderr: impl Into<String>) -> Self {
        Self::Failed {
            tool: tool.into(),
            exit_code,
            stderr: stderr.into(),
        }
    }

    /// Full diagnostic text emitted by the tool, if any.
    pub fn diagnostics(&self) -> Option<&str> {
        match self {
            Self::Failed { stderr, .. } => Some(stderr),
            Self::Spawn { .. } => None,
        }
    }
}

/// Last non-empty line of tool output (ffmpeg puts the reason there).
fn last_line(text: &str) -> &str {
    text.lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .unwrap_or("")
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_error_shows_last_stderr_line() {
        let err = ToolError::failed(
            "ffmpeg",
            1,
            "ffmpeg version 6\nInput #0 ...\nbg.mp4: Invalid data found when processing input\n\n",
        );
        let msg = err.to_string();
        assert!(msg.contains("exit code 1"));
        assert!(msg.ends_with("bg.mp4: Invalid data found when processing input"));
        assert!(err.diagnostics().unwrap().contains("ffmpeg version 6"));
    }

    #[test]
    fn probe_error_names_path() {
        let err = ProbeError::NotFound(PathBuf::from("/music/main.mp3"));
        assert!(err.to_string().contains("/music/main.mp3"));
    }
}
