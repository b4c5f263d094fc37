//! Subtitle error types.

use std::path::PathBuf;

/// Errors reading, parsing or writing one subtitle file.
#[derive(Debug, thiserror::Error)]
pub enum SubtitleError {
    #[error("Failed to read file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Unknown subtitle format for file '{0}'")]
    UnknownFormat(PathBuf),

    #[error("Parse error: {0}")]
    ParseError(#[from] ParseError),
}

/// Errors that can occur during subtitle parsing.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Invalid time format at line {line}: '{value}'")]
    InvalidTime { line: usize, value: String },

    #[error("Invalid style at line {line}: {message}")]
    InvalidStyle { line: usize, message: String },

    #[error("Invalid event at line {line}: {message}")]
    InvalidEvent { line: usize, message: String },

    #[error("Parse error at line {line}: {message}")]
    Generic { line: usize, message: String },
}

/// A subtitle source could not be loaded; the merge is abandoned.
#[derive(Debug, thiserror::Error)]
#[error("Failed to load subtitles from '{path}': {source}")]
pub struct SubtitleLoadError {
    pub path: PathBuf,
    #[source]
    pub source: SubtitleError,
}

/// A style field holds a value the projector cannot use.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Invalid style field '{field}' = '{value}': {reason}")]
pub struct InvalidStyleError {
    pub field: &'static str,
    pub value: String,
    pub reason: String,
}

impl InvalidStyleError {
    pub fn new(field: &'static str, value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
            reason: reason.into(),
        }
    }
}

impl SubtitleError {
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadError {
            path: path.into(),
            source,
        }
    }

    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::WriteError {
            path: path.into(),
            source,
        }
    }
}

impl ParseError {
    pub fn at_line(line: usize, message: impl Into<String>) -> Self {
        Self::Generic {
            line,
            message: message.into(),
        }
    }

    pub fn invalid_time(line: usize, value: impl Into<String>) -> Self {
        Self::InvalidTime {
            line,
            value: value.into(),
        }
    }

    pub fn invalid_event(line: usize, message: impl Into<String>) -> Self {
        Self::InvalidEvent {
            line,
            message: message.into(),
        }
    }

    pub fn invalid_style(line: usize, message: impl Into<String>) -> Self {
        Self::InvalidStyle {
            line,
            message: message.into(),
        }
    }
}
