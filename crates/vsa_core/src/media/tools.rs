//! External media tool seam.
//!
//! Every interaction with ffprobe and ffmpeg goes through [`MediaTools`],
//! so components can be driven by a scripted implementation in tests.

use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::Value;

use super::error::{ProbeError, ToolError};

/// One ffmpeg invocation: argument list plus optional working directory.
///
/// By convention the last argument is the output path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FfmpegCommand {
    args: Vec<String>,
    working_dir: Option<PathBuf>,
}

impl FfmpegCommand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append a path argument.
    pub fn path_arg(self, path: &Path) -> Self {
        self.arg(path.to_string_lossy().into_owned())
    }

    /// Run the tool from `dir` (relative paths resolve against it).
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }

    /// Output path (the last argument), resolved against the working directory.
    pub fn output_path(&self) -> Option<PathBuf> {
        let last = PathBuf::from(self.args.last()?);
        match &self.working_dir {
            Some(dir) if last.is_relative() => Some(dir.join(last)),
            _ => Some(last),
        }
    }

    /// Shell-like rendering for logs.
    pub fn display(&self, program: &str) -> String {
        let mut parts = vec![program.to_string()];
        parts.extend(self.args.iter().map(|a| quote_for_display(a)));
        parts.join(" ")
    }
}

fn quote_for_display(arg: &str) -> String {
    if arg.is_empty() || arg.contains(|c: char| c.is_whitespace() || c == ';' || c == '\'') {
        format!("\"{}\"", arg.replace('"', "\\\""))
    } else {
        arg.to_string()
    }
}

/// Output of a successful tool run.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Media inspection and encoding collaborator.
pub trait MediaTools: Send + Sync {
    /// Exact playable duration of an asset in seconds.
    fn probe_duration(&self, path: &Path) -> Result<f64, ProbeError>;

    /// Lightweight check that the file can be opened as media.
    fn is_readable(&self, path: &Path) -> bool;

    /// Run ffmpeg and wait for it to exit.
    fn run_ffmpeg(&self, command: &FfmpegCommand) -> Result<ToolOutput, ToolError>;

    /// Program name used when rendering commands for logs.
    fn ffmpeg_program(&self) -> &str {
        "ffmpeg"
    }
}

/// [`MediaTools`] backed by the ffmpeg and ffprobe executables.
#[derive(Debug, Clone)]
pub struct FfmpegTools {
    ffmpeg: String,
    ffprobe: String,
}

impl Default for FfmpegTools {
    fn default() -> Self {
        Self::new("ffmpeg", "ffprobe")
    }
}

impl FfmpegTools {
    pub fn new(ffmpeg: impl Into<String>, ffprobe: impl Into<String>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }
}

impl MediaTools for FfmpegTools {
    fn probe_duration(&self, path: &Path) -> Result<f64, ProbeError> {
        if !path.exists() {
            return Err(ProbeError::NotFound(path.to_path_buf()));
        }

        tracing::debug!("Probing duration: {}", path.display());

        let output = Command::new(&self.ffprobe)
            .args(["-v", "error", "-show_entries", "format=duration", "-of", "json"])
            .arg(path)
            .output()
            .map_err(|source| ProbeError::Spawn {
                tool: self.ffprobe.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ProbeError::CommandFailed {
                tool: self.ffprobe.clone(),
                path: path.to_path_buf(),
                exit_code: output.status.code().unwrap_or(-1),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_duration_json(&output.stdout, path)
    }

    fn is_readable(&self, path: &Path) -> bool {
        match Command::new(&self.ffprobe).args(["-v", "error"]).arg(path).output() {
            Ok(output) => output.status.success(),
            Err(e) => {
                tracing::warn!("Failed to run {}: {}", self.ffprobe, e);
                false
            }
        }
    }

    fn run_ffmpeg(&self, command: &FfmpegCommand) -> Result<ToolOutput, ToolError> {
        let mut cmd = Command::new(&self.ffmpeg);
        cmd.args(command.get_args());
        if let Some(dir) = command.working_dir() {
            cmd.current_dir(dir);
        }

        let output = cmd.output().map_err(|source| ToolError::Spawn {
            tool: self.ffmpeg.clone(),
            source,
        })?;

        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !output.status.success() {
            return Err(ToolError::failed(
                &self.ffmpeg,
                output.status.code().unwrap_or(-1),
                stderr,
            ));
        }

        Ok(ToolOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr,
        })
    }

    fn ffmpeg_program(&self) -> &str {
        &self.ffmpeg
    }
}

/// Parse `ffprobe -show_entries format=duration -of json` output.
///
/// ffprobe reports the duration as a decimal string.
pub fn parse_duration_json(stdout: &[u8], path: &Path) -> Result<f64, ProbeError> {
    let text = String::from_utf8_lossy(stdout);
    let json: Value = serde_json::from_str(&text)
        .map_err(|e| ProbeError::invalid_output(path, format!("{}: {}", e, text.trim())))?;

    let duration = json
        .get("format")
        .and_then(|f| f.get("duration"))
        .and_then(|d| match d {
            Value::String(s) => s.trim().parse::<f64>().ok(),
            Value::Number(n) => n.as_f64(),
            _ => None,
        })
        .ok_or_else(|| ProbeError::invalid_output(path, text.trim()))?;

    if !duration.is_finite() || duration < 0.0 {
        return Err(ProbeError::invalid_output(path, text.trim()));
    }

    Ok(duration)
}
