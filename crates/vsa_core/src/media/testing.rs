//! Scripted [`MediaTools`] for tests.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use super::error::{ProbeError, ToolError};
use super::tools::{FfmpegCommand, MediaTools, ToolOutput};

/// Fake tool set with known durations and scripted ffmpeg outcomes.
///
/// ffmpeg "succeeds" by writing a small file at the command's output path.
/// A command fails when any argument contains a registered failure marker;
/// the partial output is still written, as a real encoder would leave it.
#[derive(Default)]
pub struct FakeTools {
    durations: Mutex<HashMap<PathBuf, f64>>,
    unreadable: HashSet<PathBuf>,
    output_durations: Vec<(String, f64)>,
    fail_markers: Vec<String>,
    calls: Mutex<Vec<FfmpegCommand>>,
    probes: AtomicUsize,
}

impl FakeTools {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_duration(self, path: impl Into<PathBuf>, seconds: f64) -> Self {
        self.durations.lock().insert(path.into(), seconds);
        self
    }

    pub fn with_unreadable(mut self, path: impl Into<PathBuf>) -> Self {
        self.unreadable.insert(path.into());
        self
    }

    /// Outputs whose file name starts with `prefix` probe as `seconds`.
    pub fn with_output_duration(mut self, prefix: &str, seconds: f64) -> Self {
        self.output_durations.push((prefix.to_string(), seconds));
        self
    }

    /// Fail every ffmpeg run with an argument containing `marker`.
    pub fn failing_on(mut self, marker: &str) -> Self {
        self.fail_markers.push(marker.to_string());
        self
    }

    pub fn calls(&self) -> Vec<FfmpegCommand> {
        self.calls.lock().clone()
    }

    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }
}

impl MediaTools for FakeTools {
    fn probe_duration(&self, path: &Path) -> Result<f64, ProbeError> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        if let Some(d) = self.durations.lock().get(path) {
            return Ok(*d);
        }
        if !path.exists() {
            return Err(ProbeError::NotFound(path.to_path_buf()));
        }
        Err(ProbeError::invalid_output(path, "{}"))
    }

    fn is_readable(&self, path: &Path) -> bool {
        !self.unreadable.contains(path)
    }

    fn run_ffmpeg(&self, command: &FfmpegCommand) -> Result<ToolOutput, ToolError> {
        self.calls.lock().push(command.clone());

        let output = command.output_path();
        if let Some(ref out) = output {
            if let Some(parent) = out.parent() {
                let _ = fs::create_dir_all(parent);
            }
            let _ = fs::write(out, b"fake media");
        }

        let failed = command
            .get_args()
            .iter()
            .any(|a| self.fail_markers.iter().any(|m| a.contains(m.as_str())));
        if failed {
            return Err(ToolError::failed(
                "ffmpeg",
                1,
                "Input #0, scripted\nConversion failed!\n",
            ));
        }

        if let Some(out) = output {
            let name = out
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            if let Some((_, d)) = self
                .output_durations
                .iter()
                .find(|(prefix, _)| name.starts_with(prefix.as_str()))
            {
                self.durations.lock().insert(out, *d);
            }
        }

        Ok(ToolOutput {
            stdout: String::new(),
            stderr: "frame=1 fps=0.0\n".to_string(),
        })
    }
}
