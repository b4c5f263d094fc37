//! Core types for the run pipeline.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::audio::AssembledAudio;
use crate::background::BackgroundPlan;
use crate::compose::CompositionPlan;
use crate::config::Settings;
use crate::logging::RunLogger;
use crate::media::{MediaAsset, MediaTools, ToolError};
use crate::presets::StyleConfig;

/// States of one run.
///
/// `Idle → ProbingAudio → AssemblingAudio → MergingSubtitles →
/// SelectingBackground → Planning → Encoding → CleaningUp → {Done, Failed}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RunStage {
    #[default]
    Idle,
    ProbingAudio,
    AssemblingAudio,
    MergingSubtitles,
    SelectingBackground,
    Planning,
    Encoding,
    CleaningUp,
    Done,
    Failed,
}

impl RunStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStage::Idle => "Idle",
            RunStage::ProbingAudio => "ProbingAudio",
            RunStage::AssemblingAudio => "AssemblingAudio",
            RunStage::MergingSubtitles => "MergingSubtitles",
            RunStage::SelectingBackground => "SelectingBackground",
            RunStage::Planning => "Planning",
            RunStage::Encoding => "Encoding",
            RunStage::CleaningUp => "CleaningUp",
            RunStage::Done => "Done",
            RunStage::Failed => "Failed",
        }
    }

    /// Progress checkpoint reached when this stage completes.
    pub fn progress(&self) -> Option<u32> {
        match self {
            RunStage::ProbingAudio => Some(5),
            RunStage::AssemblingAudio => Some(15),
            RunStage::MergingSubtitles => Some(30),
            RunStage::SelectingBackground => Some(50),
            RunStage::Planning => Some(60),
            RunStage::Encoding => Some(95),
            RunStage::Done => Some(100),
            RunStage::Idle | RunStage::CleaningUp | RunStage::Failed => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStage::Done | RunStage::Failed)
    }
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One progress checkpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    pub stage: RunStage,
    /// 0 to 100, never decreasing within a run.
    pub percent: u32,
    pub message: String,
}

/// Progress callback type.
pub type ProgressCallback = Box<dyn Fn(&ProgressEvent) + Send + Sync>;

/// Assets for one short.
#[derive(Debug, Clone)]
pub struct RunInputs {
    pub hook_audio: Option<PathBuf>,
    pub main_audio: PathBuf,
    pub hook_subtitle: Option<PathBuf>,
    pub main_subtitle: Option<PathBuf>,
    pub thumbnail: Option<PathBuf>,
    pub background_folder: PathBuf,
    pub style: StyleConfig,
}

impl RunInputs {
    pub fn new(main_audio: impl Into<PathBuf>, background_folder: impl Into<PathBuf>) -> Self {
        Self {
            hook_audio: None,
            main_audio: main_audio.into(),
            hook_subtitle: None,
            main_subtitle: None,
            thumbnail: None,
            background_folder: background_folder.into(),
            style: StyleConfig::default(),
        }
    }

    pub fn with_hook_audio(mut self, path: impl Into<PathBuf>) -> Self {
        self.hook_audio = Some(path.into());
        self
    }

    pub fn with_hook_subtitle(mut self, path: impl Into<PathBuf>) -> Self {
        self.hook_subtitle = Some(path.into());
        self
    }

    pub fn with_main_subtitle(mut self, path: impl Into<PathBuf>) -> Self {
        self.main_subtitle = Some(path.into());
        self
    }

    pub fn with_thumbnail(mut self, path: impl Into<PathBuf>) -> Self {
        self.thumbnail = Some(path.into());
        self
    }

    pub fn with_style(mut self, style: StyleConfig) -> Self {
        self.style = style;
        self
    }

    /// File stem of the main audio, used to name outputs.
    pub fn stem(&self) -> String {
        self.main_audio
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "short".to_string())
    }

    /// Anchor every relative input path at `base`.
    ///
    /// The encoder runs inside the work dir, so relative paths would
    /// otherwise resolve against the wrong directory.
    pub fn resolved_against(self, base: &Path) -> Self {
        let anchor = |p: PathBuf| resolve_path(base, p);
        Self {
            hook_audio: self.hook_audio.map(anchor),
            main_audio: anchor(self.main_audio),
            hook_subtitle: self.hook_subtitle.map(anchor),
            main_subtitle: self.main_subtitle.map(anchor),
            thumbnail: self.thumbnail.map(anchor),
            background_folder: anchor(self.background_folder),
            style: self.style,
        }
    }
}

/// `path` if absolute, otherwise `base/path`.
pub fn resolve_path(base: &Path, path: impl Into<PathBuf>) -> PathBuf {
    let path = path.into();
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

/// Read-only context passed to pipeline steps.
///
/// Mutable results go in [`RunState`].
pub struct Context {
    pub inputs: RunInputs,
    pub settings: Settings,
    /// `<stem>_<run_stamp>`.
    pub run_name: String,
    /// Namespaces every intermediate file of this run.
    pub run_stamp: String,
    /// Run-specific working directory.
    pub work_dir: PathBuf,
    pub output_dir: PathBuf,
    pub logger: Arc<RunLogger>,
    pub tools: Arc<dyn MediaTools>,
    progress_callback: Option<ProgressCallback>,
    last_percent: AtomicU32,
}

impl Context {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        inputs: RunInputs,
        settings: Settings,
        run_name: impl Into<String>,
        run_stamp: impl Into<String>,
        work_dir: PathBuf,
        output_dir: PathBuf,
        logger: Arc<RunLogger>,
        tools: Arc<dyn MediaTools>,
    ) -> Self {
        Self {
            inputs,
            settings,
            run_name: run_name.into(),
            run_stamp: run_stamp.into(),
            work_dir,
            output_dir,
            logger,
            tools,
            progress_callback: None,
            last_percent: AtomicU32::new(0),
        }
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Report the checkpoint of `stage`. Percentages never go backwards.
    pub fn report_progress(&self, stage: RunStage, message: &str) {
        let target = stage.progress().unwrap_or(0);
        let previous = self.last_percent.fetch_max(target, Ordering::SeqCst);
        let percent = previous.max(target);

        if let Some(ref callback) = self.progress_callback {
            callback(&ProgressEvent {
                stage,
                percent,
                message: message.to_string(),
            });
        }
    }

    pub fn tools(&self) -> &dyn MediaTools {
        self.tools.as_ref()
    }

    /// Shuffle seed: the configured one, else derived from the run stamp.
    pub fn background_seed(&self) -> u64 {
        self.settings
            .background
            .seed
            .unwrap_or_else(|| seed_from_stamp(&self.run_stamp))
    }

    /// Final output path `<output_dir>/<stem>_<run_stamp>.mp4`.
    pub fn output_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}_{}.mp4", self.inputs.stem(), self.run_stamp))
    }

    /// Feed a tool's stderr into the run log and dump the tail on failure.
    pub fn record_tool_output(&self, stderr: &str, failed: bool) {
        for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
            self.logger.output_line(line, true);
        }
        if failed {
            self.logger.show_tail("ffmpeg");
        }
        self.logger.clear_tail();
    }

    /// Log the diagnostics of a failed tool run.
    pub fn record_tool_failure(&self, error: &ToolError) {
        if let Some(stderr) = error.diagnostics() {
            self.record_tool_output(stderr, true);
        }
    }
}

/// Digits of the stamp as a number.
fn seed_from_stamp(stamp: &str) -> u64 {
    stamp
        .chars()
        .filter(|c| c.is_ascii_digit())
        .take(19)
        .collect::<String>()
        .parse()
        .unwrap_or(0)
}

/// Mutable run state that accumulates stage results.
///
/// Stages add data and never overwrite an earlier stage's output.
#[derive(Debug, Default)]
pub struct RunState {
    pub stage: RunStage,
    pub started_at: Option<String>,
    pub hook: Option<MediaAsset>,
    pub main: Option<MediaAsset>,
    pub hook_duration: Option<f64>,
    pub audio: Option<AssembledAudio>,
    /// Styled subtitle staged in the work directory.
    pub subtitle_path: Option<PathBuf>,
    pub background: Option<BackgroundPlan>,
    pub background_video: Option<PathBuf>,
    pub plan: Option<CompositionPlan>,
    pub output_path: Option<PathBuf>,
    /// Files to remove during cleanup, in creation order.
    intermediates: Vec<PathBuf>,
}

impl RunState {
    pub fn new() -> Self {
        Self {
            started_at: Some(chrono::Local::now().to_rfc3339()),
            ..Default::default()
        }
    }

    /// Register a file this run creates; registered before the tool runs so
    /// partial files are removed on failure too.
    pub fn track_intermediate(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if !self.intermediates.contains(&path) {
            self.intermediates.push(path);
        }
    }

    pub fn intermediates(&self) -> &[PathBuf] {
        &self.intermediates
    }

    /// Total duration of the assembled audio, once known.
    pub fn total_duration(&self) -> Option<f64> {
        self.audio.as_ref().map(|a| a.total_duration)
    }

    pub fn audio_path(&self) -> Option<&Path> {
        self.audio.as_ref().map(|a| a.path.as_path())
    }
}

/// Result of executing a pipeline step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Success,
    /// Nothing to do for this run (not an error).
    Skipped(String),
}

/// Non-fatal problem during cleanup; logged and reported, never returned as `Err`.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanupWarning {
    pub path: PathBuf,
    pub message: String,
}

impl fmt::Display for CleanupWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Could not remove '{}': {}", self.path.display(), self.message)
    }
}

/// Summary of a successful run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_name: String,
    pub output_path: PathBuf,
    pub total_duration: f64,
    /// Styled subtitle copied next to the output, if enabled.
    pub subtitle_copy: Option<PathBuf>,
    pub log_path: PathBuf,
    pub stages_completed: Vec<RunStage>,
    pub stages_skipped: Vec<RunStage>,
    pub warnings: Vec<CleanupWarning>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_inputs_resolve_against_base() {
        let base = Path::new("/srv/shorts");
        let inputs = RunInputs::new("in/story_audio.mp3", "bg")
            .with_hook_audio("/abs/story_hook.mp3")
            .with_thumbnail("in/story_Hook.png")
            .resolved_against(base);

        assert_eq!(inputs.main_audio, base.join("in/story_audio.mp3"));
        assert_eq!(inputs.background_folder, base.join("bg"));
        assert_eq!(inputs.hook_audio, Some(PathBuf::from("/abs/story_hook.mp3")));
        assert_eq!(inputs.thumbnail, Some(base.join("in/story_Hook.png")));
        assert!(inputs.main_subtitle.is_none());
        assert_eq!(inputs.stem(), "story_audio");
    }

    #[test]
    fn checkpoints_never_decrease() {
        let stages = [
            RunStage::ProbingAudio,
            RunStage::AssemblingAudio,
            RunStage::MergingSubtitles,
            RunStage::SelectingBackground,
            RunStage::Planning,
            RunStage::Encoding,
            RunStage::Done,
        ];
        let values: Vec<u32> = stages.iter().filter_map(|s| s.progress()).collect();
        assert_eq!(values, vec![5, 15, 30, 50, 60, 95, 100]);
        assert!(values.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn terminal_stages() {
        assert!(RunStage::Done.is_terminal());
        assert!(RunStage::Failed.is_terminal());
        assert!(!RunStage::CleaningUp.is_terminal());
    }

    #[test]
    fn stamp_digits_make_the_seed() {
        assert_eq!(seed_from_stamp("20260101_120000_123"), 20260101120000123);
        assert_eq!(seed_from_stamp("no digits"), 0);
    }

    #[test]
    fn intermediates_are_tracked_once() {
        let mut state = RunState::new();
        state.track_intermediate("/w/merged_1.mp3");
        state.track_intermediate("/w/merged_1.mp3");
        state.track_intermediate("/w/background_1.mp4");
        assert_eq!(state.intermediates().len(), 2);
    }

    #[test]
    fn stem_names_outputs() {
        let inputs = RunInputs::new("/in/Story_audio.MP3", "/bg");
        assert_eq!(inputs.stem(), "Story_audio");
    }
}
