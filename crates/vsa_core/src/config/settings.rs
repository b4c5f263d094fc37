//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Each section can be updated independently for atomic section-level updates.

use serde::{Deserialize, Serialize};

use crate::background::ShortfallPolicy;

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub paths: PathSettings,

    #[serde(default)]
    pub logging: LoggingSettings,

    /// Final encode parameters.
    #[serde(default)]
    pub encoder: EncoderSettings,

    /// Background clip selection.
    #[serde(default)]
    pub background: BackgroundSettings,

    /// Folder-driven batch runs.
    #[serde(default)]
    pub batch: BatchSettings,
}

/// Output, working and log folders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSettings {
    /// Folder receiving finished videos.
    #[serde(default = "default_output_folder")]
    pub output_folder: String,

    /// Root for per-run working directories.
    #[serde(default = "default_work_root")]
    pub work_root: String,

    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,

    /// JSON file holding subtitle presets.
    #[serde(default = "default_presets_file")]
    pub presets_file: String,
}

fn default_output_folder() -> String {
    "output".to_string()
}

fn default_work_root() -> String {
    ".work".to_string()
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

fn default_presets_file() -> String {
    "subtitle_presets.json".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            output_folder: default_output_folder(),
            work_root: default_work_root(),
            logs_folder: default_logs_folder(),
            presets_file: default_presets_file(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Keep ffmpeg output out of the log unless a command fails.
    #[serde(default = "default_true")]
    pub compact: bool,

    /// Number of tool output lines to show after a failure.
    #[serde(default = "default_error_tail")]
    pub error_tail: u32,

    /// Log ffmpeg arguments one option per line.
    #[serde(default)]
    pub show_options_pretty: bool,

    /// Keep per-run log files after a successful run.
    #[serde(default = "default_true")]
    pub keep_run_logs: bool,
}

fn default_true() -> bool {
    true
}

fn default_error_tail() -> u32 {
    20
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            compact: true,
            error_tail: default_error_tail(),
            show_options_pretty: false,
            keep_run_logs: true,
        }
    }
}

/// Executables and codec choices for ffmpeg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncoderSettings {
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg_path: String,

    #[serde(default = "default_ffprobe")]
    pub ffprobe_path: String,

    /// e.g. `libx264`, `h264_nvenc`.
    #[serde(default = "default_video_codec")]
    pub video_codec: String,

    /// Encoder preset; empty to omit.
    #[serde(default = "default_preset")]
    pub preset: String,

    /// `-hwaccel` value for decoding, e.g. `cuda`.
    #[serde(default)]
    pub hwaccel: Option<String>,

    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,
}

fn default_ffmpeg() -> String {
    "ffmpeg".to_string()
}

fn default_ffprobe() -> String {
    "ffprobe".to_string()
}

fn default_video_codec() -> String {
    "libx264".to_string()
}

fn default_preset() -> String {
    "medium".to_string()
}

fn default_audio_codec() -> String {
    "aac".to_string()
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg(),
            ffprobe_path: default_ffprobe(),
            video_codec: default_video_codec(),
            preset: default_preset(),
            hwaccel: None,
            audio_codec: default_audio_codec(),
        }
    }
}

/// Background selection configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundSettings {
    /// Accepted video extensions (without dot).
    #[serde(default = "default_video_extensions")]
    pub extensions: Vec<String>,

    #[serde(default)]
    pub shortfall: ShortfallPolicy,

    /// Fixed shuffle seed; the run stamp is used when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_video_extensions() -> Vec<String> {
    vec!["mp4".to_string(), "mkv".to_string()]
}

impl Default for BackgroundSettings {
    fn default() -> Self {
        Self {
            extensions: default_video_extensions(),
            shortfall: ShortfallPolicy::default(),
            seed: None,
        }
    }
}

/// File-name suffixes used to pair batch inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuffixSettings {
    #[serde(default = "default_audio_suffix")]
    pub audio: String,

    #[serde(default = "default_hook_suffix")]
    pub hook: String,

    #[serde(default = "default_audio_suffix")]
    pub subtitle: String,

    #[serde(default = "default_hook_suffix")]
    pub hook_subtitle: String,

    #[serde(default = "default_thumbnail_suffix")]
    pub thumbnail: String,
}

fn default_audio_suffix() -> String {
    "_audio".to_string()
}

fn default_hook_suffix() -> String {
    "_hook".to_string()
}

fn default_thumbnail_suffix() -> String {
    "_Hook".to_string()
}

impl Default for SuffixSettings {
    fn default() -> Self {
        Self {
            audio: default_audio_suffix(),
            hook: default_hook_suffix(),
            subtitle: default_audio_suffix(),
            hook_subtitle: default_hook_suffix(),
            thumbnail: default_thumbnail_suffix(),
        }
    }
}

/// Batch run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSettings {
    /// Folder scanned for inputs.
    #[serde(default)]
    pub input_folder: String,

    /// Folder of background videos.
    #[serde(default)]
    pub video_folder: String,

    /// Preset applied to every item.
    #[serde(default = "default_preset_name")]
    pub preset: String,

    #[serde(default)]
    pub suffixes: SuffixSettings,

    /// Copy the styled subtitle file next to each output video.
    #[serde(default)]
    pub copy_subtitles_to_output: bool,
}

fn default_preset_name() -> String {
    crate::presets::DEFAULT_PRESET_NAME.to_string()
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            input_folder: String::new(),
            video_folder: String::new(),
            preset: default_preset_name(),
            suffixes: SuffixSettings::default(),
            copy_subtitles_to_output: false,
        }
    }
}

/// Names of config sections for targeted updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigSection {
    Paths,
    Logging,
    Encoder,
    Background,
    Batch,
}

impl ConfigSection {
    pub const ALL: [ConfigSection; 5] = [
        ConfigSection::Paths,
        ConfigSection::Logging,
        ConfigSection::Encoder,
        ConfigSection::Background,
        ConfigSection::Batch,
    ];

    /// Get the TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Logging => "logging",
            ConfigSection::Encoder => "encoder",
            ConfigSection::Background => "background",
            ConfigSection::Batch => "batch",
        }
    }
}
