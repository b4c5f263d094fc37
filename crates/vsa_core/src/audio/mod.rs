//! Audio assembly: optional hook clip followed by the main clip.
//!
//! The assembled duration is always re-measured from the encoded file.
//! Encoding can shift the length by a few milliseconds and every later
//! offset depends on it.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::media::{FfmpegCommand, MediaAsset, MediaTools, ProbeError, ToolError};

/// Audio containers the assembler can decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Mp3,
    Wav,
}

impl AudioFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        match ext.as_str() {
            "mp3" => Some(Self::Mp3),
            "wav" => Some(Self::Wav),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
        }
    }
}

#[derive(Error, Debug)]
pub enum AssemblyError {
    #[error("Unsupported audio format '{}' (only mp3 and wav are supported)", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Audio encode failed: {0}")]
    Encode(#[from] ToolError),

    #[error("Audio probe failed: {0}")]
    Probe(#[from] ProbeError),
}

/// Result of assembly.
#[derive(Debug, Clone)]
pub struct AssembledAudio {
    pub path: PathBuf,
    pub total_duration: f64,
    /// True when `path` is a run intermediate (not a source asset).
    pub is_intermediate: bool,
}

/// Concatenates hook and main audio into one asset.
pub struct AudioAssembler<'a> {
    tools: &'a dyn MediaTools,
    work_dir: &'a Path,
    run_stamp: &'a str,
}

impl<'a> AudioAssembler<'a> {
    pub fn new(tools: &'a dyn MediaTools, work_dir: &'a Path, run_stamp: &'a str) -> Self {
        Self {
            tools,
            work_dir,
            run_stamp,
        }
    }

    /// Path of the merged intermediate for this run.
    pub fn merged_path(&self) -> PathBuf {
        self.work_dir.join(format!("merged_{}.mp3", self.run_stamp))
    }

    /// Build the ffmpeg invocation that concatenates `hook` then `main`.
    pub fn build_command(&self, hook: &Path, main: &Path) -> FfmpegCommand {
        FfmpegCommand::new()
            .args(["-y", "-i"])
            .path_arg(hook)
            .arg("-i")
            .path_arg(main)
            .args([
                "-filter_complex",
                "[0:a][1:a]concat=n=2:v=0:a=1[a]",
                "-map",
                "[a]",
                "-c:a",
                "libmp3lame",
                "-q:a",
                "2",
            ])
            .path_arg(&self.merged_path())
    }

    /// Assemble `hook` (if any) followed by `main`.
    pub fn assemble(
        &self,
        hook: Option<&MediaAsset>,
        main: &MediaAsset,
    ) -> Result<AssembledAudio, AssemblyError> {
        let Some(hook) = hook else {
            return Ok(AssembledAudio {
                path: main.path().to_path_buf(),
                total_duration: main.duration(self.tools)?,
                is_intermediate: false,
            });
        };

        for asset in [hook, main] {
            if AudioFormat::from_path(asset.path()).is_none() {
                return Err(AssemblyError::UnsupportedFormat(asset.path().to_path_buf()));
            }
        }

        let command = self.build_command(hook.path(), main.path());
        tracing::debug!("{}", command.display(self.tools.ffmpeg_program()));
        self.tools.run_ffmpeg(&command)?;

        let path = self.merged_path();
        let total_duration = self.tools.probe_duration(&path)?;

        tracing::debug!(
            "Assembled audio {:.3}s -> {}",
            total_duration,
            path.display()
        );

        Ok(AssembledAudio {
            path,
            total_duration,
            is_intermediate: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::testing::FakeTools;
    use tempfile::tempdir;

    #[test]
    fn without_hook_uses_main_directly() {
        let dir = tempdir().unwrap();
        let tools = FakeTools::new().with_duration("/in/story_audio.mp3", 42.5);
        let main = MediaAsset::new("/in/story_audio.mp3");

        let result = AudioAssembler::new(&tools, dir.path(), "1")
            .assemble(None, &main)
            .unwrap();

        assert_eq!(result.path, PathBuf::from("/in/story_audio.mp3"));
        assert_eq!(result.total_duration, 42.5);
        assert!(!result.is_intermediate);
        assert!(tools.calls().is_empty());
    }

    #[test]
    fn remeasures_encoded_output_instead_of_summing() {
        let dir = tempdir().unwrap();
        let tools = FakeTools::new()
            .with_duration("/in/hook.mp3", 5.0)
            .with_duration("/in/main.wav", 30.0)
            .with_output_duration("merged_", 35.026);
        let hook = MediaAsset::new("/in/hook.mp3");
        let main = MediaAsset::new("/in/main.wav");

        let result = AudioAssembler::new(&tools, dir.path(), "1700000000000")
            .assemble(Some(&hook), &main)
            .unwrap();

        assert_eq!(result.total_duration, 35.026);
        assert_eq!(result.path, dir.path().join("merged_1700000000000.mp3"));
        assert!(result.is_intermediate);
        assert!(result.path.exists());

        let calls = tools.calls();
        assert_eq!(calls.len(), 1);
        let args = calls[0].get_args();
        let hook_pos = args.iter().position(|a| a == "/in/hook.mp3").unwrap();
        let main_pos = args.iter().position(|a| a == "/in/main.wav").unwrap();
        assert!(hook_pos < main_pos, "hook must come first");
    }

    #[test]
    fn rejects_unsupported_format() {
        let dir = tempdir().unwrap();
        let tools = FakeTools::new();
        let hook = MediaAsset::new("/in/hook.ogg");
        let main = MediaAsset::new("/in/main.mp3");

        let err = AudioAssembler::new(&tools, dir.path(), "1")
            .assemble(Some(&hook), &main)
            .unwrap_err();

        assert!(matches!(err, AssemblyError::UnsupportedFormat(_)));
        assert!(tools.calls().is_empty());
    }

    #[test]
    fn encoder_failure_is_encode_error() {
        let dir = tempdir().unwrap();
        let tools = FakeTools::new().failing_on("concat=n=2");
        let hook = MediaAsset::new("/in/hook.mp3");
        let main = MediaAsset::new("/in/main.mp3");

        let err = AudioAssembler::new(&tools, dir.path(), "1")
            .assemble(Some(&hook), &main)
            .unwrap_err();

        assert!(matches!(err, AssemblyError::Encode(_)));
    }

    #[test]
    fn format_detection_is_case_insensitive() {
        assert_eq!(AudioFormat::from_path(Path::new("a.WAV")), Some(AudioFormat::Wav));
        assert_eq!(AudioFormat::from_path(Path::new("a.Mp3")), Some(AudioFormat::Mp3));
        assert_eq!(AudioFormat::from_path(Path::new("a.flac")), None);
    }
}
