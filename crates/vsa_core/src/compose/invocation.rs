//! Encoder invocation builder.
//!
//! Turns a [`CompositionPlan`] into a single ffmpeg command run from the
//! work directory, so the staged subtitle resolves by file name.

use std::path::Path;

use crate::config::EncoderSettings;
use crate::media::FfmpegCommand;

use super::plan::CompositionPlan;

/// Output frame rate of the short.
pub const OUTPUT_FRAME_RATE: u32 = 30;

/// Target video bitrate.
pub const TARGET_VIDEO_BITRATE: &str = "5M";

/// Builder for the final encode command.
pub struct EncodeCommandBuilder<'a> {
    plan: &'a CompositionPlan,
    encoder: &'a EncoderSettings,
    output_path: &'a Path,
    work_dir: &'a Path,
}

impl<'a> EncodeCommandBuilder<'a> {
    pub fn new(
        plan: &'a CompositionPlan,
        encoder: &'a EncoderSettings,
        output_path: &'a Path,
        work_dir: &'a Path,
    ) -> Self {
        Self {
            plan,
            encoder,
            output_path,
            work_dir,
        }
    }

    /// Argument tokens, output path last.
    pub fn build_args(&self) -> Vec<String> {
        let mut tokens = vec!["-y".to_string()];

        if let Some(ref hwaccel) = self.encoder.hwaccel {
            if !hwaccel.is_empty() {
                tokens.push("-hwaccel".to_string());
                tokens.push(hwaccel.clone());
            }
        }

        self.add_inputs(&mut tokens);

        tokens.push("-filter_complex".to_string());
        tokens.push(self.plan.filter_graph());

        tokens.push("-map".to_string());
        tokens.push(format!("[{}]", self.plan.video_output()));
        tokens.push("-map".to_string());
        tokens.push(format!("{}:a", self.plan.audio_input));

        self.add_codec_options(&mut tokens);

        tokens.push("-t".to_string());
        tokens.push(format!("{:.3}", self.plan.total_duration));

        tokens.push(self.output_path.to_string_lossy().into_owned());
        tokens
    }

    /// Complete command, run from the work directory.
    pub fn build(&self) -> FfmpegCommand {
        FfmpegCommand::new()
            .args(self.build_args())
            .current_dir(self.work_dir)
    }

    fn add_inputs(&self, tokens: &mut Vec<String>) {
        for input in &self.plan.inputs {
            if input.loop_still {
                tokens.push("-loop".to_string());
                tokens.push("1".to_string());
            }
            tokens.push("-i".to_string());
            tokens.push(input.path.to_string_lossy().into_owned());
        }
    }

    fn add_codec_options(&self, tokens: &mut Vec<String>) {
        tokens.push("-c:v".to_string());
        tokens.push(self.encoder.video_codec.clone());

        if !self.encoder.preset.is_empty() {
            tokens.push("-preset".to_string());
            tokens.push(self.encoder.preset.clone());
        }

        tokens.push("-b:v".to_string());
        tokens.push(TARGET_VIDEO_BITRATE.to_string());
        tokens.push("-r".to_string());
        tokens.push(OUTPUT_FRAME_RATE.to_string());

        tokens.push("-c:a".to_string());
        tokens.push(self.encoder.audio_codec.clone());
    }
}
