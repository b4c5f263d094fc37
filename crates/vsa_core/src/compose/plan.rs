//! Layer graph for the final composite.
//!
//! Layer order is fixed: background, then optional subtitle burn-in, then
//! the optional thumbnail overlay. Each layer consumes the label produced
//! by the one before it; the last label is the video output.

use std::fmt;
use std::path::{Path, PathBuf};

/// Overlay length when there is no hook.
pub const DEFAULT_OVERLAY_SECS: f64 = 5.0;

/// Length of the thumbnail fade-out.
pub const FADE_OUT_SECS: f64 = 0.5;

/// Half-open interval of playback time `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnableWindow {
    pub start: f64,
    pub end: f64,
}

impl EnableWindow {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, t: f64) -> bool {
        t >= self.start && t < self.end
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// ffmpeg `enable=` expression.
    pub fn expression(&self) -> String {
        if self.start <= 0.0 {
            format!("lt(t,{:.3})", self.end)
        } else {
            format!("gte(t,{:.3})*lt(t,{:.3})", self.start, self.end)
        }
    }
}

/// Fade to transparent ending exactly at the window end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeOut {
    pub start: f64,
    pub duration: f64,
}

impl FadeOut {
    /// Fade of up to [`FADE_OUT_SECS`] finishing at `window.end`.
    pub fn ending_at(window: &EnableWindow) -> Self {
        let duration = FADE_OUT_SECS.min(window.duration().max(0.0));
        Self {
            start: (window.end - duration).max(0.0),
            duration,
        }
    }
}

/// What an encoder input carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputRole {
    Background,
    Audio,
    Thumbnail,
}

/// One `-i` input, in index order.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanInput {
    pub index: usize,
    pub path: PathBuf,
    pub role: InputRole,
    /// Still image repeated as a video stream.
    pub loop_still: bool,
}

/// Where a layer reads its video from.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamRef {
    /// Video stream of input `n`.
    Input(usize),
    /// Output label of an earlier layer.
    Label(String),
}

impl fmt::Display for StreamRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamRef::Input(n) => write!(f, "[{}:v]", n),
            StreamRef::Label(l) => write!(f, "[{}]", l),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayerOp {
    /// Pass-through of the background.
    Identity,
    /// Burn in a subtitle file, referenced by name relative to the
    /// encoder's working directory.
    SubtitleBurnIn { file_name: String },
    /// Centered overlay of `source` on top of the base, faded out.
    Overlay { source: usize, fade: FadeOut },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub op: LayerOp,
    pub base: StreamRef,
    pub output: String,
    pub window: EnableWindow,
}

impl Layer {
    /// Filter graph fragment for this layer.
    pub fn to_filter(&self) -> String {
        match &self.op {
            LayerOp::Identity => format!("{}null[{}]", self.base, self.output),
            LayerOp::SubtitleBurnIn { file_name } => format!(
                "{}ass='{}'[{}]",
                self.base,
                escape_filter_quoted(file_name),
                self.output
            ),
            LayerOp::Overlay { source, fade } => {
                let faded = format!("{}_faded", self.output);
                format!(
                    "[{}:v]format=rgba,fade=t=out:st={:.3}:d={:.3}:alpha=1[{}];\
                     {}[{}]overlay=(W-w)/2:(H-h)/2:enable='{}'[{}]",
                    source,
                    fade.start,
                    fade.duration,
                    faded,
                    self.base,
                    faded,
                    self.window.expression(),
                    self.output
                )
            }
        }
    }
}

/// Paths and timing for one composite.
#[derive(Debug, Clone)]
pub struct CompositionInputs<'a> {
    pub background: &'a Path,
    /// Staged subtitle file; only its file name reaches the graph.
    pub subtitle: Option<&'a Path>,
    pub audio: &'a Path,
    pub thumbnail: Option<&'a Path>,
    /// Duration of the hook clip, if one was used.
    pub hook_duration: Option<f64>,
    /// Assembled audio duration; the output is cut here.
    pub total_duration: f64,
}

/// Ordered inputs and layers; consumed once by the encoder invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositionPlan {
    pub inputs: Vec<PlanInput>,
    pub layers: Vec<Layer>,
    pub audio_input: usize,
    pub total_duration: f64,
}

impl CompositionPlan {
    /// Build the layer graph for `inputs`.
    pub fn build(inputs: &CompositionInputs<'_>) -> Self {
        let mut plan_inputs = vec![
            PlanInput {
                index: 0,
                path: inputs.background.to_path_buf(),
                role: InputRole::Background,
                loop_still: false,
            },
            PlanInput {
                index: 1,
                path: inputs.audio.to_path_buf(),
                role: InputRole::Audio,
                loop_still: false,
            },
        ];

        let full = EnableWindow::new(0.0, inputs.total_duration);
        let mut layers = vec![Layer {
            op: LayerOp::Identity,
            base: StreamRef::Input(0),
            output: "bg".to_string(),
            window: full,
        }];

        if let Some(subtitle) = inputs.subtitle {
            let file_name = subtitle
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| subtitle.to_string_lossy().into_owned());
            layers.push(Layer {
                op: LayerOp::SubtitleBurnIn { file_name },
                base: StreamRef::Label(last_label(&layers)),
                output: "subbed".to_string(),
                window: full,
            });
        }

        if let Some(thumbnail) = inputs.thumbnail {
            let index = plan_inputs.len();
            plan_inputs.push(PlanInput {
                index,
                path: thumbnail.to_path_buf(),
                role: InputRole::Thumbnail,
                loop_still: true,
            });

            let window = EnableWindow::new(0.0, overlay_duration(inputs.hook_duration));
            layers.push(Layer {
                op: LayerOp::Overlay {
                    source: index,
                    fade: FadeOut::ending_at(&window),
                },
                base: StreamRef::Label(last_label(&layers)),
                output: "v".to_string(),
                window,
            });
        }

        Self {
            inputs: plan_inputs,
            layers,
            audio_input: 1,
            total_duration: inputs.total_duration,
        }
    }

    /// Complete `-filter_complex` value.
    pub fn filter_graph(&self) -> String {
        self.layers
            .iter()
            .map(Layer::to_filter)
            .collect::<Vec<_>>()
            .join(";")
    }

    /// Label carrying the final video.
    pub fn video_output(&self) -> String {
        last_label(&self.layers)
    }
}

/// How long the thumbnail stays up.
pub fn overlay_duration(hook_duration: Option<f64>) -> f64 {
    match hook_duration {
        Some(d) if d > 0.0 => d,
        _ => DEFAULT_OVERLAY_SECS,
    }
}

fn last_label(layers: &[Layer]) -> String {
    layers
        .last()
        .map(|l| l.output.clone())
        .unwrap_or_else(|| "0:v".to_string())
}

/// Escape a value placed inside single quotes in a filter graph.
fn escape_filter_quoted(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "'\\''")
}
