//! Composition planning: layer graph and encoder invocation.

mod invocation;
mod plan;

pub use invocation::{EncodeCommandBuilder, OUTPUT_FRAME_RATE, TARGET_VIDEO_BITRATE};
pub use plan::{
    overlay_duration, CompositionInputs, CompositionPlan, EnableWindow, FadeOut, InputRole, Layer,
    LayerOp, PlanInput, StreamRef, DEFAULT_OVERLAY_SECS, FADE_OUT_SECS,
};
