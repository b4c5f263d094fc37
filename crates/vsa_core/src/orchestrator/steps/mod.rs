//! Pipeline step implementations, one per stage.

mod audio;
mod background;
mod encode;
mod plan;
mod probe;
mod subtitles;

pub use audio::AssembleAudioStep;
pub use background::SelectBackgroundStep;
pub use encode::EncodeStep;
pub use plan::PlanCompositionStep;
pub use probe::ProbeAudioStep;
pub use subtitles::MergeSubtitlesStep;
