//! Background clip selection.

use std::fs;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::{BackgroundError, ShortfallPolicy};
use crate::media::MediaTools;

/// One chosen clip.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedClip {
    pub path: PathBuf,
    pub duration: f64,
}

/// Ordered clips to concatenate.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundPlan {
    pub clips: Vec<SelectedClip>,
    /// Duration the plan was built for.
    pub required: f64,
}

impl BackgroundPlan {
    pub fn covered(&self) -> f64 {
        self.clips.iter().map(|c| c.duration).sum()
    }

    pub fn is_short(&self) -> bool {
        self.covered() < self.required
    }
}

#[derive(Debug, Clone)]
pub struct SelectorOptions {
    /// Accepted extensions, lower case without the dot.
    pub extensions: Vec<String>,
    pub policy: ShortfallPolicy,
    pub seed: u64,
}

impl Default for SelectorOptions {
    fn default() -> Self {
        Self {
            extensions: vec!["mp4".to_string(), "mkv".to_string()],
            policy: ShortfallPolicy::default(),
            seed: 0,
        }
    }
}

pub struct BackgroundSelector<'a> {
    tools: &'a dyn MediaTools,
    options: SelectorOptions,
}

impl<'a> BackgroundSelector<'a> {
    pub fn new(tools: &'a dyn MediaTools, options: SelectorOptions) -> Self {
        Self { tools, options }
    }

    /// Readable video files in `folder`, sorted by path.
    ///
    /// Unreadable files are skipped with a warning.
    pub fn candidates(&self, folder: &Path) -> Result<Vec<PathBuf>, BackgroundError> {
        let entries = fs::read_dir(folder).map_err(|e| BackgroundError::io(folder, e))?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && self.has_video_extension(p))
            .collect();
        files.sort();

        let valid: Vec<PathBuf> = files
            .into_iter()
            .filter(|p| {
                let ok = self.tools.is_readable(p);
                if !ok {
                    tracing::warn!("Skipping unreadable background video: {}", p.display());
                }
                ok
            })
            .collect();

        tracing::debug!("{} valid background videos in {}", valid.len(), folder.display());
        Ok(valid)
    }

    /// Shuffle the folder's clips and take a prefix covering `total` seconds.
    pub fn select(&self, folder: &Path, total: f64) -> Result<BackgroundPlan, BackgroundError> {
        let mut candidates = self.candidates(folder)?;
        if candidates.is_empty() {
            return Err(BackgroundError::NoBackground {
                folder: folder.to_path_buf(),
            });
        }

        let mut rng = StdRng::seed_from_u64(self.options.seed);
        candidates.shuffle(&mut rng);

        let plan = self.accumulate(&candidates, total);
        if plan.clips.is_empty() {
            return Err(BackgroundError::NoBackground {
                folder: folder.to_path_buf(),
            });
        }

        self.apply_policy(plan)
    }

    /// Probe candidates in order until the running sum reaches `total`.
    fn accumulate(&self, candidates: &[PathBuf], total: f64) -> BackgroundPlan {
        let mut plan = BackgroundPlan {
            clips: Vec::new(),
            required: total,
        };
        let mut sum = 0.0;

        for path in candidates {
            if sum >= total && !plan.clips.is_empty() {
                break;
            }
            match self.tools.probe_duration(path) {
                Ok(d) if d > 0.0 => {
                    sum += d;
                    plan.clips.push(SelectedClip {
                        path: path.clone(),
                        duration: d,
                    });
                }
                Ok(_) => tracing::warn!("Skipping empty background video: {}", path.display()),
                Err(e) => tracing::warn!("Skipping background video: {}", e),
            }
        }

        plan
    }

    fn apply_policy(&self, mut plan: BackgroundPlan) -> Result<BackgroundPlan, BackgroundError> {
        if !plan.is_short() {
            return Ok(plan);
        }

        match self.options.policy {
            ShortfallPolicy::Fail => Err(BackgroundError::InsufficientCoverage {
                available: plan.covered(),
                required: plan.required,
            }),
            ShortfallPolicy::Proceed => {
                tracing::warn!(
                    "Background covers only {:.3}s of {:.3}s",
                    plan.covered(),
                    plan.required
                );
                Ok(plan)
            }
            ShortfallPolicy::Loop => {
                let cycle = plan.clips.clone();
                let mut sum = plan.covered();
                for clip in cycle.iter().cycle() {
                    if sum >= plan.required {
                        break;
                    }
                    sum += clip.duration;
                    plan.clips.push(clip.clone());
                }
                tracing::debug!(
                    "Looped {} background clips to cover {:.3}s",
                    cycle.len(),
                    plan.required
                );
                Ok(plan)
            }
        }
    }

    fn has_video_extension(&self, path: &Path) -> bool {
        path.extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .is_some_and(|ext| self.options.extensions.iter().any(|x| *x == ext))
    }
}
