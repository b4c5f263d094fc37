//! Lossless concatenation through the ffmpeg concat demuxer.

use std::fs;
use std::path::{Path, PathBuf};

use super::{BackgroundError, BackgroundPlan};
use crate::media::{FfmpegCommand, MediaTools};

/// Files produced by [`concatenate`]; both are run intermediates.
#[derive(Debug, Clone)]
pub struct ConcatOutput {
    pub video: PathBuf,
    pub manifest: PathBuf,
}

impl ConcatOutput {
    /// Paths used for `run_stamp` inside `work_dir`.
    pub fn for_run(work_dir: &Path, run_stamp: &str) -> Self {
        Self {
            video: work_dir.join(format!("background_{}.mp4", run_stamp)),
            manifest: work_dir.join(format!("background_list_{}.txt", run_stamp)),
        }
    }
}

/// One manifest entry. Single quotes in the path are closed, escaped and
/// reopened as the demuxer expects.
pub fn manifest_line(path: &Path) -> String {
    format!("file '{}'", path.to_string_lossy().replace('\'', "'\\''"))
}

/// Write the concat list for `plan` to `manifest`.
pub fn write_manifest(plan: &BackgroundPlan, manifest: &Path) -> Result<(), BackgroundError> {
    let mut content = String::new();
    for clip in &plan.clips {
        let absolute = if clip.path.is_absolute() {
            clip.path.clone()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(&clip.path))
                .unwrap_or_else(|_| clip.path.clone())
        };
        content.push_str(&manifest_line(&absolute));
        content.push('\n');
    }
    fs::write(manifest, content).map_err(|e| BackgroundError::io(manifest, e))
}

/// Stream-copy the listed clips and cut the result at `total` seconds.
pub fn concat_command(manifest: &Path, output: &Path, total: f64) -> FfmpegCommand {
    FfmpegCommand::new()
        .args(["-y", "-f", "concat", "-safe", "0", "-i"])
        .path_arg(manifest)
        .args(["-c", "copy", "-t"])
        .arg(format!("{:.3}", total))
        .path_arg(output)
}

/// Concatenate `plan` into `background_<stamp>.mp4` inside `work_dir`.
pub fn concatenate(
    tools: &dyn MediaTools,
    plan: &BackgroundPlan,
    work_dir: &Path,
    run_stamp: &str,
) -> Result<ConcatOutput, BackgroundError> {
    let output = ConcatOutput::for_run(work_dir, run_stamp);

    write_manifest(plan, &output.manifest)?;

    let command = concat_command(&output.manifest, &output.video, plan.required);
    tracing::debug!("{}", command.display(tools.ffmpeg_program()));
    tools.run_ffmpeg(&command)?;

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::background::SelectedClip;
    use crate::media::testing::FakeTools;
    use tempfile::tempdir;

    fn plan(paths: &[&str], required: f64) -> BackgroundPlan {
        BackgroundPlan {
            clips: paths
                .iter()
                .map(|p| SelectedClip {
                    path: PathBuf::from(p),
                    duration: 10.0,
                })
                .collect(),
            required,
        }
    }

    #[test]
    fn escapes_single_quotes() {
        assert_eq!(
            manifest_line(Path::new("/bg/it's fine.mp4")),
            "file '/bg/it'\\''s fine.mp4'"
        );
    }

    #[test]
    fn writes_manifest_in_plan_order() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("list.txt");
        write_manifest(&plan(&["/bg/b.mp4", "/bg/a.mp4", "/bg/b.mp4"], 25.0), &manifest).unwrap();

        let content = fs::read_to_string(&manifest).unwrap();
        assert_eq!(
            content,
            "file '/bg/b.mp4'\nfile '/bg/a.mp4'\nfile '/bg/b.mp4'\n"
        );
    }

    #[test]
    fn command_copies_streams_and_trims() {
        let cmd = concat_command(Path::new("/w/list.txt"), Path::new("/w/bg.mp4"), 35.02633);
        assert_eq!(
            cmd.get_args(),
            &[
                "-y", "-f", "concat", "-safe", "0", "-i", "/w/list.txt", "-c", "copy", "-t",
                "35.026", "/w/bg.mp4"
            ]
        );
    }

    #[test]
    fn concatenate_produces_run_scoped_files() {
        let dir = tempdir().unwrap();
        let tools = FakeTools::new();

        let out = concatenate(&tools, &plan(&["/bg/a.mp4"], 8.0), dir.path(), "42").unwrap();

        assert_eq!(out.video, dir.path().join("background_42.mp4"));
        assert!(out.video.exists());
        assert!(out.manifest.exists());
    }

    #[test]
    fn encoder_failure_is_concat_error() {
        let dir = tempdir().unwrap();
        let tools = FakeTools::new().failing_on("concat");

        let err = concatenate(&tools, &plan(&["/bg/a.mp4"], 8.0), dir.path(), "42").unwrap_err();
        assert!(matches!(err, BackgroundError::Concat(_)));
    }
}
