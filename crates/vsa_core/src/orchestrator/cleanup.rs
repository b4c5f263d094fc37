//! Removal of run intermediates.
//!
//! Runs on every exit path. Problems are collected as warnings and never
//! turn a finished run into a failed one.

use std::fs;
use std::io;
use std::path::Path;

use super::types::{CleanupWarning, Context, RunState};

/// Remove everything the run registered, plus the partial output when the
/// run failed. The work directory itself goes once it is empty.
pub fn cleanup(ctx: &Context, state: &RunState, succeeded: bool) -> Vec<CleanupWarning> {
    let mut warnings = Vec::new();

    for path in state.intermediates() {
        remove_file(path, &mut warnings);
    }

    if !succeeded {
        if let Some(ref output) = state.output_path {
            remove_file(output, &mut warnings);
        }
    }

    if let Err(e) = fs::remove_dir(&ctx.work_dir) {
        if e.kind() != io::ErrorKind::NotFound {
            // something outside this run still lives there
            tracing::debug!("Leaving work dir {}: {}", ctx.work_dir.display(), e);
        }
    }

    for warning in &warnings {
        ctx.logger.warn(&warning.to_string());
    }
    ctx.logger.debug(&format!(
        "[Cleanup] {} intermediates, {} warnings",
        state.intermediates().len(),
        warnings.len()
    ));

    warnings
}

fn remove_file(path: &Path, warnings: &mut Vec<CleanupWarning>) {
    match fs::remove_file(path) {
        Ok(()) => tracing::debug!("Removed {}", path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warnings.push(CleanupWarning {
            path: path.to_path_buf(),
            message: e.to_string(),
        }),
    }
}
