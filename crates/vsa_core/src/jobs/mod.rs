//! Folder-driven batch runs.
//!
//! - `discovery`: pair input files by name suffix into [`BatchItem`]s
//! - [`BatchProcessor`]: run each item through a fresh orchestrator

mod discovery;
mod processor;
mod types;

pub use discovery::{base_names, discover, find_matching_files, MatchedFiles};
pub use processor::{BatchProcessor, BatchProgressCallback};
pub use types::{BatchError, BatchItem, BatchItemResult, BatchSummary};
