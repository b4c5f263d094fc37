//! `vsa` - assemble vertical shorts from audio, subtitles and background
//! footage.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context as _, Result};
use clap::{Args, Parser, Subcommand};

use vsa_core::config::{ConfigManager, ConfigSection};
use vsa_core::jobs::BatchProcessor;
use vsa_core::logging::{self, LogLevel};
use vsa_core::media::FfmpegTools;
use vsa_core::orchestrator::{Orchestrator, RunInputs};
use vsa_core::presets::{PresetStore, StyleConfig};
use vsa_core::subtitles::ResolvedStyle;

#[derive(Parser, Debug)]
#[command(name = "vsa", version, about = "Assemble vertical short videos", long_about = None)]
struct Cli {
    /// Settings file (created with defaults when missing)
    #[arg(short, long, default_value = "vsa.toml", global = true)]
    config: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Assemble one short
    Run(RunArgs),
    /// Assemble every item found in an input folder
    Batch(BatchArgs),
    /// Manage subtitle style presets
    Presets {
        #[command(subcommand)]
        action: PresetAction,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Main audio (.mp3 or .wav)
    #[arg(short, long)]
    audio: PathBuf,

    /// Folder of background videos
    #[arg(short, long)]
    backgrounds: PathBuf,

    /// Hook audio played before the main audio
    #[arg(long)]
    hook: Option<PathBuf>,

    /// Subtitles for the main audio
    #[arg(short, long)]
    subtitle: Option<PathBuf>,

    /// Subtitles for the hook
    #[arg(long)]
    hook_subtitle: Option<PathBuf>,

    /// Image shown while the hook plays
    #[arg(short, long)]
    thumbnail: Option<PathBuf>,

    /// Subtitle preset name
    #[arg(short, long, default_value = "Default")]
    preset: String,
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// Input folder (overrides the settings file)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Background video folder (overrides the settings file)
    #[arg(long)]
    videos: Option<PathBuf>,

    /// Preset applied to every item (overrides the settings file)
    #[arg(short, long)]
    preset: Option<String>,

    /// Stop at the first failed item
    #[arg(long)]
    stop_on_error: bool,

    /// Write the overrides back to the settings file
    #[arg(long)]
    save: bool,
}

#[derive(Subcommand, Debug)]
enum PresetAction {
    /// List preset names
    List,
    /// Print one preset as JSON
    Show { name: String },
    /// Add or replace a preset; unset fields take the default values
    Add {
        name: String,
        /// Field assignment such as `font_size=60` (repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        fields: Vec<String>,
    },
    /// Delete a preset ("Default" cannot be deleted)
    Delete { name: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ConfigManager::new(&cli.config);
    config
        .load_or_create()
        .with_context(|| format!("loading {}", cli.config.display()))?;
    config.ensure_dirs_exist()?;

    let level = if cli.verbose { LogLevel::Debug } else { LogLevel::Info };
    let _guard = logging::init_tracing_with_file(level, &config.logs_folder());

    match cli.command {
        Command::Run(args) => run_one(&config, args),
        Command::Batch(args) => run_batch(&mut config, args),
        Command::Presets { action } => presets(&config, action),
    }
}

fn tools(config: &ConfigManager) -> Arc<FfmpegTools> {
    let encoder = &config.settings().encoder;
    Arc::new(FfmpegTools::new(
        encoder.ffmpeg_path.clone(),
        encoder.ffprobe_path.clone(),
    ))
}

fn load_presets(config: &ConfigManager) -> PresetStore {
    PresetStore::load(&config.settings().paths.presets_file)
}

fn run_one(config: &ConfigManager, args: RunArgs) -> Result<()> {
    let store = load_presets(config);
    let Some(style) = store.get(&args.preset).cloned() else {
        bail!("unknown preset '{}' (have: {})", args.preset, store.names().join(", "));
    };

    let mut inputs = RunInputs::new(args.audio, args.backgrounds).with_style(style);
    inputs.hook_audio = args.hook;
    inputs.main_subtitle = args.subtitle;
    inputs.hook_subtitle = args.hook_subtitle;
    inputs.thumbnail = args.thumbnail;

    let handle = Orchestrator::new(config.settings().clone(), tools(config)).spawn(inputs);
    for event in handle.progress().iter() {
        tracing::info!("[{:>3}%] {}", event.percent, event.message);
    }

    let report = handle.join()?;
    for warning in &report.warnings {
        tracing::warn!("{}", warning);
    }
    println!("{}", report.output_path.display());
    Ok(())
}

fn run_batch(config: &mut ConfigManager, args: BatchArgs) -> Result<()> {
    {
        let batch = &mut config.settings_mut().batch;
        if let Some(input) = args.input {
            batch.input_folder = input.to_string_lossy().into_owned();
        }
        if let Some(videos) = args.videos {
            batch.video_folder = videos.to_string_lossy().into_owned();
        }
        if let Some(preset) = args.preset {
            batch.preset = preset;
        }
    }
    if args.save {
        config.update_section(ConfigSection::Batch)?;
    }

    let processor = BatchProcessor::new(config.settings().clone(), tools(config))
        .stop_on_error(args.stop_on_error);
    let summary = processor.run_configured(&mut |i, total, item| {
        eprintln!("[{}/{}] {}", i + 1, total, item.base_name);
    })?;

    for result in &summary.results {
        match (&result.output_path, &result.error) {
            (Some(path), _) => println!("ok     {}  {}", result.base_name, path.display()),
            (None, Some(error)) => println!("failed {}  {}", result.base_name, error),
            (None, None) => println!("failed {}", result.base_name),
        }
    }
    println!(
        "{} succeeded, {} failed{}",
        summary.succeeded(),
        summary.failed(),
        if summary.stopped_early { " (stopped early)" } else { "" }
    );

    if summary.failed() > 0 {
        bail!("{} item(s) failed", summary.failed());
    }
    Ok(())
}

fn presets(config: &ConfigManager, action: PresetAction) -> Result<()> {
    let mut store = load_presets(config);

    match action {
        PresetAction::List => {
            for name in store.names() {
                println!("{}", name);
            }
        }
        PresetAction::Show { name } => {
            let style = store
                .get(&name)
                .with_context(|| format!("unknown preset '{}'", name))?;
            println!("{}", serde_json::to_string_pretty(style)?);
        }
        PresetAction::Add { name, fields } => {
            let style = build_style(&name, &fields)?;
            ResolvedStyle::resolve(&style)?;
            store.upsert(style)?;
            println!("saved preset '{}'", name);
        }
        PresetAction::Delete { name } => {
            store.delete(&name)?;
            println!("deleted preset '{}'", name);
        }
    }
    Ok(())
}

/// Defaults overlaid with `key=value` assignments.
fn build_style(name: &str, fields: &[String]) -> Result<StyleConfig> {
    let mut value = serde_json::to_value(StyleConfig::named(name))?;
    let Some(map) = value.as_object_mut() else {
        bail!("preset did not serialize to an object");
    };

    for field in fields {
        let Some((key, val)) = field.split_once('=') else {
            bail!("expected KEY=VALUE, got '{}'", field);
        };
        let key = key.trim();
        if key == "name" || !map.contains_key(key) {
            bail!("unknown preset field '{}'", key);
        }
        map.insert(key.to_string(), serde_json::Value::String(val.trim().to_string()));
    }

    Ok(serde_json::from_value(value)?)
}
