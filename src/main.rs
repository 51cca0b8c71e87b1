use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::json;

use asciiplay::ascii_render::AsciiRenderer;
use asciiplay::clock::ManualClock;
use asciiplay::config::{resolve_config, ColorPreference, ConfigOverrides, LoggingConfig};
use asciiplay::controller::PlaybackController;
use asciiplay::error::PlaybackError;
use asciiplay::error_codes::classify;
use asciiplay::frame_store::load_frame_store;
use asciiplay::logging::{init_logging, LogTarget};
use asciiplay::play::{run_play, PlayArgs};

#[derive(Debug, Parser)]
#[command(name = "asciiplay")]
#[command(version = env!("ASCIIPLAY_VERSION"))]
#[command(about = "Play precomputed ASCII video frames in the terminal")]
struct Cli {
    /// Log filter, e.g. `debug` or `asciiplay=trace`.
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Args)]
struct ColorArgs {
    /// Force truecolor output.
    #[arg(long, conflicts_with = "no_color")]
    color: bool,
    /// Draw glyphs only.
    #[arg(long)]
    no_color: bool,
}

impl ColorArgs {
    fn preference(&self) -> Option<ColorPreference> {
        match (self.color, self.no_color) {
            (true, _) => Some(ColorPreference::Always),
            (_, true) => Some(ColorPreference::Never),
            _ => None,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Interactive playback.
    Play {
        file: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, allow_negative_numbers = true)]
        start_frame: Option<i64>,
        #[arg(long)]
        paused: bool,
        #[command(flatten)]
        color: ColorArgs,
        #[arg(long)]
        refresh_hz: Option<u32>,
        #[arg(long)]
        no_watch: bool,
        #[arg(long)]
        log_file: Option<PathBuf>,
    },
    /// Validate a frames file and print its metadata.
    Info {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Print a single frame to stdout.
    Render {
        file: PathBuf,
        #[arg(long, allow_negative_numbers = true)]
        frame: i64,
        #[command(flatten)]
        color: ColorArgs,
    },
}

impl Commands {
    fn wants_json(&self) -> bool {
        matches!(self, Self::Info { json: true, .. })
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let json = cli.command.wants_json();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let coded = classify(&error);
            if json {
                match serde_json::to_string_pretty(&coded.envelope()) {
                    Ok(envelope) => println!("{envelope}"),
                    Err(_) => eprintln!("{coded}"),
                }
            } else {
                eprintln!("error: {error:#}");
            }
            ExitCode::from(coded.kind.exit_code() as u8)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Play {
            file,
            config,
            start_frame,
            paused,
            color,
            refresh_hz,
            no_watch,
            log_file,
        } => {
            let overrides = ConfigOverrides {
                refresh_hz,
                color: color.preference(),
                watch: no_watch.then_some(false),
                start_paused: paused.then_some(true),
                log_level: cli.log_level,
                log_file,
            };
            let config = resolve_config(config.as_deref(), overrides)?;
            init_logging(&config.logging, LogTarget::FileOnly)?;
            run_play(&file, PlayArgs::from_config(&config, start_frame))
        }
        Commands::Info { file, json } => {
            init_batch_logging(cli.log_level)?;
            run_info(&file, json)
        }
        Commands::Render { file, frame, color } => {
            init_batch_logging(cli.log_level)?;
            run_render(&file, frame, color.preference().unwrap_or_default())
        }
    }
}

fn init_batch_logging(level: Option<String>) -> Result<()> {
    let mut logging = LoggingConfig::default();
    if let Some(level) = level {
        logging.level = level;
    }
    init_logging(&logging, LogTarget::Stderr)?;
    Ok(())
}

fn run_info(path: &Path, json: bool) -> Result<()> {
    let store = load_frame_store(path)?;
    store
        .validate()
        .map_err(PlaybackError::from)
        .with_context(|| format!("invalid frames in {}", path.display()))?;
    let metadata = store.metadata();

    if json {
        let report = json!({
            "ok": true,
            "metadata": metadata,
            "colored": store.is_colored(),
            "frameIntervalMs": metadata.frame_interval().as_secs_f64() * 1000.0,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("OK: {}", path.display());
    println!("{}", metadata.summary());
    println!(
        "Colour: {}",
        if store.is_colored() { "yes" } else { "no" }
    );
    Ok(())
}

fn run_render(path: &Path, frame: i64, color: ColorPreference) -> Result<()> {
    let store = load_frame_store(path)?;
    let color_mode = color.resolve(store.is_colored());

    let mut controller = PlaybackController::new(ManualClock::new());
    controller
        .load(store)
        .with_context(|| format!("failed to load frames from {}", path.display()))?;
    controller.seek(frame)?;

    if let Some(frame) = controller.take_frame_to_present() {
        println!("{}", AsciiRenderer::new().render(frame, color_mode));
    }
    Ok(())
}
