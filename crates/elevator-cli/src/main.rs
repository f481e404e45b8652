use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use elevator_core::AppConfig;

mod commands;

#[derive(Parser)]
#[command(name = "elevator")]
#[command(author, version, about = "Scroll back to the top, the old fashioned way")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    overrides: Overrides,
}

/// Flags that override the config file for this run
#[derive(Args)]
struct Overrides {
    /// Ride in silence
    #[arg(long, global = true)]
    no_audio: bool,

    /// Ride duration in milliseconds (0 = based on distance)
    #[arg(long, global = true)]
    duration: Option<f64>,

    /// Stop this many rows above the target
    #[arg(long, global = true)]
    padding: Option<f64>,

    /// Element id to ride to, e.g. section-3
    #[arg(long, global = true)]
    target: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive demo page
    Run,
    /// Run a ride headless and print every scroll position
    Simulate {
        /// Starting scroll offset in rows
        #[arg(long, default_value_t = 5000.0)]
        from: f64,
        /// Virtual milliseconds between frames
        #[arg(long, default_value_t = 16.0)]
        step: f64,
        /// Lose focus after this many frames
        #[arg(long)]
        interrupt_after: Option<usize>,
        /// Page width used to lay out the sections
        #[arg(long, default_value_t = 80)]
        width: u16,
        /// Print JSON lines instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Play the configured sounds once
    SoundCheck,
    /// Show the effective configuration
    Config {
        /// Write the default config file if none exists
        #[arg(long)]
        init: bool,
    },
}

impl Overrides {
    fn apply(&self, config: &mut AppConfig) {
        if self.no_audio {
            config.audio.enabled = false;
        }
        if let Some(duration) = self.duration {
            config.elevator.duration_ms = Some(duration);
        }
        if let Some(padding) = self.padding {
            config.elevator.vertical_padding = padding;
        }
        if let Some(target) = &self.target {
            config.elevator.target_element = Some(target.clone());
        }
    }
}

/// Log to a file while the TUI owns the screen, to stderr otherwise
fn init_logging(config: &AppConfig, to_file: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.general.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if to_file {
        let path = config.log_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = AppConfig::load()?;
    cli.overrides.apply(&mut config);
    config.validate()?;

    let interactive = matches!(cli.command, Some(Commands::Run) | None);
    init_logging(&config, interactive)?;

    match cli.command {
        Some(Commands::Run) | None => commands::run::run(config).await,
        Some(Commands::Simulate {
            from,
            step,
            interrupt_after,
            width,
            json,
        }) => {
            let sim = commands::simulate::SimulateArgs {
                from,
                step,
                interrupt_after,
                width,
                json,
            };
            commands::simulate::run(&config, &sim)
        }
        Some(Commands::SoundCheck) => commands::sound_check::run(&config).await,
        Some(Commands::Config { init }) => commands::config::run(&config, init),
    }
}
