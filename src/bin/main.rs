use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use swarmvis::{
    core::{config::Config, landscape::Benchmark},
    vis::{animation::run_animation, summary::run_summary},
};
use tracing::info;
use tracing_appender::rolling::{self, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt};

/// Visualizes swarm optimizer run logs.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory for the daily rolling log files.
    #[arg(long, global = true, default_value = "logs")]
    log_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the default configuration to a TOML file.
    Init {
        #[arg(long, default_value = "swarmvis.toml")]
        path: PathBuf,
    },
    /// Animate agent movement over a benchmark landscape as a looping GIF.
    Animate {
        /// Configuration file. Defaults are used if omitted.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Benchmark function: Booth, Eggholder or Ackley.
        #[arg(short, long)]
        benchmark: Option<String>,
        /// Agents history CSV (iteration, agent_id, fitness, x0, x1).
        #[arg(long)]
        history: Option<PathBuf>,
        /// Output GIF file.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Plot median and interquartile band of best fitness over many runs.
    Summarize {
        /// Configuration file. Defaults are used if omitted.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Number of runs to load.
        #[arg(short, long)]
        epochs: Option<usize>,
        /// Output PNG file.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("swarmvis failed: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(&cli.log_dir).context("Failed to set up logging")?;
    info!("Starting swarmvis {}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Init { path } => {
            Config::default().save(&path)?;
            info!("Wrote default configuration to {}", path.display());
        }
        Command::Animate {
            config,
            benchmark,
            history,
            output,
        } => {
            let mut config = load_config(config.as_deref())?.animation;
            if let Some(name) = benchmark {
                config.benchmark = Benchmark::parse(&name)?;
            }
            if let Some(history) = history {
                config.history_path = history;
            }
            if let Some(output) = output {
                config.output_path = output;
            }
            run_animation(&config).context("Animation failed")?;
        }
        Command::Summarize {
            config,
            epochs,
            output,
        } => {
            let mut config = load_config(config.as_deref())?.summary;
            if let Some(epochs) = epochs {
                config.epoch_count = epochs;
            }
            if let Some(output) = output {
                config.output_path = output;
            }
            run_summary(&config).context("Summary failed")?;
        }
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    path.map_or_else(|| Ok(Config::default()), Config::load)
}

/// Logs to stdout and, if `log_dir` is writable, to a daily rolling file.
fn setup_logging(log_dir: &Path) -> Result<()> {
    let file_layer = match rolling::Builder::new()
        .rotation(Rotation::DAILY)
        .filename_prefix("swarmvis")
        .filename_suffix("log")
        .build(log_dir)
    {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            // the writer thread must outlive main
            std::mem::forget(guard);
            Some(
                fmt::Layer::new()
                    .with_writer(writer)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_ansi(false),
            )
        }
        Err(e) => {
            eprintln!(
                "Warning: Could not log to {} ({e}), using stdout only",
                log_dir.display()
            );
            None
        }
    };

    let subscriber = tracing_subscriber::registry()
        .with(
            fmt::Layer::new()
                .with_writer(std::io::stdout)
                .with_target(false)
                .with_ansi(true),
        )
        .with(file_layer);

    tracing::subscriber::set_global_default(subscriber).context("Failed to install logger")?;
    Ok(())
}
