use anyhow::{Context, Result};
use busy_bot::config::{default_config_path, Overrides};
use busy_bot::platform::{self, Desktop, SimulatedDesktop};
use busy_bot::{BotController, ConsoleSurface, ControlSurface, Runner, Settings};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "busybot")]
#[command(about = "Keeps a window busy by typing into it at a fixed interval")]
#[command(version)]
struct Cli {
    /// Settings file (defaults to appsettings.json next to the executable)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Time between lines, HH:MM:SS
    #[arg(short, long)]
    interval: Option<String>,

    /// Window class name of the target window
    #[arg(short = 'w', long)]
    find_class: Option<String>,

    /// Text typed on every line
    #[arg(short, long)]
    message: Option<String>,

    /// Lines per block
    #[arg(short, long, allow_negative_numbers = true)]
    lines: Option<i64>,

    /// Log keystrokes against a simulated desktop instead of typing them
    #[arg(long)]
    simulate: bool,

    /// Write the default settings to the settings file and exit
    #[arg(long)]
    init: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Error running busy bot: {:#}", e);
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);

    if cli.init {
        Settings::default().save_to_file(&config_path)?;
        println!(
            "{} {}",
            "Wrote default settings to".green(),
            config_path.display()
        );
        return Ok(());
    }

    info!("Loading settings from {}", config_path.display());
    let overrides = Overrides {
        interval: cli.interval,
        find_class: cli.find_class,
        message: cli.message,
        lines_to_write: cli.lines,
    };
    let settings = Settings::from_file(&config_path)?.with_overrides(&overrides);

    let desktop: Box<dyn Desktop + Send> = if cli.simulate {
        info!("Simulating a desktop with a '{}' window", settings.find_class);
        Box::new(SimulatedDesktop::with_window(&settings.find_class))
    } else {
        platform::native()?
    };

    let mut surface = ConsoleSurface::new();
    let controller = match BotController::new(settings, desktop) {
        Ok(controller) => controller,
        Err(e) if e.is_startup_validation() => {
            let message = format!(
                "{}. Double check the settings and modify {} as required.",
                e,
                config_path.display()
            );
            surface.show_error("Configuration Error", &message);
            info!("Startup validation failed, exiting");
            return Ok(());
        }
        Err(e) => return Err(e).context("failed to start busy bot"),
    };

    info!("Starting busy bot");
    let summary = Runner::new(controller, surface).run().await?;
    info!(
        "Ending busy bot: {} lines typed, final state {}",
        summary.lines_typed, summary.state
    );
    Ok(())
}
