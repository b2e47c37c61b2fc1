//! Severn Bridge Monitor CLI
//!
//! One-shot status, continuous watch, and offline replay of saved payloads.

use std::path::PathBuf;
use std::sync::Arc;

use bridge_monitor::{
    error::{AppError, Result},
    models::{Config, WeatherData},
    pipeline::{self, Monitor, temporal},
    present::{ConsoleReport, StatusPresenter},
    services::{ClosureFeedClient, ClosureSource, FileSource, WeatherClient},
    storage::{Clock, ManualClock, SystemClock},
};
use chrono::Utc;
use clap::{Parser, Subcommand};

/// Severn Bridge Monitor - M48 and M4 crossing status
#[derive(Parser, Debug)]
#[command(
    name = "bridge-monitor",
    version,
    about = "Open, restricted and closed status for the Severn bridge crossings"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "bridge-monitor.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch closures and weather once and print the status
    Status {
        /// Print JSON instead of a text report
        #[arg(long)]
        json: bool,
    },

    /// Keep monitoring until interrupted, printing each new snapshot
    Watch,

    /// Evaluate a saved XML or JSON closures payload offline
    Replay {
        /// Payload file
        file: PathBuf,

        /// Evaluate at this RFC 3339 instant instead of now
        #[arg(long)]
        at: Option<String>,

        /// Print JSON instead of a text report
        #[arg(long)]
        json: bool,
    },

    /// Print the weather summary
    Weather,

    /// Validate the configuration file
    Validate,
}

/// Initialize logging with the given default filter.
fn init_logging(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

async fn fetch_weather(config: &Config) -> Option<WeatherData> {
    if !config.weather.enabled {
        return None;
    }

    let result = async {
        let client = WeatherClient::new(&config.feed, &config.weather, Arc::new(SystemClock))?;
        client.fetch().await
    }
    .await;

    match result {
        Ok(weather) => Some(weather),
        Err(e) => {
            log::warn!("Weather unavailable: {}", e);
            None
        }
    }
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = Config::load(&cli.config);
    let level = match (&loaded, cli.verbose) {
        (_, true) => "debug".to_string(),
        (Ok(config), false) => config.logging.level.clone(),
        (Err(_), false) => "info".to_string(),
    };
    init_logging(&level);

    let config = loaded.unwrap_or_else(|e| {
        log::warn!(
            "Failed to load config from {}: {}. Using defaults.",
            cli.config.display(),
            e
        );
        Config::default()
    });

    let report = ConsoleReport::new(config.monitor.countdown_window());

    match cli.command {
        Command::Status { json } => {
            let source = ClosureFeedClient::new(&config.feed)?;
            let (records, weather) =
                futures::future::join(source.fetch(), fetch_weather(&config)).await;

            let now = Utc::now();
            let data = pipeline::evaluate(&records?, now);

            if json {
                print_json(&serde_json::json!({ "bridges": data, "weather": weather }))?;
            } else {
                println!("{}", report.render_status(&data, now));
                if let Some(weather) = &weather {
                    println!("\n{}", report.render_weather(weather));
                }
            }
        }

        Command::Watch => {
            let source = Arc::new(ClosureFeedClient::new(&config.feed)?);
            let monitor = Arc::new(Monitor::new(&config, source));
            let mut updates = monitor.subscribe();

            let printer = {
                let monitor = Arc::clone(&monitor);
                tokio::spawn(async move {
                    while updates.changed().await.is_ok() {
                        let snapshot = updates.borrow_and_update().clone();
                        if let Some(data) = snapshot {
                            println!("{}\n", report.render_status(&data, monitor.clock().now()));
                        }
                    }
                })
            };

            monitor
                .run(async {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        log::error!("Failed to listen for Ctrl-C: {}", e);
                    }
                })
                .await?;
            printer.abort();
        }

        Command::Replay { file, at, json } => {
            let now = match at {
                Some(text) => temporal::parse_utc(&text).ok_or_else(|| {
                    AppError::validation(format!("--at must be an RFC 3339 timestamp, got {text:?}"))
                })?,
                None => Utc::now(),
            };

            let source = FileSource::new(&file);
            log::info!("Replaying closures from {}", source.name());

            let clock = Arc::new(ManualClock::new(now));
            let monitor = Monitor::with_clock(&config, Arc::new(source), clock.clone());
            let data = monitor.refresh(clock.now()).await?;

            if json {
                print_json(&serde_json::to_value(&*data)?)?;
            } else {
                println!("{}", report.render_status(&data, now));
                println!("\n{}", report.render_upcoming(&data, now));
            }
        }

        Command::Weather => {
            let client = WeatherClient::new(&config.feed, &config.weather, Arc::new(SystemClock))?;
            let weather = client.fetch().await?;
            println!("{}", report.render_weather(&weather));
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");

            match config.feed.resolve_api_key() {
                Ok(_) => log::info!("✓ API key found"),
                Err(e) => log::warn!("{}", e),
            }

            log::info!("All validations passed!");
        }
    }

    Ok(())
}
