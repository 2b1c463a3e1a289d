mod config_commands;
mod display;

use std::{path::PathBuf, sync::Arc};

use {
    anyhow::{Context, bail},
    clap::{Parser, Subcommand},
    secrecy::Secret,
    streamchat_channels::{DisplayOptions, Overlay, SessionConfig},
    streamchat_config::{StreamchatConfig, validate},
    streamchat_youtube::YoutubeClient,
    tracing::{error, info, warn},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use crate::display::{OutputFormat, TerminalDisplay};

#[derive(Parser)]
#[command(name = "streamchat", about = "Streamchat: live chat overlay for YouTube streams")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file (default: ./streamchat.{toml,yaml,json}, then the user config dir).
    #[arg(long, global = true, env = "STREAMCHAT_CONFIG")]
    config: Option<PathBuf>,

    /// Channel username to follow (repeatable; replaces configured channels).
    #[arg(long = "channel", global = true)]
    channels: Vec<String>,

    /// YouTube Data API key.
    #[arg(long, global = true, env = "YOUTUBE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Maximum number of visible messages.
    #[arg(long, global = true)]
    limit: Option<usize>,

    /// Presentation pacing passed to the display.
    #[arg(long, global = true)]
    speed: Option<f64>,

    /// How messages are printed.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Follow the configured channels (default when no subcommand is provided).
    Run,
    /// Validate the effective configuration and print it.
    CheckConfig,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so stdout carries only chat lines.
    if cli.json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

/// Command-line values win over the file and the environment.
fn apply_cli_overrides(config: &mut StreamchatConfig, cli: &Cli) {
    if !cli.channels.is_empty() {
        config.youtube.channels = cli.channels.clone();
    }
    if let Some(key) = cli.api_key.as_ref().filter(|k| !k.is_empty()) {
        config.youtube.api_key = Some(Secret::new(key.clone()));
    }
    if let Some(limit) = cli.limit {
        config.overlay.limit = limit;
    }
    if let Some(speed) = cli.speed {
        config.overlay.speed = speed;
    }
}

fn effective_config(cli: &Cli) -> anyhow::Result<StreamchatConfig> {
    let mut config = streamchat_config::discover_and_load(cli.config.as_deref())
        .context("failed to load configuration")?;
    streamchat_config::apply_env_overrides(&mut config);
    apply_cli_overrides(&mut config, cli);
    Ok(config)
}

async fn run(config: StreamchatConfig, format: OutputFormat) -> anyhow::Result<()> {
    let result = validate(&config);
    for d in &result.diagnostics {
        warn!(path = d.path, severity = %d.severity, "{}", d.message);
    }
    if result.has_errors() {
        bail!("invalid configuration; run `streamchat check-config` for details");
    }

    let client = YoutubeClient::new(&config.youtube).context("failed to build YouTube client")?;
    let display = TerminalDisplay::new(DisplayOptions::from(&config.overlay), format);

    let handle = Overlay::new(
        SessionConfig::from(&config.youtube),
        Arc::new(client),
        Arc::new(display),
    )
    .start();

    let cancel = handle.cancel_token();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("interrupt received, shutting down"),
            Err(e) => error!(error = %e, "failed to listen for interrupt"),
        }
        cancel.cancel();
    });

    handle.wait().await;
    info!("session ended");
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "streamchat starting");

    let config = effective_config(&cli)?;

    match cli.command {
        None | Some(Commands::Run) => run(config, cli.format).await,
        Some(Commands::CheckConfig) => {
            let source = cli.config.clone().or_else(streamchat_config::find_config_file);
            if !config_commands::check(&config, source.as_deref())? {
                std::process::exit(1);
            }
            Ok(())
        },
    }
}
