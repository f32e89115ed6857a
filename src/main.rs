use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use germany_jobs::admin_cli::{handle_admin_command, AdminCli};
use germany_jobs::{core::ConfigManager, start_web_server};
use std::fs::OpenOptions;
use tracing::info;

use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "germany-jobs", about = "The Germany Jobs API server and admin tools")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API (default)
    Serve,
    /// Database and content administration
    Admin(AdminCli),
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("germany_jobs=info,rocket::server=off"))
}

/// The log file location lives in the config, so loading it logs through a
/// scoped console subscriber until the global one is installed.
fn load_config<W>(make_writer: W) -> Result<ConfigManager>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let subscriber = fmt()
        .with_env_filter(env_filter())
        .with_writer(make_writer)
        .finish();
    tracing::subscriber::with_default(subscriber, ConfigManager::load)
}

fn init_tracing(config: &ConfigManager) -> Result<()> {
    let filter = env_filter();

    // JSON copy of the log, cleared on startup
    let file_layer = match &config.environment.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .json()
                    .with_writer(file)
                    .with_current_span(false)
                    .with_span_list(false),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(std::io::stdout)?;
    init_tracing(&config)?;
    info!("Environment: {}", ConfigManager::environment_name());

    match cli.command {
        Some(Command::Admin(admin)) => handle_admin_command(admin, &config).await,
        Some(Command::Serve) | None => start_web_server(config).await,
    }
}
