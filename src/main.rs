use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use app_update_checker::config::{self, CheckerConfig};
use app_update_checker::logging;
use app_update_checker::service::events::ConsoleSink;
use app_update_checker::service::resolver::UpdateResolver;
use app_update_checker::service::scheduler::Scheduler;
use app_update_checker::version::fetcher::HttpFetcher;
use app_update_checker::version::inventory::JsonFileInventory;
use app_update_checker::version::store::{SettingsStore, SqliteSettings};

#[derive(Parser)]
#[command(name = "app-update-checker")]
#[command(version, about = "Reports new catalog releases for installed apps")]
struct Cli {
    /// Configuration file (defaults to config.json in the data directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Installed-apps inventory (defaults to installed.json in the data directory)
    #[arg(long, global = true)]
    inventory: Option<PathBuf>,

    /// Write the log file as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Check daily at the configured time until interrupted (default)
    Run,
    /// Check once now and print the outstanding updates
    Check {
        /// Register a notification for each newly found update
        #[arg(long)]
        notify: bool,
        /// Accepted for compatibility; updates are never installed
        #[arg(long)]
        update: bool,
    },
    /// Read or write a host setting
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print the JSON value stored under a key
    Get { key: String },
    /// Store a JSON value under a key (e.g. `set updateHr 21`)
    Set { key: String, value: String },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    std::fs::create_dir_all(config::data_dir()).context("failed to create data directory")?;
    let _log_guard = logging::init(&config::log_path(), cli.log_json)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = Arc::new(SqliteSettings::new(&config::db_path())?);

    if let Some(Command::Settings { action }) = &cli.command {
        return settings_command(&*settings, action);
    }

    let config_path = cli.config.unwrap_or_else(config::config_path);
    let checker_config = CheckerConfig::load(&config_path)
        .with_context(|| format!("failed to load configuration from {:?}", config_path))?;
    let inventory_path = cli.inventory.unwrap_or_else(config::inventory_path);

    let resolver = UpdateResolver::new(
        settings,
        Arc::new(JsonFileInventory::new(&inventory_path)),
        Arc::new(HttpFetcher::new()?),
        Arc::new(ConsoleSink),
        checker_config.catalogs,
    );
    let scheduler = Scheduler::new(resolver);

    match cli.command {
        Some(Command::Check { notify, update }) => {
            scheduler.check_now(notify, update).await;
            scheduler.shutdown();
            if let Some(report) = scheduler.last_report() {
                for entry in &report.updates {
                    println!("{}\t{}", entry.display_name, entry.url);
                }
                if !report.status.is_empty() {
                    anyhow::bail!(report.status);
                }
            }
            Ok(())
        }
        _ => {
            scheduler.start()?;
            info!("Waiting for scheduled checks, press Ctrl-C to stop");
            tokio::signal::ctrl_c().await?;
            scheduler.shutdown();
            Ok(())
        }
    }
}

fn settings_command(settings: &dyn SettingsStore, action: &SettingsAction) -> anyhow::Result<()> {
    match action {
        SettingsAction::Get { key } => {
            match settings.get(key)? {
                Some(value) => println!("{}", value),
                None => println!("null"),
            }
            Ok(())
        }
        SettingsAction::Set { key, value } => {
            let value = serde_json::from_str(value)
                .with_context(|| format!("value for {} is not valid JSON", key))?;
            settings.set(key, value)?;
            Ok(())
        }
    }
}
