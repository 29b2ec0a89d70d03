//! tales CLI: inspect and adjust the entity store. Backend selection comes from env (.env supported).

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use tales_store::{
    default_log_level, init_logging, logging_status, RepositoryFactory, StoreConfig,
};

#[derive(Parser)]
#[command(name = "tales")]
#[command(about = "Tales entity store CLI: stats, settings, set-server-name", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the record count of every collection.
    Stats,
    /// Print the effective server settings.
    Settings,
    /// Store a new server name in the settings record.
    SetServerName { name: String },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = StoreConfig::from_env().context(
        "Load store config from env (TALES_DB_DRIVER, SQLITE_PATH, MONGODB_CONNECTION_STRING)",
    )?;

    if let Some(log_dir) = &config.log_dir {
        let level = config.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir).context("Initialize logging (LOG_LEVEL, TALES_LOG_DIR)")?;
    }

    let factory = RepositoryFactory::open(&config)
        .with_context(|| format!("Open {} store", config.backend.name()))?;
    info!(
        "event=cli_start module=cli status=ok backend={}",
        factory.backend_name()
    );

    let outcome = match cli.command {
        Commands::Stats => handle_stats(&factory),
        Commands::Settings => handle_settings(&factory),
        Commands::SetServerName { name } => handle_set_server_name(&factory, name),
    };

    factory.close().context("Close store")?;
    outcome
}

fn handle_stats(factory: &RepositoryFactory) -> Result<()> {
    println!("backend: {}", factory.backend_name());
    println!("{}", logging_line(logging_status()));
    for (collection, count) in factory.collection_counts()? {
        println!("{collection:<20} {count}");
    }
    Ok(())
}

fn logging_line(status: Option<(&str, PathBuf)>) -> String {
    match status {
        Some((level, dir)) => format!("logging: {level} -> {}", dir.display()),
        None => "logging: off".to_string(),
    }
}

fn handle_settings(factory: &RepositoryFactory) -> Result<()> {
    let settings = factory.server_settings().get()?;
    println!("server name: {}", settings.server_name);
    if !settings.about.is_empty() {
        println!("about:       {}", settings.about);
    }
    Ok(())
}

fn handle_set_server_name(factory: &RepositoryFactory, name: String) -> Result<()> {
    let name = name.trim().to_string();
    if name.is_empty() {
        anyhow::bail!("server name cannot be empty");
    }

    let repo = factory.server_settings();
    let mut settings = repo.get()?;
    settings.server_name = name;
    let saved = repo.upsert(settings)?;
    println!("server name set to {}", saved.server_name);
    Ok(())
}
