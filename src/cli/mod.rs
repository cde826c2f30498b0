pub mod commands;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;

#[derive(Debug, Parser)]
#[command(name = "conduit-api")]
#[command(about = "Conduit API - social blogging backend")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Listen port (overrides SERVER_PORT/PORT)")]
    pub port: Option<u16>,

    #[arg(long, global = true, help = "Database URL (overrides DATABASE_URL)")]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(about = "Run migrations and serve the HTTP API (default)")]
    Serve,

    #[command(about = "Apply database migrations and exit")]
    Migrate,
}

impl Cli {
    /// Environment configuration with command-line overrides applied
    pub fn config(&self) -> AppConfig {
        let mut config = AppConfig::from_env();
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(url) = &self.database_url {
            config.database.url = url.clone();
        }
        config
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.config();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => commands::serve::handle(config).await,
        Commands::Migrate => commands::migrate::handle(config).await,
    }
}
