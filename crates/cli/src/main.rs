//! `catalog` command-line entrypoint.

use std::path::PathBuf;

use anyhow::Context;
use catalog_kernel::settings::Settings;
use clap::{Parser, Subcommand};

/// Book catalog service
#[derive(Parser, Debug)]
#[command(name = "catalog", version, about, long_about = None)]
struct Cli {
    /// Directory holding base.toml and {env}.toml
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Environment overlay to load (local, staging, production)
    #[arg(long, global = true)]
    env: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply migrations and serve the HTTP API
    Serve,

    /// Apply pending migrations and exit
    Migrate,

    /// Print the merged OpenAPI document
    Openapi,
}

impl Cli {
    fn settings(&self) -> anyhow::Result<Settings> {
        if self.config_dir.is_none() && self.env.is_none() {
            return Settings::load();
        }

        let config_dir = self
            .config_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("config"));
        let env = self.env.as_deref().unwrap_or("local");
        Settings::load_from(&config_dir, env)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = cli.settings().context("failed to load catalog settings")?;
    catalog_telemetry::init(&settings.telemetry);

    match cli.command {
        Command::Serve => catalog_app::serve(&settings).await?,
        Command::Migrate => {
            let applied = catalog_app::migrate(&settings).await?;
            println!("applied {applied} migration(s) to {}", settings.database.url);
        }
        Command::Openapi => {
            let document = catalog_app::openapi_document().await?;
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
    }

    Ok(())
}
