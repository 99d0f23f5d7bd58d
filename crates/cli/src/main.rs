use std::path::PathBuf;

use anyhow::Context;
use bookstore_kernel::settings::Settings;
use clap::{Parser, Subcommand};

/// Bookstore catalogue server and maintenance commands.
#[derive(Debug, Parser)]
#[command(name = "bookstore-cli", version, about)]
struct Cli {
    /// Directory holding `base.toml` and `{env}.toml`
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Environment overlay loaded with `--config-dir` (local, staging, production)
    #[arg(long, global = true, default_value = "local")]
    env: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
    /// Print the effective settings as JSON
    Config,
}

impl Cli {
    fn settings(&self) -> anyhow::Result<Settings> {
        match &self.config_dir {
            Some(dir) => Settings::load_from(dir, &self.env),
            None => Settings::load(),
        }
        .with_context(|| "failed to load bookstore settings")
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = cli.settings()?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            bookstore_telemetry::init(&settings.telemetry);
            bookstore_app::app::serve(&settings).await
        }
        Command::Migrate => {
            bookstore_telemetry::init(&settings.telemetry);
            let applied = bookstore_app::app::migrate(&settings).await?;
            println!("{} migrations applied", applied);
            Ok(())
        }
        Command::Config => {
            let rendered = serde_json::to_string_pretty(&settings)
                .context("failed to render settings")?;
            println!("{}", rendered);
            Ok(())
        }
    }
}
