//! Layered configuration: `.env`, `config/base.toml`, `config/{env}.toml`,
//! then `BOOKSTORE_*` variables (`BOOKSTORE_DATABASE__URL` sets `database.url`).

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

const ENV_PREFIX: &str = "BOOKSTORE";
const ENVIRONMENT_VAR: &str = "BOOKSTORE_ENV";
const CONFIG_DIR_VAR: &str = "BOOKSTORE_CONFIG_DIR";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Staging,
    Production,
}

impl Environment {
    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(match value {
            "local" => Environment::Local,
            "staging" => Environment::Staging,
            "production" => Environment::Production,
            other => bail!(
                "unsupported environment '{}'; expected local/staging/production",
                other
            ),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub environment: Environment,
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub telemetry: TelemetrySettings,
}

impl Settings {
    /// Resolve the environment and config directory from the process
    /// environment (`BOOKSTORE_ENV`, `BOOKSTORE_CONFIG_DIR`) and load.
    pub fn load() -> anyhow::Result<Self> {
        // a missing .env is fine
        dotenvy::dotenv().ok();

        let environment =
            std::env::var(ENVIRONMENT_VAR).unwrap_or_else(|_| Environment::default().as_str().into());
        let config_dir = match std::env::var_os(CONFIG_DIR_VAR) {
            Some(dir) => PathBuf::from(dir),
            None => std::env::current_dir()
                .context("cannot resolve the working directory")?
                .join("config"),
        };

        Self::load_from(&config_dir, &environment)
    }

    /// Missing files are skipped; an unknown environment name is an error.
    pub fn load_from(config_dir: &Path, environment: &str) -> anyhow::Result<Self> {
        let environment: Environment = environment.parse()?;

        let layered = config::Config::builder()
            .add_source(config::File::from(config_dir.join("base.toml")).required(false))
            .add_source(
                config::File::from(config_dir.join(format!("{}.toml", environment.as_str())))
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("failed to read settings from {}", config_dir.display()))?;

        let mut settings: Settings = layered
            .try_deserialize()
            .context("settings do not match the expected shape")?;
        settings.environment = environment;
        Ok(settings)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub request_timeout_ms: u64,
}

impl ServerSettings {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            request_timeout_ms: 15_000,
        }
    }
}

/// Which store backs the book and category gateways.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub backend: StoreBackend,
    /// sqlx connection string; `sqlite::memory:` gives a throwaway database.
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Sqlite,
            url: "sqlite://bookstore.db".into(),
            max_connections: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetrySettings {
    pub log_format: LogFormat,
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            level: "info".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}
