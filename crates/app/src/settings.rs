//! Process settings.
//!
//! Sources, lowest priority first: built-in defaults, the TOML file
//! (`config/ledger.toml` unless `--config` says otherwise), `LEDGER__*`
//! environment variables, then command line flags.

use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use engine::{BalancePolicy, DEFAULT_EDIT_WINDOW_HOURS, EditWindow};
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "config/ledger.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

#[derive(Debug, Deserialize)]
pub struct Ledger {
    pub edit_window_hours: i64,
    pub balance_policy: BalancePolicy,
}

impl Ledger {
    pub fn edit_window(&self) -> Result<EditWindow, ConfigError> {
        EditWindow::try_hours(self.edit_window_hours).ok_or_else(|| {
            ConfigError::Message(format!(
                "ledger.edit_window_hours must be a non-negative number of hours, got {}",
                self.edit_window_hours
            ))
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub ledger: Ledger,
}

#[derive(Debug, Parser)]
#[command(name = "ledgerd", about = "Personal finance ledger service")]
struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override the listening port.
    #[arg(long)]
    port: Option<u16>,
    /// SQLite database path, or `memory` for an in-memory database.
    #[arg(long)]
    database: Option<String>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_args(Args::parse())
    }

    fn from_args(args: Args) -> Result<Self, ConfigError> {
        let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
        let mut builder = Config::builder()
            .set_default("app.level", "info")?
            .set_default("server.bind", "127.0.0.1")?
            .set_default("server.port", 5000)?
            .set_default("server.database", "memory")?
            .set_default("ledger.edit_window_hours", DEFAULT_EDIT_WINDOW_HOURS)?
            .set_default("ledger.balance_policy", "append_only")?
            .add_source(File::with_name(config_path).required(false))
            .add_source(Environment::with_prefix("LEDGER").separator("__"));

        if let Some(port) = args.port {
            builder = builder.set_override("server.port", i64::from(port))?;
        }

        let mut settings: Settings = builder.build()?.try_deserialize()?;
        if let Some(database) = args.database {
            settings.server.database = parse_database_flag(&database);
        }
        settings.ledger.edit_window()?;

        Ok(settings)
    }
}

fn parse_database_flag(value: &str) -> Database {
    match value {
        "memory" => Database::Memory,
        path => Database::Sqlite(path.to_string()),
    }
}
