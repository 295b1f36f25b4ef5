use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::system::EngineSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "infoschema")]
#[command(about = "Browse the INFORMATION_SCHEMA of an SQLite database", long_about = None)]
pub struct Config {
    #[arg(short, long, default_value = "sqlite.db", env = "INFOSCHEMA_DATABASE")]
    pub database: String,

    #[arg(long, env = "INFOSCHEMA_IN_MEMORY", help = "Use an empty in-memory SQLite database")]
    pub in_memory: bool,

    #[arg(short, long, default_value = "SA", env = "INFOSCHEMA_USER", help = "Authorization the session runs as")]
    pub user: String,

    #[arg(long, default_value = "SA", env = "INFOSCHEMA_OWNER", help = "Administrator that owns every database object")]
    pub owner: String,

    #[arg(long, env = "INFOSCHEMA_GRANTS", help = "JSON file with users, roles and grants")]
    pub grants: Option<PathBuf>,

    #[arg(short, long, env = "INFOSCHEMA_QUERY", help = "SELECT to run against a system table")]
    pub query: Option<String>,

    #[arg(short, long, env = "INFOSCHEMA_TABLE", help = "System table to dump in full")]
    pub table: Option<String>,

    #[arg(long, value_enum, default_value = "table", env = "INFOSCHEMA_FORMAT")]
    pub format: OutputFormat,

    #[arg(long, env = "INFOSCHEMA_CACHE_STATUS", help = "Log materialization statistics on exit")]
    pub cache_status: bool,

    #[arg(long, default_value = "info", env = "INFOSCHEMA_LOG_LEVEL")]
    pub log_level: String,
}

impl Config {
    /// Get a configuration instance with all values resolved from CLI args and environment variables
    pub fn load() -> Self {
        Config::parse()
    }

    pub fn database_path(&self) -> Option<PathBuf> {
        (!self.in_memory).then(|| PathBuf::from(&self.database))
    }

    /// Facts reported by `SYSTEM_PROPERTIES` and `SYSTEM_SESSIONINFO`
    pub fn engine_settings(&self) -> EngineSettings {
        let mut properties = BTreeMap::new();
        if let Some(grants) = &self.grants {
            properties.insert("grants_file".to_string(), grants.display().to_string());
        }
        EngineSettings {
            database: if self.in_memory {
                ":memory:".to_string()
            } else {
                self.database.clone()
            },
            owner: self.owner.clone(),
            properties,
        }
    }
}
