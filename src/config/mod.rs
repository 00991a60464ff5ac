mod file_config;

pub use file_config::FileConfig;

use crate::server::{Env, RequestsLoggingLevel, ServerConfig};
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

/// CLI arguments that can be overridden by the TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub database: Option<PathBuf>,
    pub host: String,
    pub port: u16,
    pub base_path: Option<PathBuf>,
    pub env: Env,
    pub logging_level: RequestsLoggingLevel,
    pub parent_ipc: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        let server = ServerConfig::default();
        CliConfig {
            database: None,
            host: server.host,
            port: server.port,
            base_path: None,
            env: server.env,
            logging_level: server.requests_logging_level,
            parent_ipc: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: PathBuf,
    pub host: String,
    pub port: u16,
    pub base_path: Option<PathBuf>,
    pub env: Env,
    pub logging_level: RequestsLoggingLevel,
    pub parent_ipc: bool,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let database = file
            .database
            .map(PathBuf::from)
            .or_else(|| cli.database.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("database must be specified via --database or in config file")
            })?;

        if let Some(parent) = database.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                bail!("Database directory does not exist: {:?}", parent);
            }
        }

        let base_path = file
            .base_path
            .map(PathBuf::from)
            .or_else(|| cli.base_path.clone());
        if let Some(base_path) = &base_path {
            if !base_path.is_dir() {
                bail!("base_path is not a directory: {:?}", base_path);
            }
        }

        let env = match file.env {
            Some(s) => match Env::from_str(&s, true) {
                Ok(env) => env,
                Err(_) => bail!("Unknown env {:?}, expected development or production", s),
            },
            None => cli.env,
        };

        let logging_level = match file.logging_level {
            Some(s) => match parse_logging_level(&s) {
                Some(level) => level,
                None => bail!(
                    "Unknown logging_level {:?}, expected none, path, headers or body",
                    s
                ),
            },
            None => cli.logging_level.clone(),
        };

        Ok(Self {
            database,
            host: file.host.unwrap_or_else(|| cli.host.clone()),
            port: file.port.unwrap_or(cli.port),
            base_path,
            env,
            logging_level,
            parent_ipc: file.parent_ipc.unwrap_or(cli.parent_ipc),
        })
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            requests_logging_level: self.logging_level.clone(),
            host: self.host.clone(),
            port: self.port,
            env: self.env,
            base_path: self.base_path.clone(),
        }
    }
}

fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
