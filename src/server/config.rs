use super::RequestsLoggingLevel;
use std::path::PathBuf;

/// Which static directories are served.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum Env {
    /// `public/` first, then the built bundle in `dist/`.
    Development,
    /// Only the built bundle in `dist/`.
    #[default]
    Production,
}

impl std::fmt::Display for Env {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Env::Development => write!(f, "development"),
            Env::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub host: String,
    pub port: u16,
    pub env: Env,
    /// Directory holding `dist/` (and `public/` in development). Without
    /// it no static files are served.
    pub base_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            host: "0.0.0.0".to_string(),
            port: 3000,
            env: Env::Production,
            base_path: None,
        }
    }
}
