use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::{fmt::Debug, path::PathBuf};
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use jukebox_server::config::{AppConfig, CliConfig, FileConfig};
use jukebox_server::server::{state::GuardedLibraryStore, Env};
use jukebox_server::{run_server, RequestsLoggingLevel, SqliteLibraryStore};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to the SQLite library database file. Created if missing.
    #[clap(long, value_parser = parse_path)]
    pub database: Option<PathBuf>,

    /// Optional TOML config file. Its values override the other arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// The address to listen on.
    #[clap(long, default_value = "0.0.0.0")]
    pub host: String,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3000)]
    pub port: u16,

    /// Directory containing the app's dist/ (and public/) folders.
    #[clap(long, value_parser = parse_path)]
    pub base_path: Option<PathBuf>,

    #[clap(long, default_value = "production")]
    pub env: Env,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Exchange JSON actions with a parent process over stdin/stdout.
    #[clap(long)]
    pub parent_ipc: bool,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            database: self.database.clone(),
            host: self.host.clone(),
            port: self.port,
            base_path: self.base_path.clone(),
            env: self.env,
            logging_level: self.logging_level.clone(),
            parent_ipc: self.parent_ipc,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()?;

    let file_config = cli_args
        .config
        .as_deref()
        .map(FileConfig::load)
        .transpose()?;
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    info!("Opening library database at {:?}...", config.database);
    let store = SqliteLibraryStore::new(&config.database)?;
    let jwt_key = store.prefs().jwt_key()?;
    let library: GuardedLibraryStore = Arc::new(store);

    info!("Starting server in {} mode", config.env);
    run_server(
        config.server_config(),
        library,
        &jwt_key,
        config.parent_ipc,
    )
    .await
}
