//! Media Import Tool
//!
//! Reads newline-delimited JSON media submissions (the same shape the
//! scanner produces) and adds each one to the library database.

use anyhow::{Context, Result};
use clap::Parser;
use jukebox_server::library::{LibraryError, LibraryStore, NewMedia, SqliteLibraryStore};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cli-import")]
#[command(about = "Add newline-delimited JSON media to a library database")]
struct Args {
    /// Path to the SQLite library database file
    #[arg(value_name = "DATABASE")]
    database: PathBuf,

    /// NDJSON file to read. Reads stdin when omitted.
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Stop at the first line that fails to import
    #[arg(long, default_value_t = false)]
    fail_fast: bool,
}

#[derive(Debug, Default, PartialEq)]
struct ImportStats {
    added: usize,
    invalid: usize,
    failed: usize,
}

fn import_lines<R: BufRead>(
    store: &dyn LibraryStore,
    reader: R,
    fail_fast: bool,
) -> Result<ImportStats> {
    let mut stats = ImportStats::default();

    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line.with_context(|| format!("Failed to read line {}", line_no))?;
        if line.trim().is_empty() {
            continue;
        }

        let media: NewMedia = match serde_json::from_str(&line) {
            Ok(media) => media,
            Err(err) => {
                warn!("Line {}: not a media object: {}", line_no, err);
                stats.invalid += 1;
                if fail_fast {
                    anyhow::bail!("Line {}: {}", line_no, err);
                }
                continue;
            }
        };

        match store.add(media) {
            Ok(media_id) => {
                stats.added += 1;
                info!("Line {}: added media {}", line_no, media_id);
            }
            Err(err @ LibraryError::Validation(_)) => {
                warn!("Line {}: {}", line_no, err);
                stats.invalid += 1;
                if fail_fast {
                    return Err(err.into());
                }
            }
            Err(err) => {
                error!("Line {}: {}", line_no, err);
                stats.failed += 1;
                if fail_fast {
                    return Err(err.into());
                }
            }
        }
    }

    Ok(stats)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    info!("Library database: {}", args.database.display());
    let store = SqliteLibraryStore::new(&args.database)?;

    let stats = match &args.input {
        Some(path) => {
            info!("Reading media from {}", path.display());
            let file = File::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            import_lines(&store, BufReader::new(file), args.fail_fast)?
        }
        None => {
            info!("Reading media from stdin");
            import_lines(&store, std::io::stdin().lock(), args.fail_fast)?
        }
    };

    info!(
        "Done: {} added, {} invalid, {} failed",
        stats.added, stats.invalid, stats.failed
    );
    if stats.failed > 0 {
        anyhow::bail!("{} media could not be stored", stats.failed);
    }
    Ok(())
}
