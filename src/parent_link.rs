//! Newline-delimited JSON channel to the supervising process.
//!
//! The parent writes one action per line on our stdin. We answer on stdout,
//! which is why logging goes to stderr.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, info, warn};

use crate::actions::{action_types, Action};
use crate::server::state::{GuardedConnectionManager, GuardedLibraryStore};
use crate::server::websocket::{events, ServerMessage};

pub async fn write_action<W: AsyncWrite + Unpin>(writer: &mut W, action: &Action) -> Result<()> {
    let mut line = serde_json::to_vec(action)?;
    line.push(b'\n');
    writer.write_all(&line).await?;
    writer.flush().await?;
    Ok(())
}

pub async fn send_to_parent(action: &Action) -> Result<()> {
    debug!("Sending {} to parent", action.action_type);
    write_action(&mut tokio::io::stdout(), action)
        .await
        .context("Failed to write to parent")
}

async fn broadcast_action(connection_manager: &GuardedConnectionManager, action: &Action) {
    let failed = connection_manager
        .broadcast_to_all(ServerMessage::new(events::ACTION, action))
        .await;
    if failed > 0 {
        debug!(
            "{} connection(s) missed {}",
            failed, action.action_type
        );
    }
}

async fn push_library(library: &GuardedLibraryStore, connection_manager: &GuardedConnectionManager) {
    let library = library.clone();
    match tokio::task::spawn_blocking(move || library.get_library()).await {
        Ok(Ok(snapshot)) => {
            info!(
                "Pushing library: {} artists, {} media",
                snapshot.artists.len(),
                snapshot.media.len()
            );
            broadcast_action(connection_manager, &Action::library_push(&snapshot)).await;
        }
        Ok(Err(err)) => error!("Could not load library for push: {}", err),
        Err(err) => error!("Library push task failed: {}", err),
    }
}

/// Relays every action read from `reader` to all WebSocket clients until
/// the parent closes the stream. A completed scan also pushes a fresh
/// library snapshot.
pub async fn relay_parent_messages<R: AsyncBufRead + Unpin>(
    reader: R,
    library: GuardedLibraryStore,
    connection_manager: GuardedConnectionManager,
) -> Result<()> {
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let action: Action = match serde_json::from_str(line) {
            Ok(action) => action,
            Err(err) => {
                warn!("Skipping malformed message from parent: {}", err);
                continue;
            }
        };

        debug!("Relaying {} from parent", action.action_type);
        broadcast_action(&connection_manager, &action).await;

        if action.is(action_types::SCANNER_WORKER_DONE) {
            push_library(&library, &connection_manager).await;
        }
    }

    info!("Parent link closed");
    Ok(())
}
