use anyhow::{anyhow, Context, Result};
use std::net::{IpAddr, Ipv4Addr, UdpSocket};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWrite;
use tokio::net::TcpListener;

use tracing::{error, info};

use axum::{
    extract::{Path, State},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::{Map, Value};

use super::error::ApiError;
use super::session::Identity;
use super::static_files::static_router;
use super::websocket::{ws_handler, ConnectionManager};
use super::{log_requests, state::*, ServerConfig};
use crate::actions::Action;
use crate::library::{MediaEntity, MediaFilter, Normalized};
use crate::parent_link;

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub version: String,
    pub connections: usize,
    pub users: usize,
    pub user: Identity,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(identity: Identity, State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        version: env!("CARGO_PKG_VERSION").to_string(),
        connections: state.ws_connection_manager.total_connections().await,
        users: state.ws_connection_manager.connected_user_count().await,
        user: identity,
    };
    Json(stats)
}

/// Turns a search result into the song object clients expect: the media
/// row with its provider metadata merged in at the top level.
fn song_response(media: Normalized<MediaEntity>) -> Result<Map<String, Value>, ApiError> {
    if media.len() != 1 {
        return Err(ApiError::NotFound);
    }
    let Some(entity) = media.iter().next() else {
        return Err(ApiError::NotFound);
    };

    let provider_data: Value = serde_json::from_str(&entity.provider_data)
        .with_context(|| format!("Bad providerData for media {}", entity.media_id))?;
    let Value::Object(mut song) = serde_json::to_value(entity)? else {
        return Err(anyhow!("Media {} did not serialize to an object", entity.media_id).into());
    };
    if let Value::Object(provider_data) = provider_data {
        song.extend(provider_data);
    }
    song.remove("providerData");
    Ok(song)
}

async fn get_song(
    State(library): State<GuardedLibraryStore>,
    Path(song_id): Path<String>,
) -> Result<Response, ApiError> {
    let Ok(media_id) = song_id.parse::<i64>() else {
        return Err(ApiError::NotFound);
    };
    let media =
        tokio::task::spawn_blocking(move || library.search(&[MediaFilter::MediaId(media_id)]))
            .await??;
    Ok(Json(song_response(media)?).into_response())
}

async fn get_library(State(library): State<GuardedLibraryStore>) -> Result<Response, ApiError> {
    let snapshot = tokio::task::spawn_blocking(move || library.get_library()).await??;
    Ok(Json(snapshot).into_response())
}

pub fn make_app(state: ServerState) -> Router {
    let api_routes: Router = Router::new()
        .route("/song/{songId}", get(get_song))
        .route("/library", get(get_library))
        .route("/ws", get(ws_handler))
        .with_state(state.clone());

    let home_router: Router = match static_router(&state.config) {
        Some(static_files) => static_files,
        None => Router::new()
            .route("/", get(home))
            .with_state(state.clone()),
    };

    home_router
        .nest("/api", api_routes)
        .layer(middleware::from_fn_with_state(state, log_requests))
}

/// Best guess at an address other machines on the LAN can reach us on.
fn local_ip() -> IpAddr {
    UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))
        .and_then(|socket| {
            socket.connect((Ipv4Addr::new(8, 8, 8, 8), 80))?;
            socket.local_addr()
        })
        .map(|addr| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

fn public_url(host: &str, port: u16) -> String {
    let host = match host.parse::<IpAddr>() {
        Ok(ip) if ip.is_unspecified() => local_ip().to_string(),
        _ => host.to_string(),
    };
    format!("http://{}:{}", host, port)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

/// Binds the HTTP listener. A failure is reported to the parent, when there
/// is one, before being returned.
async fn bind_listener<W: AsyncWrite + Unpin>(
    address: &str,
    parent: Option<&mut W>,
) -> Result<TcpListener> {
    match TcpListener::bind(address).await {
        Ok(listener) => Ok(listener),
        Err(err) => {
            error!("Could not listen on {}: {}", address, err);
            if let Some(parent) = parent {
                if let Err(write_err) =
                    parent_link::write_action(parent, &Action::server_error(&err)).await
                {
                    error!("Could not report startup failure to parent: {:#}", write_err);
                }
            }
            Err(err).with_context(|| format!("Could not listen on {}", address))
        }
    }
}

pub async fn run_server(
    config: ServerConfig,
    library: GuardedLibraryStore,
    jwt_key: &str,
    parent_ipc: bool,
) -> Result<()> {
    let connection_manager = Arc::new(ConnectionManager::new());
    let state = ServerState::new(
        config.clone(),
        library.clone(),
        jwt_key,
        connection_manager.clone(),
    );
    let app = make_app(state);

    let address = format!("{}:{}", config.host, config.port);
    let mut stdout = tokio::io::stdout();
    let listener = bind_listener(&address, parent_ipc.then_some(&mut stdout)).await?;

    let port = listener.local_addr()?.port();
    let url = public_url(&config.host, port);
    info!("Ready to serve at {}", url);

    if parent_ipc {
        parent_link::send_to_parent(&Action::server_status(&url)).await?;
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        tokio::spawn(async move {
            if let Err(err) =
                parent_link::relay_parent_messages(stdin, library, connection_manager).await
            {
                error!("Parent link failed: {:#}", err);
            }
        });
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
