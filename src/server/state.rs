use axum::extract::FromRef;

use crate::library::LibraryStore;
use std::sync::Arc;
use std::time::Instant;

use super::session::SessionKeys;
use super::websocket::ConnectionManager;
use super::ServerConfig;

pub type GuardedLibraryStore = Arc<dyn LibraryStore>;
pub type GuardedConnectionManager = Arc<ConnectionManager>;
pub type GuardedSessionKeys = Arc<SessionKeys>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub library: GuardedLibraryStore,
    pub session_keys: GuardedSessionKeys,
    pub ws_connection_manager: GuardedConnectionManager,
}

impl ServerState {
    pub fn new(
        config: ServerConfig,
        library: GuardedLibraryStore,
        jwt_key: &str,
        ws_connection_manager: GuardedConnectionManager,
    ) -> ServerState {
        ServerState {
            config,
            start_time: Instant::now(),
            library,
            session_keys: Arc::new(SessionKeys::new(jwt_key)),
            ws_connection_manager,
        }
    }
}

impl FromRef<ServerState> for GuardedLibraryStore {
    fn from_ref(input: &ServerState) -> Self {
        input.library.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}

impl FromRef<ServerState> for GuardedConnectionManager {
    fn from_ref(input: &ServerState) -> Self {
        input.ws_connection_manager.clone()
    }
}
