//! Test server lifecycle management
//!
//! Each test gets an isolated server with its own library database and a
//! fake parent process link.

use super::constants::*;
use super::fixtures::{create_test_library, FixtureSongs};
use jukebox_server::library::LibraryStore;
use jukebox_server::parent_link::relay_parent_messages;
use jukebox_server::server::state::{GuardedLibraryStore, ServerState};
use jukebox_server::server::websocket::ConnectionManager;
use jukebox_server::server::{make_app, Claims, RequestsLoggingLevel, ServerConfig, SessionKeys};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::{AsyncWriteExt, BufReader, DuplexStream};
use tokio::net::TcpListener;

/// Test server instance with an isolated library
///
/// When dropped, the server gracefully shuts down and temp resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    pub port: u16,

    /// Library store for direct database access in tests
    pub library: GuardedLibraryStore,

    pub songs: FixtureSongs,

    session_keys: SessionKeys,
    parent_tx: DuplexStream,

    // Private fields - keep resources alive until drop
    _temp_db_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new test server on a random port
    ///
    /// # Panics
    ///
    /// Panics if the fixture library cannot be created or the server does
    /// not become ready within the timeout.
    pub async fn spawn() -> Self {
        let (temp_db_dir, _db_path, store, songs) =
            create_test_library().expect("Failed to create test library");
        let jwt_key = store
            .prefs()
            .jwt_key()
            .expect("Failed to create signing key");
        let library: GuardedLibraryStore = Arc::new(store);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            requests_logging_level: RequestsLoggingLevel::None,
            host: "127.0.0.1".to_string(),
            port,
            ..Default::default()
        };
        let connection_manager = Arc::new(ConnectionManager::new());
        let state = ServerState::new(
            config,
            library.clone(),
            &jwt_key,
            connection_manager.clone(),
        );
        let app = make_app(state);

        // Stands in for the parent process writing to our stdin
        let (parent_tx, parent_rx) = tokio::io::duplex(64 * 1024);
        let relay_library = library.clone();
        tokio::spawn(async move {
            relay_parent_messages(BufReader::new(parent_rx), relay_library, connection_manager)
                .await
                .expect("Parent relay failed");
        });

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            library,
            songs,
            session_keys: SessionKeys::new(&jwt_key),
            parent_tx,
            _temp_db_dir: temp_db_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// A token for the fixture user, signed with the server's key.
    pub fn user_token(&self) -> String {
        self.sign(&Claims {
            user_id: Some(TEST_USER_ID),
            username: Some(TEST_USERNAME.to_string()),
            name: Some("Test User".to_string()),
            is_admin: false,
            room_id: Some(TEST_ROOM_ID),
            exp: None,
        })
    }

    pub fn sign(&self, claims: &Claims) -> String {
        self.session_keys
            .sign(claims)
            .expect("Failed to sign test token")
    }

    /// Writes one line to the server as if it came from the parent process.
    pub async fn send_from_parent(&mut self, line: &str) {
        self.parent_tx
            .write_all(format!("{}\n", line).as_bytes())
            .await
            .expect("Failed to write to parent link");
        self.parent_tx.flush().await.expect("Failed to flush parent link");
    }

    pub fn media_count(&self) -> usize {
        self.library.search(&[]).expect("search failed").len()
    }

    /// Waits for the server to become ready by polling the home endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
