//! HTTP and WebSocket clients for end-to-end tests
//!
//! When API routes change, update only this file.

use super::constants::*;
use futures::StreamExt;
use http::header;
use reqwest::Response;
use serde_json::Value;
use std::time::Duration;
use tokio::time::timeout;
use tokio_tungstenite::{
    connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream,
};

pub type TestWebSocket = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

pub struct TestClient {
    pub client: reqwest::Client,
    pub base_url: String,
    token: Option<String>,
}

impl TestClient {
    /// A client without a session token (guest).
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self {
            client,
            base_url,
            token: None,
        }
    }

    /// A client sending `token` in the session cookie.
    pub fn with_token(base_url: String, token: String) -> Self {
        Self {
            token: Some(token),
            ..Self::new(base_url)
        }
    }

    async fn get(&self, path: &str) -> Response {
        let mut request = self.client.get(format!("{}{}", self.base_url, path));
        if let Some(token) = &self.token {
            request = request.header(header::COOKIE, format!("{}={}", SESSION_COOKIE, token));
        }
        request.send().await.expect("Request failed")
    }

    pub async fn get_home(&self) -> Response {
        self.get("/").await
    }

    pub async fn get_song(&self, song_id: &str) -> Response {
        self.get(&format!("/api/song/{}", song_id)).await
    }

    pub async fn get_library(&self) -> Response {
        self.get("/api/library").await
    }

    pub async fn connect_ws(&self) -> TestWebSocket {
        let ws_url = self.base_url.replace("http://", "ws://") + "/api/ws";

        let mut builder = http::Request::builder()
            .uri(&ws_url)
            .header(header::HOST, "localhost")
            .header(header::CONNECTION, "Upgrade")
            .header(header::UPGRADE, "websocket")
            .header(header::SEC_WEBSOCKET_VERSION, "13")
            .header(header::SEC_WEBSOCKET_KEY, "dGhlIHNhbXBsZSBub25jZQ==");
        if let Some(token) = &self.token {
            builder = builder.header(header::COOKIE, format!("{}={}", SESSION_COOKIE, token));
        }
        let request = builder
            .body(())
            .expect("Failed to build WebSocket request");

        let (ws_stream, _) = connect_async(request)
            .await
            .expect("Failed to connect to WebSocket");
        ws_stream
    }
}

/// Next JSON text frame, or `None` on timeout or close.
pub async fn next_ws_json(ws: &mut TestWebSocket) -> Option<Value> {
    let result = timeout(Duration::from_millis(WS_MESSAGE_TIMEOUT_MS), async {
        while let Some(Ok(msg)) = ws.next().await {
            if let Message::Text(text) = msg {
                if let Ok(json) = serde_json::from_str::<Value>(text.as_str()) {
                    return Some(json);
                }
            }
        }
        None
    })
    .await;

    result.ok().flatten()
}

/// Skips frames until one with the given `event` arrives.
pub async fn wait_for_event(ws: &mut TestWebSocket, event: &str) -> Option<Value> {
    while let Some(json) = next_ws_json(ws).await {
        if json.get("event").and_then(|e| e.as_str()) == Some(event) {
            return Some(json);
        }
    }
    None
}
