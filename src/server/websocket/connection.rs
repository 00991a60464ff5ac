//! WebSocket connection manager.
//!
//! Tracks every open socket by a per-connection id, tagged with the user id
//! of the session that opened it (`None` for guests).

use std::collections::HashMap;

use tokio::sync::{mpsc, RwLock};
use tracing::debug;
use uuid::Uuid;

use super::messages::ServerMessage;

const OUTGOING_CHANNEL_CAPACITY: usize = 32;

struct ConnectionEntry {
    sender: mpsc::Sender<ServerMessage>,
    user_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SendError {
    NotConnected,
    Disconnected,
    Full,
}

impl<T> From<mpsc::error::TrySendError<T>> for SendError {
    fn from(err: mpsc::error::TrySendError<T>) -> Self {
        match err {
            mpsc::error::TrySendError::Full(_) => SendError::Full,
            mpsc::error::TrySendError::Closed(_) => SendError::Disconnected,
        }
    }
}

pub struct ConnectionManager {
    connections: RwLock<HashMap<Uuid, ConnectionEntry>>,
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a new connection and returns its id together with the
    /// receiver the socket writer should drain.
    pub async fn register(&self, user_id: Option<i64>) -> (Uuid, mpsc::Receiver<ServerMessage>) {
        let (tx, rx) = mpsc::channel(OUTGOING_CHANNEL_CAPACITY);
        let connection_id = Uuid::new_v4();

        let mut conns = self.connections.write().await;
        conns.insert(
            connection_id,
            ConnectionEntry {
                sender: tx,
                user_id,
            },
        );

        (connection_id, rx)
    }

    pub async fn unregister(&self, connection_id: Uuid) {
        self.connections.write().await.remove(&connection_id);
    }

    /// Queues a message for one connection without waiting. A socket whose
    /// queue is full gets `SendError::Full` and the message is dropped.
    pub async fn send_to_connection(
        &self,
        connection_id: Uuid,
        message: ServerMessage,
    ) -> Result<(), SendError> {
        let conns = self.connections.read().await;
        match conns.get(&connection_id) {
            Some(entry) => entry.sender.try_send(message).map_err(SendError::from),
            None => Err(SendError::NotConnected),
        }
    }

    /// Sends to every open connection. Returns the number of failed sends,
    /// which includes connections whose queue is full.
    pub async fn broadcast_to_all(&self, message: ServerMessage) -> usize {
        let conns = self.connections.read().await;
        let mut failed_count = 0;

        for (connection_id, entry) in conns.iter() {
            if let Err(err) = entry.sender.try_send(message.clone()) {
                debug!(
                    "Dropped {} for connection {}: {:?}",
                    message.event,
                    connection_id,
                    SendError::from(err)
                );
                failed_count += 1;
            }
        }

        failed_count
    }

    pub async fn total_connections(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Number of distinct signed-in users with at least one open socket.
    pub async fn connected_user_count(&self) -> usize {
        let conns = self.connections.read().await;
        let mut users: Vec<i64> = conns.values().filter_map(|e| e.user_id).collect();
        users.sort_unstable();
        users.dedup();
        users.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_to_connection_delivers_message() {
        let manager = ConnectionManager::new();
        let (id, mut rx) = manager.register(Some(1)).await;

        let msg = ServerMessage::new("greeting", serde_json::json!({"text": "hello"}));
        manager.send_to_connection(id, msg).await.unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received.event, "greeting");
        assert_eq!(received.payload["text"], "hello");
    }

    #[tokio::test]
    async fn send_to_unknown_connection_fails() {
        let manager = ConnectionManager::new();

        let result = manager
            .send_to_connection(Uuid::new_v4(), ServerMessage::empty("test"))
            .await;

        assert_eq!(result, Err(SendError::NotConnected));
    }

    #[tokio::test]
    async fn unregister_removes_connection() {
        let manager = ConnectionManager::new();
        let (id, _rx) = manager.register(None).await;
        assert_eq!(manager.total_connections().await, 1);

        manager.unregister(id).await;

        assert_eq!(manager.total_connections().await, 0);
        assert_eq!(
            manager
                .send_to_connection(id, ServerMessage::empty("test"))
                .await,
            Err(SendError::NotConnected)
        );
    }

    #[tokio::test]
    async fn broadcast_reaches_everyone_and_counts_failures() {
        let manager = ConnectionManager::new();
        let (_, mut rx1) = manager.register(Some(1)).await;
        let (_, mut rx2) = manager.register(None).await;
        let (_, rx3) = manager.register(Some(2)).await;
        drop(rx3);

        let failed = manager.broadcast_to_all(ServerMessage::empty("news")).await;

        assert_eq!(failed, 1);
        assert_eq!(rx1.recv().await.unwrap().event, "news");
        assert_eq!(rx2.recv().await.unwrap().event, "news");
    }

    #[tokio::test]
    async fn connected_users_ignores_guests_and_duplicates() {
        let manager = ConnectionManager::new();
        let _a = manager.register(Some(1)).await;
        let _b = manager.register(Some(1)).await;
        let _c = manager.register(Some(2)).await;
        let _d = manager.register(None).await;

        assert_eq!(manager.total_connections().await, 4);
        assert_eq!(manager.connected_user_count().await, 2);
    }

    #[tokio::test]
    async fn stalled_reader_does_not_block_others() {
        let manager = ConnectionManager::new();
        let (stalled_id, _stalled_rx) = manager.register(Some(1)).await;
        let (_, mut rx) = manager.register(Some(2)).await;

        for _ in 0..OUTGOING_CHANNEL_CAPACITY {
            assert_eq!(manager.broadcast_to_all(ServerMessage::empty("tick")).await, 0);
            assert_eq!(rx.recv().await.unwrap().event, "tick");
        }

        let failed = tokio::time::timeout(
            std::time::Duration::from_millis(500),
            manager.broadcast_to_all(ServerMessage::empty("tick")),
        )
        .await
        .expect("broadcast should not wait on a full queue");
        assert_eq!(failed, 1);
        assert_eq!(rx.recv().await.unwrap().event, "tick");

        assert_eq!(
            manager
                .send_to_connection(stalled_id, ServerMessage::empty("tick"))
                .await,
            Err(SendError::Full)
        );

        let registered = tokio::time::timeout(
            std::time::Duration::from_millis(500),
            manager.register(Some(9)),
        )
        .await;
        assert!(registered.is_ok());
        assert_eq!(manager.total_connections().await, 3);
    }
}
