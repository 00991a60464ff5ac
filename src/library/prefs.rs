//! Preferences stored next to the library. The server only needs the
//! token signing key.

use super::error::LibraryError;
use rand::Rng;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};
use tracing::info;

const JWT_KEY_PREF: &str = "jwtKey";
const JWT_KEY_LEN: usize = 64;

#[derive(Clone)]
pub struct SqlitePrefsStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqlitePrefsStore {
    pub(super) fn new(conn: Arc<Mutex<Connection>>) -> Self {
        SqlitePrefsStore { conn }
    }

    /// The key used to sign session tokens, created on first use.
    pub fn jwt_key(&self) -> Result<String, LibraryError> {
        let conn = self.conn.lock().unwrap();
        let candidate: String = rand::rng()
            .sample_iter(&rand::distr::Alphanumeric)
            .take(JWT_KEY_LEN)
            .map(char::from)
            .collect();
        let created = conn.execute(
            "INSERT INTO prefs (key, data) VALUES (?1, ?2) ON CONFLICT(key) DO NOTHING",
            params![JWT_KEY_PREF, candidate],
        )?;
        if created > 0 {
            info!("Generated a new token signing key");
        }
        let key = conn.query_row(
            "SELECT data FROM prefs WHERE key = ?1",
            params![JWT_KEY_PREF],
            |r| r.get(0),
        )?;
        Ok(key)
    }
}
