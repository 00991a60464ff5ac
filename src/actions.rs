//! Tagged action objects exchanged with the parent process and relayed to
//! WebSocket clients.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub mod action_types {
    /// The scanner finished a pass; the library may have changed.
    pub const SCANNER_WORKER_DONE: &str = "SCANNER_WORKER_DONE";
    /// The server is listening. Payload carries its `url`.
    pub const SERVER_WORKER_STATUS: &str = "SERVER_WORKER_STATUS";
    /// The server failed to start.
    pub const SERVER_WORKER_ERROR: &str = "SERVER_WORKER_ERROR";
    /// A full library snapshot pushed to clients.
    pub const LIBRARY_PUSH: &str = "LIBRARY_PUSH";
}

/// An action: a `type` tag plus whatever other fields the sender attached.
///
/// Unknown fields are kept so that relayed actions reach clients unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub action_type: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Action {
    pub fn new(action_type: impl Into<String>) -> Self {
        Self {
            action_type: action_type.into(),
            fields: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        self.fields.insert(
            key.into(),
            serde_json::to_value(value).unwrap_or(Value::Null),
        );
        self
    }

    pub fn with_payload(self, payload: impl Serialize) -> Self {
        self.with_field("payload", payload)
    }

    pub fn is(&self, action_type: &str) -> bool {
        self.action_type == action_type
    }

    pub fn library_push(snapshot: &crate::library::LibrarySnapshot) -> Self {
        Action::new(action_types::LIBRARY_PUSH).with_payload(snapshot)
    }

    pub fn server_status(url: &str) -> Self {
        Action::new(action_types::SERVER_WORKER_STATUS)
            .with_payload(serde_json::json!({ "url": url }))
    }

    pub fn server_error(error: impl std::fmt::Display) -> Self {
        Action::new(action_types::SERVER_WORKER_ERROR).with_field("error", error.to_string())
    }
}
