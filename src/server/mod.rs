pub mod config;
pub mod error;
mod http_layers;
pub mod server;
pub mod session;
pub mod state;
mod static_files;
pub mod websocket;

pub use config::{Env, ServerConfig};
pub use error::ApiError;
pub use http_layers::*;
pub use server::{make_app, run_server};
pub use session::{Claims, Identity, SessionKeys};
