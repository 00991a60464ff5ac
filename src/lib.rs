//! Jukebox Server Library
//!
//! This library exposes the internal modules for the binaries and tests.

pub mod actions;
pub mod config;
pub mod library;
pub mod parent_link;
pub mod server;
pub mod sqlite_persistence;

pub use library::{LibraryStore, SqliteLibraryStore};
pub use server::{run_server, RequestsLoggingLevel};
