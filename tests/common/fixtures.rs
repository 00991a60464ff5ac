//! Test fixture creation for the library database

use super::constants::*;
use anyhow::Result;
use jukebox_server::library::{LibraryStore, MediaId, NewMedia, SqliteLibraryStore};
use serde_json::json;
use std::path::PathBuf;
use tempfile::TempDir;

/// Ids of the fixture songs, in insertion order.
pub struct FixtureSongs {
    pub song_1: MediaId,
    pub song_2: MediaId,
    pub song_3: MediaId,
}

fn fixture_media(artist: &str, title: &str, provider_data: serde_json::Value) -> NewMedia {
    NewMedia {
        artist: Some(artist.to_string()),
        title: Some(title.to_string()),
        duration: Some(SONG_DURATION),
        provider: Some("file".to_string()),
        provider_data: Some(provider_data),
    }
}

/// Creates a temporary library database with 2 artists and 3 songs.
/// Returns (temp_dir, db_path, store, songs)
pub fn create_test_library() -> Result<(TempDir, PathBuf, SqliteLibraryStore, FixtureSongs)> {
    let dir = TempDir::new()?;
    let db_path = dir.path().join("library.db");
    let store = SqliteLibraryStore::new(&db_path)?;

    let songs = FixtureSongs {
        song_1: store.add(fixture_media(
            ARTIST_1_NAME,
            SONG_1_TITLE,
            json!({"path": SONG_1_PATH, "bitrate": 320}),
        ))?,
        song_2: store.add(fixture_media(ARTIST_1_NAME, SONG_2_TITLE, json!({})))?,
        song_3: store.add(fixture_media(ARTIST_2_NAME, SONG_3_TITLE, json!({})))?,
    };

    Ok((dir, db_path, store, songs))
}
