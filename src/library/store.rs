//! SQLite-backed library store.

use super::error::LibraryError;
use super::filter::{where_clause, MediaFilter};
use super::models::*;
use super::prefs::SqlitePrefsStore;
use super::schema::{DEFAULT_PROVIDERS, LIBRARY_VERSIONED_SCHEMAS};
use super::trait_def::LibraryStore;
use crate::sqlite_persistence::{migrate_to_latest, SchemaUpgrade};
use anyhow::{Context, Result};
use rusqlite::{params, params_from_iter, Connection, TransactionBehavior};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

const SEARCH_MEDIA_SQL: &str = "SELECT media.mediaId, media.artistId, media.title, media.duration,
        media.provider, media.providerData, COUNT(stars.userId) AS stars
    FROM media
    LEFT JOIN stars ON stars.mediaId = media.mediaId";

const LIST_ARTISTS_SQL: &str = "SELECT artistId, name FROM artists ORDER BY name";

// One row per (artist, title): the media of the lowest-priority-value enabled
// provider, lowest mediaId on ties. Counts cover the whole group.
const LIST_MEDIA_SQL: &str = "WITH enabled AS (
        SELECT media.mediaId, media.artistId, media.title, media.duration, providers.priority
        FROM media
        JOIN providers ON providers.name = media.provider
        WHERE providers.isEnabled = 1
    ),
    grouped AS (
        SELECT enabled.artistId, enabled.title,
            COUNT(DISTINCT enabled.mediaId) AS numMedia,
            COUNT(stars.userId) AS numStars
        FROM enabled
        LEFT JOIN stars ON stars.mediaId = enabled.mediaId
        GROUP BY enabled.artistId, enabled.title
    ),
    preferred AS (
        SELECT mediaId, artistId, title, duration,
            ROW_NUMBER() OVER (
                PARTITION BY artistId, title ORDER BY priority, mediaId
            ) AS groupRank
        FROM enabled
    )
    SELECT preferred.mediaId, preferred.title, preferred.duration, preferred.artistId,
        artists.name AS artist, grouped.numMedia, grouped.numStars
    FROM preferred
    JOIN grouped ON grouped.artistId = preferred.artistId AND grouped.title = preferred.title
    JOIN artists ON artists.artistId = preferred.artistId
    WHERE preferred.groupRank = 1
    ORDER BY artists.name, preferred.title";

/// A submission that passed validation, ready to be stored.
#[derive(Debug, PartialEq)]
struct ValidMedia {
    artist: String,
    title: String,
    duration: i64,
    provider: String,
    provider_data: String,
}

fn validate(media: NewMedia) -> Result<ValidMedia, LibraryError> {
    let is_present = |s: &Option<String>| s.as_deref().is_some_and(|s| !s.is_empty());
    let has_duration = media.duration.is_some_and(|d| {
        d.is_finite() && d != 0.0 && (i64::MIN as f64..i64::MAX as f64).contains(&d.round())
    });

    if !(is_present(&media.artist)
        && is_present(&media.title)
        && is_present(&media.provider)
        && has_duration)
    {
        return Err(LibraryError::Validation(format!(
            "Invalid media data: {}",
            serde_json::to_string(&media)?
        )));
    }

    let provider_data = match media.provider_data {
        None | Some(serde_json::Value::Null) => "{}".to_string(),
        Some(value) => serde_json::to_string(&value)?,
    };

    Ok(ValidMedia {
        artist: media.artist.unwrap_or_default(),
        title: media.title.unwrap_or_default(),
        duration: media.duration.unwrap_or_default().round() as i64,
        provider: media.provider.unwrap_or_default(),
        provider_data,
    })
}

fn checked_rowid(rowid: i64, what: &'static str) -> Result<i64, LibraryError> {
    if rowid > 0 {
        Ok(rowid)
    } else {
        Err(LibraryError::InvalidGeneratedId(what))
    }
}

#[derive(Clone)]
pub struct SqliteLibraryStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteLibraryStore {
    /// Opens (or creates) the library database at `db_path` and brings its
    /// schema up to date.
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref();
        let mut conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open library database {:?}", db_path))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::prepare_schema(&mut conn)?;
        Ok(SqliteLibraryStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn prepare_schema(conn: &mut Connection) -> Result<()> {
        let upgrade = migrate_to_latest(conn, LIBRARY_VERSIONED_SCHEMAS)?;
        if upgrade == SchemaUpgrade::Created {
            for (name, priority) in DEFAULT_PROVIDERS {
                conn.execute(
                    "INSERT INTO providers (name, priority) VALUES (?1, ?2)",
                    params![name, priority],
                )?;
            }
        }

        let artist_count: i64 = conn.query_row("SELECT COUNT(*) FROM artists", [], |r| r.get(0))?;
        let media_count: i64 = conn.query_row("SELECT COUNT(*) FROM media", [], |r| r.get(0))?;
        info!(
            "Opened library: {} artists, {} media",
            artist_count, media_count
        );
        Ok(())
    }

    /// Preferences stored in the same database.
    pub fn prefs(&self) -> SqlitePrefsStore {
        SqlitePrefsStore::new(self.conn.clone())
    }
}

impl LibraryStore for SqliteLibraryStore {
    fn search(&self, filters: &[MediaFilter]) -> Result<Normalized<MediaEntity>, LibraryError> {
        let (where_sql, values) = where_clause(filters)?;
        let sql = format!(
            "{}{} GROUP BY media.mediaId ORDER BY media.mediaId",
            SEARCH_MEDIA_SQL, where_sql
        );

        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), |row| {
            Ok(MediaEntity {
                media_id: row.get("mediaId")?,
                artist_id: row.get("artistId")?,
                title: row.get("title")?,
                duration: row.get("duration")?,
                provider: row.get("provider")?,
                provider_data: row.get("providerData")?,
                stars: row.get("stars")?,
            })
        })?;

        let mut media = Normalized::default();
        for row in rows {
            let row = row?;
            media.push(row.media_id, row);
        }
        debug!(
            "search matched {} result{}",
            media.len(),
            if media.len() == 1 { "" } else { "s" }
        );
        Ok(media)
    }

    fn get_library(&self) -> Result<LibrarySnapshot, LibraryError> {
        let conn = self.conn.lock().unwrap();
        let mut artists = Normalized::default();
        let mut media = Normalized::default();

        let mut stmt = conn.prepare(LIST_ARTISTS_SQL)?;
        let rows = stmt.query_map([], |row| {
            Ok(ArtistEntity {
                artist_id: row.get("artistId")?,
                name: row.get("name")?,
                media_ids: Vec::new(),
            })
        })?;
        for row in rows {
            let row = row?;
            artists.push(row.artist_id, row);
        }

        let mut stmt = conn.prepare(LIST_MEDIA_SQL)?;
        let rows = stmt.query_map([], |row| {
            Ok(LibraryMediaEntity {
                media_id: row.get("mediaId")?,
                title: row.get("title")?,
                duration: row.get("duration")?,
                artist_id: row.get("artistId")?,
                artist: row.get("artist")?,
                num_media: row.get("numMedia")?,
                num_stars: row.get("numStars")?,
            })
        })?;
        for row in rows {
            let row = row?;
            match artists.entities.get_mut(&row.artist_id) {
                Some(artist) => artist.media_ids.push(row.media_id),
                None => warn!(
                    "Media {} references unknown artist {}",
                    row.media_id, row.artist_id
                ),
            }
            media.push(row.media_id, row);
        }

        Ok(LibrarySnapshot { artists, media })
    }

    fn add(&self, media: NewMedia) -> Result<MediaId, LibraryError> {
        let media = validate(media)?;

        let mut conn = self.conn.lock().unwrap();
        // IMMEDIATE takes the write lock up front, so two adds for the same
        // new artist cannot both miss it.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let inserted = tx.execute(
            "INSERT INTO artists (name) VALUES (?1) ON CONFLICT(name) DO NOTHING",
            params![media.artist],
        )?;
        let artist_id = if inserted > 0 {
            debug!("new artist: {}", media.artist);
            checked_rowid(tx.last_insert_rowid(), "artist")?
        } else {
            debug!("matched artist: {}", media.artist);
            tx.query_row(
                "SELECT artistId FROM artists WHERE name = ?1",
                params![media.artist],
                |r| r.get(0),
            )?
        };

        tx.execute(
            "INSERT INTO media (artistId, title, duration, provider, providerData)
                VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                artist_id,
                media.title,
                media.duration,
                media.provider,
                media.provider_data
            ],
        )?;
        let media_id = checked_rowid(tx.last_insert_rowid(), "media")?;
        tx.commit()?;

        Ok(media_id)
    }
}
