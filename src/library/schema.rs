//! SQLite schema definitions for the library database.
//!
//! Column names keep the camelCase spelling used by the JSON API, so rows can
//! be serialized without renaming.

use crate::sqlite_column;
use crate::sqlite_persistence::{ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema};

/// Artists, matched by exact name when media is added.
pub const ARTISTS_TABLE: Table = Table {
    name: "artists",
    columns: &[
        sqlite_column!("artistId", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
    ],
    indices: &[],
    unique_constraints: &[&["name"]],
};

/// Media sources. Only enabled providers show up in the library listing.
pub const PROVIDERS_TABLE: Table = Table {
    name: "providers",
    columns: &[
        sqlite_column!(
            "name",
            &SqlType::Text,
            is_primary_key = true,
            non_null = true
        ),
        sqlite_column!(
            "isEnabled",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("1")
        ),
        sqlite_column!(
            "priority",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "prefs",
            &SqlType::Text,
            non_null = true,
            default_value = Some("'{}'")
        ),
    ],
    indices: &[],
    unique_constraints: &[],
};

pub const MEDIA_TABLE: Table = Table {
    name: "media",
    columns: &[
        sqlite_column!("mediaId", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "artistId",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "artists",
                foreign_column: "artistId",
                on_delete: ForeignKeyOnChange::Restrict,
            })
        ),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("duration", &SqlType::Integer, non_null = true), // seconds
        sqlite_column!("provider", &SqlType::Text, non_null = true),
        sqlite_column!(
            "providerData",
            &SqlType::Text,
            non_null = true,
            default_value = Some("'{}'")
        ), // serialized JSON object
    ],
    indices: &[
        ("idx_media_artistId", "artistId"),
        ("idx_media_provider", "provider"),
    ],
    unique_constraints: &[],
};

/// User favorites.
pub const STARS_TABLE: Table = Table {
    name: "stars",
    columns: &[
        sqlite_column!("userId", &SqlType::Integer, non_null = true),
        sqlite_column!(
            "mediaId",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "media",
                foreign_column: "mediaId",
                on_delete: ForeignKeyOnChange::Cascade,
            })
        ),
    ],
    indices: &[("idx_stars_mediaId", "mediaId")],
    unique_constraints: &[&["userId", "mediaId"]],
};

/// Server-wide key/value preferences.
pub const PREFS_TABLE: Table = Table {
    name: "prefs",
    columns: &[
        sqlite_column!(
            "key",
            &SqlType::Text,
            is_primary_key = true,
            non_null = true
        ),
        sqlite_column!("data", &SqlType::Text, non_null = true),
    ],
    indices: &[],
    unique_constraints: &[],
};

/// Providers inserted when a library database is created: (name, priority).
pub const DEFAULT_PROVIDERS: &[(&str, i64)] = &[("file", 0)];

pub const LIBRARY_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[
        ARTISTS_TABLE,
        PROVIDERS_TABLE,
        MEDIA_TABLE,
        STARS_TABLE,
        PREFS_TABLE,
    ],
    migration: None,
}];
