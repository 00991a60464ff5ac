//! Data models returned by the library query layer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type ArtistId = i64;
pub type MediaId = i64;

/// An ordered list of ids paired with the entities they point to.
///
/// Clients keep `result` for ordering and look rows up in `entities`,
/// so the same entity is never embedded twice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Normalized<T> {
    pub result: Vec<i64>,
    pub entities: BTreeMap<i64, T>,
}

impl<T> Default for Normalized<T> {
    fn default() -> Self {
        Self {
            result: Vec::new(),
            entities: BTreeMap::new(),
        }
    }
}

impl<T> Normalized<T> {
    /// Appends an entity. A repeated id keeps its first position and the
    /// entity is replaced.
    pub fn push(&mut self, id: i64, entity: T) {
        if self.entities.insert(id, entity).is_none() {
            self.result.push(id);
        }
    }

    pub fn len(&self) -> usize {
        self.result.len()
    }

    pub fn is_empty(&self) -> bool {
        self.result.is_empty()
    }

    /// Entities in `result` order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.result.iter().filter_map(|id| self.entities.get(id))
    }
}

/// A media row as returned by search, with its favorite count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaEntity {
    pub media_id: MediaId,
    pub artist_id: ArtistId,
    pub title: String,
    pub duration: i64,
    pub provider: String,
    /// Raw JSON text as stored.
    pub provider_data: String,
    pub stars: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistEntity {
    pub artist_id: ArtistId,
    pub name: String,
    /// Ids of this artist's media in library order.
    pub media_ids: Vec<MediaId>,
}

/// One listed song: the preferred media row of an (artist, title) group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryMediaEntity {
    pub media_id: MediaId,
    pub title: String,
    pub duration: i64,
    pub artist_id: ArtistId,
    pub artist: String,
    pub num_media: i64,
    pub num_stars: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LibrarySnapshot {
    pub artists: Normalized<ArtistEntity>,
    pub media: Normalized<LibraryMediaEntity>,
}

/// A media submission, typically produced by the scanner.
///
/// Every field is optional so that incomplete submissions can be reported
/// back as-is when validation fails.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMedia {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_data: Option<serde_json::Value>,
}
