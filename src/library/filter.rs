//! Typed search filters for media rows.
//!
//! Callers pick from a fixed set of fields; column names never come from
//! user input.

use super::error::LibraryError;
use rusqlite::types::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum MediaFilter {
    MediaId(i64),
    ArtistId(i64),
    Title(String),
    Provider(String),
    /// Equality on a key of the provider's JSON metadata. Dots address
    /// nested objects (`"tags.genre"`).
    Meta {
        key: String,
        value: serde_json::Value,
    },
}

/// A SQL predicate with its bound parameters.
#[derive(Debug, PartialEq)]
pub struct Predicate {
    pub sql: &'static str,
    pub params: Vec<Value>,
}

fn is_valid_meta_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('.')
        && !key.ends_with('.')
        && !key.contains("..")
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

fn json_to_sql_value(value: &serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Integer(*b as i64),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => Value::Real(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(s) => Value::Text(s.clone()),
        // json_extract returns nested values as JSON text
        other => Value::Text(other.to_string()),
    }
}

impl MediaFilter {
    pub fn to_predicate(&self) -> Result<Predicate, LibraryError> {
        let predicate = match self {
            MediaFilter::MediaId(id) => Predicate {
                sql: "media.mediaId = ?",
                params: vec![Value::Integer(*id)],
            },
            MediaFilter::ArtistId(id) => Predicate {
                sql: "media.artistId = ?",
                params: vec![Value::Integer(*id)],
            },
            MediaFilter::Title(title) => Predicate {
                sql: "media.title = ?",
                params: vec![Value::Text(title.clone())],
            },
            MediaFilter::Provider(provider) => Predicate {
                sql: "media.provider = ?",
                params: vec![Value::Text(provider.clone())],
            },
            MediaFilter::Meta { key, value } => {
                if !is_valid_meta_key(key) {
                    return Err(LibraryError::InvalidFilter(format!(
                        "meta key {:?} is not a valid path",
                        key
                    )));
                }
                Predicate {
                    sql: "json_extract(media.providerData, ?) = ?",
                    params: vec![Value::Text(format!("$.{}", key)), json_to_sql_value(value)],
                }
            }
        };
        Ok(predicate)
    }
}

/// Joins the filters into a `WHERE` clause (empty when there are no filters).
pub fn where_clause(filters: &[MediaFilter]) -> Result<(String, Vec<Value>), LibraryError> {
    if filters.is_empty() {
        return Ok((String::new(), Vec::new()));
    }

    let mut clauses = Vec::with_capacity(filters.len());
    let mut params = Vec::new();
    for filter in filters {
        let predicate = filter.to_predicate()?;
        clauses.push(predicate.sql);
        params.extend(predicate.params);
    }
    Ok((format!(" WHERE {}", clauses.join(" AND ")), params))
}
