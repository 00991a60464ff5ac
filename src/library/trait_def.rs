use super::error::LibraryError;
use super::filter::MediaFilter;
use super::models::{LibrarySnapshot, MediaEntity, MediaId, NewMedia, Normalized};

/// Read/write access to the media library.
pub trait LibraryStore: Send + Sync {
    /// Media rows matching all `filters`, each with its star count.
    /// No filters returns every media row.
    fn search(&self, filters: &[MediaFilter]) -> Result<Normalized<MediaEntity>, LibraryError>;

    /// All artists and the listed media of enabled providers, cross-linked.
    fn get_library(&self) -> Result<LibrarySnapshot, LibraryError>;

    /// Adds a media row, creating its artist when needed, and returns the new media id.
    fn add(&self, media: NewMedia) -> Result<MediaId, LibraryError>;
}
