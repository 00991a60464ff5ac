mod error;
mod filter;
mod models;
mod prefs;
mod schema;
mod store;
mod trait_def;

pub use error::LibraryError;
pub use filter::MediaFilter;
pub use models::*;
pub use prefs::SqlitePrefsStore;
pub use store::SqliteLibraryStore;
pub use trait_def::LibraryStore;
