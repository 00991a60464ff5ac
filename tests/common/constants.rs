//! Shared constants for end-to-end tests
//!
//! When fixture data changes, update only this file.

// ============================================================================
// Fixture Library
// ============================================================================

/// Artist with two songs
pub const ARTIST_1_NAME: &str = "The Test Band";

/// Artist with one song
pub const ARTIST_2_NAME: &str = "Jazz Ensemble";

pub const SONG_1_TITLE: &str = "Opening Track";
pub const SONG_2_TITLE: &str = "Closing Track";
pub const SONG_3_TITLE: &str = "Smooth Jazz";

/// Duration submitted for every fixture song, before rounding
pub const SONG_DURATION: f64 = 184.6;

/// File path stored in the first song's provider data
pub const SONG_1_PATH: &str = "/music/test-band/opening.mp3";

// ============================================================================
// Sessions
// ============================================================================

pub const TEST_USER_ID: i64 = 1;
pub const TEST_USERNAME: &str = "testuser";
pub const TEST_ROOM_ID: i64 = 3;

pub const SESSION_COOKIE: &str = "kfToken";

// ============================================================================
// Timeouts
// ============================================================================

pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 20;
pub const REQUEST_TIMEOUT_SECS: u64 = 5;
pub const WS_MESSAGE_TIMEOUT_MS: u64 = 2000;
