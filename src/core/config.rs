//! Typed moderation configuration.
//!
//! Settings live in `bot_settings` as untyped strings; the engine validates
//! them once per invocation through this struct instead of re-parsing values
//! at each use site. `init`/`settings seed` write the documented defaults, so
//! a missing key normally means the store was tampered with.

use crate::core::error;
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};

pub const MUTE_DURATION_KEY: &str = "mute_duration_minutes";
pub const DEFAULT_MUTE_DURATION_MINUTES: i64 = 10;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ModerationConfig {
    pub mute_duration_minutes: i64,
}

impl ModerationConfig {
    /// Load and validate configuration from an open connection.
    ///
    /// Absent or non-numeric `mute_duration_minutes` is fatal to the
    /// invocation: the engine must not guess a mute length. Zero is
    /// accepted and yields a mute whose `mute_until` equals the write
    /// timestamp, i.e. already expired for `muted_count`.
    pub fn load(conn: &Connection) -> Result<Self, error::WardenError> {
        let raw: Option<String> = conn
            .query_row(
                "SELECT setting_value FROM bot_settings WHERE setting_key = ?1",
                params![MUTE_DURATION_KEY],
                |row| row.get(0),
            )
            .optional()?;

        let raw = raw.ok_or_else(|| {
            error::WardenError::ConfigurationMissing(format!(
                "setting '{}' is not set",
                MUTE_DURATION_KEY
            ))
        })?;

        let mute_duration_minutes: i64 = raw.trim().parse().map_err(|_| {
            error::WardenError::ConfigurationMissing(format!(
                "setting '{}' is not numeric: '{}'",
                MUTE_DURATION_KEY, raw
            ))
        })?;

        if mute_duration_minutes < 0 {
            return Err(error::WardenError::ConfigurationMissing(format!(
                "setting '{}' must be non-negative: {}",
                MUTE_DURATION_KEY, mute_duration_minutes
            )));
        }

        Ok(Self {
            mute_duration_minutes,
        })
    }
}
