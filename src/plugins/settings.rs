//! Bot settings: untyped key/value pairs owned by the admin surface.
//!
//! The engine reads them through `core::config::ModerationConfig`, which
//! validates once per invocation. Defaults are seeded at init so the
//! configuration-missing failure mode is unreachable in normal operation.

use crate::core::broker::DbBroker;
use crate::core::config;
use crate::core::db;
use crate::core::error;
use crate::core::store::Store;
use crate::core::time;
use clap::{Parser, Subcommand};
use rusqlite::{OptionalExtension, params};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BotSetting {
    pub key: String,
    pub value: String,
    pub updated_at: String,
}

#[derive(Parser, Debug)]
#[clap(name = "settings", about = "Manage bot settings")]
pub struct SettingsCli {
    #[clap(subcommand)]
    pub command: SettingsCommand,
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// Print one setting value.
    Get {
        #[clap(long)]
        key: String,
    },
    /// Upsert one setting.
    Set {
        #[clap(long)]
        key: String,
        #[clap(long)]
        value: String,
    },
    /// List all settings.
    List,
    /// Seed default settings without overwriting existing values.
    Seed,
}

pub fn run_settings_cli(store: &Store, cli: SettingsCli) -> Result<(), error::WardenError> {
    match cli.command {
        SettingsCommand::Get { key } => match get_setting(store, &key)? {
            Some(value) => println!("{}", value),
            None => {
                return Err(error::WardenError::NotFound(format!(
                    "setting '{}' is not set",
                    key
                )));
            }
        },
        SettingsCommand::Set { key, value } => {
            set_setting(store, &key, &value)?;
            println!("Setting updated: {}", key);
        }
        SettingsCommand::List => {
            let rows = list_settings(store)?;
            let json = serde_json::to_string_pretty(&rows)
                .map_err(|e| error::WardenError::ValidationError(e.to_string()))?;
            println!("{}", json);
        }
        SettingsCommand::Seed => {
            let seeded = seed_defaults(store)?;
            println!("Seeded {} default setting(s)", seeded);
        }
    }
    Ok(())
}

pub fn get_setting(store: &Store, key: &str) -> Result<Option<String>, error::WardenError> {
    let broker = DbBroker::new(&store.root);
    let db_path = db::moderation_db_path(&store.root);

    broker.with_conn(&db_path, "chatwarden", "settings.get", |conn| {
        let value = conn
            .query_row(
                "SELECT setting_value FROM bot_settings WHERE setting_key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    })
}

pub fn set_setting(store: &Store, key: &str, value: &str) -> Result<(), error::WardenError> {
    let broker = DbBroker::new(&store.root);
    let db_path = db::moderation_db_path(&store.root);
    let now = time::now_rfc3339();

    broker.with_conn(&db_path, "chatwarden", "settings.set", |conn| {
        conn.execute(
            "INSERT INTO bot_settings (setting_key, setting_value, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(setting_key) DO UPDATE SET
                 setting_value = excluded.setting_value,
                 updated_at = excluded.updated_at",
            params![key, value, now],
        )?;
        Ok(())
    })
}

pub fn list_settings(store: &Store) -> Result<Vec<BotSetting>, error::WardenError> {
    let broker = DbBroker::new(&store.root);
    let db_path = db::moderation_db_path(&store.root);

    broker.with_conn(&db_path, "chatwarden", "settings.list", |conn| {
        let mut stmt = conn.prepare(
            "SELECT setting_key, setting_value, updated_at FROM bot_settings ORDER BY setting_key",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(BotSetting {
                key: row.get(0)?,
                value: row.get(1)?,
                updated_at: row.get(2)?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    })
}

/// Insert defaults for any missing keys. Existing operator-set values are
/// never overwritten. Returns how many rows were inserted.
pub fn seed_defaults(store: &Store) -> Result<usize, error::WardenError> {
    let broker = DbBroker::new(&store.root);
    let db_path = db::moderation_db_path(&store.root);
    let now = time::now_rfc3339();

    let defaults = [(
        config::MUTE_DURATION_KEY,
        config::DEFAULT_MUTE_DURATION_MINUTES.to_string(),
    )];

    broker.with_conn(&db_path, "chatwarden", "settings.seed", |conn| {
        let mut seeded = 0;
        for (key, value) in &defaults {
            seeded += conn.execute(
                "INSERT OR IGNORE INTO bot_settings (setting_key, setting_value, updated_at)
                 VALUES (?1, ?2, ?3)",
                params![key, value, now],
            )?;
        }
        Ok(seeded)
    })
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "settings",
        "version": "0.1.0",
        "description": "Scalar bot configuration read by the decision engine",
        "commands": [
            { "name": "get", "parameters": ["key"] },
            { "name": "set", "parameters": ["key", "value"] },
            { "name": "list" },
            { "name": "seed", "description": "Seed defaults without overwriting" }
        ],
        "storage": ["moderation.db"]
    })
}
