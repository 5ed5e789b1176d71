//! Warning ledger reads.
//!
//! The decision engine is the sole writer of `user_warnings` during message
//! processing; this module only reports. Mute expiry is advisory — rows are
//! never deleted and no background job clears `is_muted`.

use crate::core::broker::DbBroker;
use crate::core::db;
use crate::core::error;
use crate::core::store::Store;
use crate::core::time;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use rusqlite::{OptionalExtension, Row, params};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UserWarning {
    pub user_id: i64,
    pub username: String,
    pub warning_count: i64,
    pub last_warning_at: String,
    pub is_muted: bool,
    pub mute_until: Option<String>,
}

#[derive(Parser, Debug)]
#[clap(name = "warnings", about = "Inspect the per-user warning ledger")]
pub struct WarningsCli {
    #[clap(subcommand)]
    pub command: WarningsCommand,
}

#[derive(Subcommand, Debug)]
pub enum WarningsCommand {
    /// List all warned users.
    List,
    /// Show one user's warning record.
    Get {
        #[clap(long)]
        user: i64,
    },
}

pub fn run_warnings_cli(store: &Store, cli: WarningsCli) -> Result<(), error::WardenError> {
    match cli.command {
        WarningsCommand::List => {
            let rows = list_warnings(store)?;
            let json = serde_json::to_string_pretty(&rows)
                .map_err(|e| error::WardenError::ValidationError(e.to_string()))?;
            println!("{}", json);
        }
        WarningsCommand::Get { user } => match get_warning(store, user)? {
            Some(row) => {
                let json = serde_json::to_string_pretty(&row)
                    .map_err(|e| error::WardenError::ValidationError(e.to_string()))?;
                println!("{}", json);
            }
            None => {
                return Err(error::WardenError::NotFound(format!(
                    "no warning record for user {}",
                    user
                )));
            }
        },
    }
    Ok(())
}

fn warning_from_row(row: &Row) -> rusqlite::Result<UserWarning> {
    Ok(UserWarning {
        user_id: row.get(0)?,
        username: row.get(1)?,
        warning_count: row.get(2)?,
        last_warning_at: row.get(3)?,
        is_muted: row.get::<_, i64>(4)? != 0,
        mute_until: row.get(5)?,
    })
}

pub fn list_warnings(store: &Store) -> Result<Vec<UserWarning>, error::WardenError> {
    let broker = DbBroker::new(&store.root);
    let db_path = db::moderation_db_path(&store.root);

    broker.with_conn(&db_path, "chatwarden", "warnings.list", |conn| {
        let mut stmt = conn.prepare(
            "SELECT user_id, username, warning_count, last_warning_at, is_muted, mute_until
             FROM user_warnings ORDER BY last_warning_at DESC",
        )?;
        let rows = stmt.query_map([], |row| warning_from_row(row))?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    })
}

pub fn get_warning(store: &Store, user_id: i64) -> Result<Option<UserWarning>, error::WardenError> {
    let broker = DbBroker::new(&store.root);
    let db_path = db::moderation_db_path(&store.root);

    broker.with_conn(&db_path, "chatwarden", "warnings.get", |conn| {
        let row = conn
            .query_row(
                "SELECT user_id, username, warning_count, last_warning_at, is_muted, mute_until
                 FROM user_warnings WHERE user_id = ?1",
                params![user_id],
                |row| warning_from_row(row),
            )
            .optional()?;
        Ok(row)
    })
}

/// Count users whose mute has not yet expired at `now`.
pub fn muted_count(store: &Store, now: DateTime<Utc>) -> Result<i64, error::WardenError> {
    let rows = list_warnings(store)?;
    let count = rows
        .iter()
        .filter(|w| {
            w.is_muted
                && w.mute_until
                    .as_deref()
                    .and_then(time::parse_rfc3339)
                    .map(|until| until > now)
                    .unwrap_or(false)
        })
        .count();
    Ok(count as i64)
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "warnings",
        "version": "0.1.0",
        "description": "Per-user warning counts and mute state",
        "commands": [
            { "name": "list" },
            { "name": "get", "parameters": ["user"] }
        ],
        "storage": ["moderation.db"]
    })
}
