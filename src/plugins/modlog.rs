//! Moderation log: append-only record of every action taken.
//!
//! The engine appends; this module lists. Entries are immutable once written.

use crate::core::broker::DbBroker;
use crate::core::db;
use crate::core::engine::Action;
use crate::core::error;
use crate::core::store::Store;
use clap::Parser;
use rusqlite::params;
use serde::{Deserialize, Serialize};

pub const DEFAULT_LOG_LIMIT: usize = 50;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LogEntry {
    pub action: Action,
    pub user_id: i64,
    pub username: String,
    pub reason: String,
    pub chat_id: i64,
    pub created_at: String,
}

#[derive(Parser, Debug)]
#[clap(name = "logs", about = "Show recent moderation actions")]
pub struct LogsCli {
    /// Maximum number of entries, newest first.
    #[clap(long, default_value_t = DEFAULT_LOG_LIMIT)]
    pub limit: usize,
}

pub fn run_logs_cli(store: &Store, cli: LogsCli) -> Result<(), error::WardenError> {
    let rows = recent_logs(store, cli.limit)?;
    let json = serde_json::to_string_pretty(&rows)
        .map_err(|e| error::WardenError::ValidationError(e.to_string()))?;
    println!("{}", json);
    Ok(())
}

pub fn recent_logs(store: &Store, limit: usize) -> Result<Vec<LogEntry>, error::WardenError> {
    let broker = DbBroker::new(&store.root);
    let db_path = db::moderation_db_path(&store.root);

    broker.with_conn(&db_path, "chatwarden", "modlog.list", |conn| {
        let mut stmt = conn.prepare(
            "SELECT action_type, user_id, username, reason, chat_id, created_at
             FROM moderation_logs
             ORDER BY created_at DESC, id DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            let action_raw: String = row.get(0)?;
            let action = parse_action(&action_raw).ok_or_else(|| {
                rusqlite::Error::FromSqlConversionFailure(
                    0,
                    rusqlite::types::Type::Text,
                    format!("unknown action_type '{}'", action_raw).into(),
                )
            })?;
            Ok(LogEntry {
                action,
                user_id: row.get(1)?,
                username: row.get(2)?,
                reason: row.get(3)?,
                chat_id: row.get(4)?,
                created_at: row.get(5)?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    })
}

fn parse_action(raw: &str) -> Option<Action> {
    match raw {
        "remove" => Some(Action::Remove),
        "mute" => Some(Action::Mute),
        "warn" => Some(Action::Warn),
        "kick" => Some(Action::Kick),
        _ => None,
    }
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "modlog",
        "version": "0.1.0",
        "description": "Append-only record of moderation actions",
        "commands": [
            { "name": "list", "parameters": ["limit"] }
        ],
        "storage": ["moderation.db"]
    })
}
