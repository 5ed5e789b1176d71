//! Moderation statistics: today's overview and the per-day aggregates.
//!
//! The overview is computed from `moderation_logs` and the warning ledger;
//! the daily listing reads the `daily_stats` counters the engine maintains
//! alongside each log append.

use crate::core::broker::DbBroker;
use crate::core::db;
use crate::core::error;
use crate::core::store::Store;
use crate::core::time;
use crate::plugins::warnings;
use clap::{Parser, Subcommand};
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};

pub const DEFAULT_DAILY_LIMIT: usize = 30;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StatsOverview {
    pub today_bans: i64,
    pub current_mutes: i64,
    pub today_warns: i64,
    pub today_removes: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DailyStat {
    pub date: String,
    pub bans: i64,
    pub mutes: i64,
    pub warns: i64,
    pub removes: i64,
}

#[derive(Parser, Debug)]
#[clap(name = "stats", about = "Moderation statistics")]
pub struct StatsCli {
    #[clap(subcommand)]
    pub command: StatsCommand,
}

#[derive(Subcommand, Debug)]
pub enum StatsCommand {
    /// Today's action counts and the number of currently muted users.
    Today,
    /// Per-day aggregate counters, newest first.
    Daily {
        #[clap(long, default_value_t = DEFAULT_DAILY_LIMIT)]
        days: usize,
    },
}

pub fn run_stats_cli(store: &Store, cli: StatsCli) -> Result<(), error::WardenError> {
    let out = match cli.command {
        StatsCommand::Today => {
            let overview = overview(store)?;
            serde_json::to_string_pretty(&overview)
        }
        StatsCommand::Daily { days } => {
            let rows = daily(store, days)?;
            serde_json::to_string_pretty(&rows)
        }
    };
    let json = out.map_err(|e| error::WardenError::ValidationError(e.to_string()))?;
    println!("{}", json);
    Ok(())
}

pub fn overview(store: &Store) -> Result<StatsOverview, error::WardenError> {
    let now = time::now_utc();
    let today = time::stat_date(now);
    let current_mutes = warnings::muted_count(store, now)?;

    let broker = DbBroker::new(&store.root);
    let db_path = db::moderation_db_path(&store.root);

    broker.with_conn(&db_path, "chatwarden", "stats.overview", |conn| {
        Ok(StatsOverview {
            today_bans: count_actions_on_day(conn, "kick", &today)?,
            current_mutes,
            today_warns: count_actions_on_day(conn, "warn", &today)?,
            today_removes: count_actions_on_day(conn, "remove", &today)?,
        })
    })
}

fn count_actions_on_day(
    conn: &Connection,
    action_type: &str,
    stat_date: &str,
) -> Result<i64, error::WardenError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM moderation_logs
         WHERE action_type = ?1 AND substr(created_at, 1, 10) = ?2",
        params![action_type, stat_date],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn daily(store: &Store, limit: usize) -> Result<Vec<DailyStat>, error::WardenError> {
    let broker = DbBroker::new(&store.root);
    let db_path = db::moderation_db_path(&store.root);

    broker.with_conn(&db_path, "chatwarden", "stats.daily", |conn| {
        let mut stmt = conn.prepare(
            "SELECT stat_date, total_bans, total_mutes, total_warns, total_removes
             FROM daily_stats
             ORDER BY stat_date DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(DailyStat {
                date: row.get(0)?,
                bans: row.get(1)?,
                mutes: row.get(2)?,
                warns: row.get(3)?,
                removes: row.get(4)?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    })
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "stats",
        "version": "0.1.0",
        "description": "Today's overview and per-day moderation aggregates",
        "commands": [
            { "name": "today" },
            { "name": "daily", "parameters": ["days"] }
        ],
        "storage": ["moderation.db"]
    })
}
