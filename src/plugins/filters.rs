//! Word-filter lists for the moderation engine.
//!
//! Filter words are grouped by category, matched as substrings, and
//! soft-disabled rather than deleted. Scan order is insertion order.

use crate::core::broker::DbBroker;
use crate::core::db;
use crate::core::error;
use crate::core::store::Store;
use crate::core::time;
use clap::{Parser, Subcommand, ValueEnum};
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FilterCategory {
    Spam,
    Profanity,
}

impl FilterCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterCategory::Spam => "spam",
            FilterCategory::Profanity => "profanity",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FilterWord {
    pub id: i64,
    pub category: FilterCategory,
    pub word: String,
    pub is_active: bool,
    pub created_at: String,
}

#[derive(Parser, Debug)]
#[clap(name = "filters", about = "Manage moderation word lists")]
pub struct FiltersCli {
    #[clap(subcommand)]
    pub command: FiltersCommand,
}

#[derive(Subcommand, Debug)]
pub enum FiltersCommand {
    /// Add words to a filter list (duplicates are ignored).
    Add {
        #[clap(long, value_enum)]
        category: FilterCategory,
        /// Words to add; multi-word phrases are single arguments.
        words: Vec<String>,
    },
    /// List filter words for a category.
    List {
        #[clap(long, value_enum)]
        category: FilterCategory,
        /// Include soft-disabled words.
        #[clap(long)]
        all: bool,
    },
    /// Soft-disable a word without deleting it.
    Disable {
        #[clap(long, value_enum)]
        category: FilterCategory,
        #[clap(long)]
        word: String,
    },
}

pub fn run_filters_cli(store: &Store, cli: FiltersCli) -> Result<(), error::WardenError> {
    match cli.command {
        FiltersCommand::Add { category, words } => {
            let added = add_words(store, category, &words)?;
            println!("Added {} word(s) to {}", added, category.as_str());
        }
        FiltersCommand::List { category, all } => {
            let rows = list_filters(store, category, all)?;
            let json = serde_json::to_string_pretty(&rows)
                .map_err(|e| error::WardenError::ValidationError(e.to_string()))?;
            println!("{}", json);
        }
        FiltersCommand::Disable { category, word } => {
            if disable_word(store, category, &word)? {
                println!("Disabled '{}' in {}", word, category.as_str());
            } else {
                println!("No active '{}' in {}", word, category.as_str());
            }
        }
    }
    Ok(())
}

/// Insert words into a category. Empty and whitespace-only entries are
/// skipped; duplicates are ignored. Returns how many rows were inserted.
pub fn add_words(
    store: &Store,
    category: FilterCategory,
    words: &[String],
) -> Result<usize, error::WardenError> {
    let broker = DbBroker::new(&store.root);
    let db_path = db::moderation_db_path(&store.root);
    let now = time::now_rfc3339();

    broker.with_conn(&db_path, "chatwarden", "filters.add", |conn| {
        let mut added = 0;
        for word in words {
            let word = word.trim();
            if word.is_empty() {
                continue;
            }
            added += conn.execute(
                "INSERT OR IGNORE INTO word_filters (filter_type, word, created_at)
                 VALUES (?1, ?2, ?3)",
                params![category.as_str(), word, now],
            )?;
        }
        Ok(added)
    })
}

/// Active words for a category, in insertion order. This is the snapshot the
/// engine scans.
pub fn active_words(
    store: &Store,
    category: FilterCategory,
) -> Result<Vec<String>, error::WardenError> {
    let broker = DbBroker::new(&store.root);
    let db_path = db::moderation_db_path(&store.root);

    broker.with_conn(&db_path, "chatwarden", "filters.active", |conn| {
        active_words_on(conn, category)
    })
}

/// Same as [`active_words`], against an already-brokered connection. The
/// engine calls this inside its own broker scope.
pub fn active_words_on(
    conn: &Connection,
    category: FilterCategory,
) -> Result<Vec<String>, error::WardenError> {
    let mut stmt = conn.prepare(
        "SELECT word FROM word_filters
         WHERE filter_type = ?1 AND is_active = 1
         ORDER BY id",
    )?;
    let rows = stmt.query_map(params![category.as_str()], |row| row.get::<_, String>(0))?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub fn list_filters(
    store: &Store,
    category: FilterCategory,
    include_disabled: bool,
) -> Result<Vec<FilterWord>, error::WardenError> {
    let broker = DbBroker::new(&store.root);
    let db_path = db::moderation_db_path(&store.root);

    broker.with_conn(&db_path, "chatwarden", "filters.list", |conn| {
        let sql = if include_disabled {
            "SELECT id, word, is_active, created_at FROM word_filters
             WHERE filter_type = ?1 ORDER BY id"
        } else {
            "SELECT id, word, is_active, created_at FROM word_filters
             WHERE filter_type = ?1 AND is_active = 1 ORDER BY id"
        };
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params![category.as_str()], |row| {
            Ok(FilterWord {
                id: row.get(0)?,
                category,
                word: row.get(1)?,
                is_active: row.get::<_, i64>(2)? != 0,
                created_at: row.get(3)?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    })
}

/// Soft-disable one word. Returns whether a row changed.
pub fn disable_word(
    store: &Store,
    category: FilterCategory,
    word: &str,
) -> Result<bool, error::WardenError> {
    let broker = DbBroker::new(&store.root);
    let db_path = db::moderation_db_path(&store.root);

    broker.with_conn(&db_path, "chatwarden", "filters.disable", |conn| {
        let changed = conn.execute(
            "UPDATE word_filters SET is_active = 0
             WHERE filter_type = ?1 AND word = ?2 AND is_active = 1",
            params![category.as_str(), word],
        )?;
        Ok(changed > 0)
    })
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "filters",
        "version": "0.1.0",
        "description": "Per-category word lists driving moderation decisions",
        "commands": [
            { "name": "add", "parameters": ["category", "words"] },
            { "name": "list", "parameters": ["category", "all"] },
            { "name": "disable", "parameters": ["category", "word"] }
        ],
        "storage": ["moderation.db"]
    })
}
