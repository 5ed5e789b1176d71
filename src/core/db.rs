use crate::core::error;
use crate::core::schemas;
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};

pub fn db_connect(db_path: &str) -> Result<Connection, error::WardenError> {
    let conn = Connection::open(db_path)?;
    conn.busy_timeout(std::time::Duration::from_secs(5))
        .map_err(error::WardenError::Persistence)?;
    conn.query_row("PRAGMA journal_mode=WAL;", [], |_| Ok(()))
        .map_err(error::WardenError::Persistence)?;
    conn.execute("PRAGMA foreign_keys=ON;", [])
        .map_err(error::WardenError::Persistence)?;
    Ok(conn)
}

pub fn moderation_db_path(root: &Path) -> PathBuf {
    root.join(schemas::MODERATION_DB_NAME)
}

pub fn initialize_moderation_db(root: &Path) -> Result<(), error::WardenError> {
    use crate::core::broker::DbBroker;

    let db_path = moderation_db_path(root);
    let parent_dir = db_path
        .parent()
        .ok_or_else(|| error::WardenError::ValidationError("data root has no parent".into()))?;
    fs::create_dir_all(parent_dir).map_err(error::WardenError::Io)?;

    let broker = DbBroker::new(root);
    broker.with_conn(&db_path, "chatwarden", "moderation.init", |conn| {
        conn.execute(schemas::SCHEMA_BOT_SETTINGS, [])?;
        conn.execute(schemas::SCHEMA_WORD_FILTERS, [])?;
        conn.execute(schemas::SCHEMA_INDEX_FILTERS_TYPE, [])?;
        conn.execute(schemas::SCHEMA_USER_WARNINGS, [])?;
        conn.execute(schemas::SCHEMA_MODERATION_LOGS, [])?;
        conn.execute(schemas::SCHEMA_INDEX_LOGS_CREATED, [])?;
        conn.execute(schemas::SCHEMA_INDEX_LOGS_ACTION, [])?;
        conn.execute(schemas::SCHEMA_DAILY_STATS, [])?;
        Ok(())
    })
}
