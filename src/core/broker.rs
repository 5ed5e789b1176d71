use crate::core::db;
use crate::core::error;
use crate::core::time;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// The DB Broker is the single gate for moderation-store access: an
/// in-process serialized request layer with an append-only audit trail.
///
/// Webhook invocations may arrive concurrently for the same sender, so every
/// operation holds the process-wide lock for its full duration. Combined with
/// SQLite's transactional upsert/increment statements this rules out lost
/// updates on `user_warnings` and `daily_stats`.
pub struct DbBroker {
    audit_log_path: PathBuf,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BrokerEvent {
    pub ts: String,
    pub event_id: String,
    pub actor: String,
    pub op: String,
    pub db_id: String,
    pub status: String,
}

impl DbBroker {
    pub fn new(root: &Path) -> Self {
        Self {
            audit_log_path: root.join("broker.events.jsonl"),
        }
    }

    /// Execute a closure with a serialized connection to the specified DB.
    ///
    /// The closure receives a mutable connection so callers can open an
    /// explicit `rusqlite` transaction spanning several statements.
    pub fn with_conn<F, R>(
        &self,
        db_path: &Path,
        actor: &str,
        op_name: &str,
        f: F,
    ) -> Result<R, error::WardenError>
    where
        F: FnOnce(&mut Connection) -> Result<R, error::WardenError>,
    {
        static DB_LOCK: Mutex<()> = Mutex::new(());
        let _lock = DB_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let db_id = db_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let mut conn = db::db_connect(&db_path.to_string_lossy())?;

        let result = f(&mut conn);

        // The closure's writes are already durable here; the audit line is
        // best-effort and must not replace a committed result.
        let status = if result.is_ok() { "success" } else { "error" };
        if let Err(audit_err) = self.log_event(actor, op_name, &db_id, status) {
            eprintln!(
                "chatwarden: audit append failed for '{}': {}",
                op_name, audit_err
            );
        }

        result
    }

    fn log_event(
        &self,
        actor: &str,
        op: &str,
        db_id: &str,
        status: &str,
    ) -> Result<(), error::WardenError> {
        use std::fs::OpenOptions;
        use std::io::Write;

        let ev = BrokerEvent {
            ts: time::now_rfc3339(),
            event_id: time::new_event_id(),
            actor: actor.to_string(),
            op: op.to_string(),
            db_id: db_id.to_string(),
            status: status.to_string(),
        };

        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.audit_log_path)
            .map_err(error::WardenError::Io)?;

        let line = serde_json::to_string(&ev)
            .map_err(|e| error::WardenError::ValidationError(e.to_string()))?;
        writeln!(f, "{}", line).map_err(error::WardenError::Io)?;
        Ok(())
    }
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "broker",
        "version": "0.1.0",
        "description": "Serialized moderation-store access with audit trail",
        "commands": [
            { "name": "audit", "description": "Show the mutation audit log" }
        ],
        "storage": ["broker.events.jsonl"]
    })
}
