//! Store handle for the chatwarden data root.

use std::path::PathBuf;

/// Handle to a chatwarden state workspace.
///
/// All subsystem state (filters, settings, warnings, logs, daily stats) lives
/// under `root` in a single `moderation.db`, alongside the broker audit trail.
#[derive(Debug, Clone)]
pub struct Store {
    /// Absolute path to the data root directory
    pub root: PathBuf,
}

impl Store {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}
