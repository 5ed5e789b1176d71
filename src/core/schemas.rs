//! Database schema definitions for the moderation store.
//!
//! All five tables live in a single SQLite database so the decision engine's
//! write set (warning upsert, log append, daily counter) commits as one native
//! transaction.

pub const MODERATION_DB_NAME: &str = "moderation.db";

pub const SCHEMA_BOT_SETTINGS: &str = "
    CREATE TABLE IF NOT EXISTS bot_settings (
        setting_key TEXT PRIMARY KEY,
        setting_value TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
";

pub const SCHEMA_WORD_FILTERS: &str = "
    CREATE TABLE IF NOT EXISTS word_filters (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        filter_type TEXT NOT NULL,
        word TEXT NOT NULL,
        is_active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL,
        UNIQUE(filter_type, word)
    )
";

pub const SCHEMA_INDEX_FILTERS_TYPE: &str =
    "CREATE INDEX IF NOT EXISTS idx_word_filters_type ON word_filters(filter_type, is_active)";

pub const SCHEMA_USER_WARNINGS: &str = "
    CREATE TABLE IF NOT EXISTS user_warnings (
        user_id INTEGER PRIMARY KEY,
        username TEXT NOT NULL,
        warning_count INTEGER NOT NULL DEFAULT 0,
        last_warning_at TEXT NOT NULL,
        is_muted INTEGER NOT NULL DEFAULT 0,
        mute_until TEXT
    )
";

pub const SCHEMA_MODERATION_LOGS: &str = "
    CREATE TABLE IF NOT EXISTS moderation_logs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        action_type TEXT NOT NULL,
        user_id INTEGER NOT NULL,
        username TEXT NOT NULL,
        reason TEXT NOT NULL,
        chat_id INTEGER NOT NULL,
        created_at TEXT NOT NULL
    )
";

pub const SCHEMA_INDEX_LOGS_CREATED: &str =
    "CREATE INDEX IF NOT EXISTS idx_moderation_logs_created ON moderation_logs(created_at)";
pub const SCHEMA_INDEX_LOGS_ACTION: &str =
    "CREATE INDEX IF NOT EXISTS idx_moderation_logs_action ON moderation_logs(action_type)";

pub const SCHEMA_DAILY_STATS: &str = "
    CREATE TABLE IF NOT EXISTS daily_stats (
        stat_date TEXT PRIMARY KEY,
        total_bans INTEGER NOT NULL DEFAULT 0,
        total_mutes INTEGER NOT NULL DEFAULT 0,
        total_warns INTEGER NOT NULL DEFAULT 0,
        total_removes INTEGER NOT NULL DEFAULT 0
    )
";
