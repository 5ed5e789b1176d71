//! Moderation decision engine.
//!
//! Consumes one inbound chat message plus the current settings and word-filter
//! snapshots, decides whether to act, and applies the resulting writes
//! (warning upsert, log append, daily counter) as a single transaction.
//!
//! The engine decides and durably records; it never calls the chat platform.
//! Enforcement of a `remove`/`mute` against the platform is the caller's job.

use crate::core::broker::DbBroker;
use crate::core::config::ModerationConfig;
use crate::core::db;
use crate::core::error;
use crate::core::store::Store;
use crate::core::time;
use crate::plugins::filters::{self, FilterCategory};
use rusqlite::{Transaction, params};
use serde::{Deserialize, Serialize};

/// Moderation action vocabulary as recorded in `moderation_logs` and counted
/// in `daily_stats`.
///
/// `Warn` and `Kick` exist in the schema and the stats queries, but no engine
/// path currently produces them; the ban counters stay at zero.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Remove,
    Mute,
    Warn,
    Kick,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Remove => "remove",
            Action::Mute => "mute",
            Action::Warn => "warn",
            Action::Kick => "kick",
        }
    }

    /// `daily_stats` counter column incremented for this action.
    pub fn counter_column(&self) -> &'static str {
        match self {
            Action::Remove => "total_removes",
            Action::Mute => "total_mutes",
            Action::Warn => "total_warns",
            Action::Kick => "total_bans",
        }
    }
}

/// Outcome of one engine invocation, in the original deployment's envelope
/// vocabulary: `remove`, `mute`, `none` (no match), `ignored` (no message body).
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DecisionAction {
    Remove,
    Mute,
    None,
    Ignored,
}

impl DecisionAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionAction::Remove => "remove",
            DecisionAction::Mute => "mute",
            DecisionAction::None => "none",
            DecisionAction::Ignored => "ignored",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Decision {
    pub action: DecisionAction,
    pub reason: Option<String>,
}

impl Decision {
    pub fn none() -> Self {
        Self {
            action: DecisionAction::None,
            reason: None,
        }
    }

    pub fn ignored() -> Self {
        Self {
            action: DecisionAction::Ignored,
            reason: None,
        }
    }
}

/// One inbound chat message, already extracted from the webhook envelope.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct InboundMessage {
    pub chat_id: i64,
    pub sender_id: i64,
    pub sender_username: Option<String>,
    pub text: String,
}

impl InboundMessage {
    /// Display name recorded in the ledger and log when the sender has no
    /// username.
    pub fn display_name(&self) -> String {
        match &self.sender_username {
            Some(name) => name.clone(),
            None => format!("user_{}", self.sender_id),
        }
    }
}

/// First-match-wins substring scan over the active word lists.
///
/// Case-insensitive containment, no word-boundary check. Spam is scanned
/// first and takes precedence; a message is never both.
pub fn match_filters<'a>(
    text: &str,
    spam_words: &'a [String],
    profanity_words: &'a [String],
) -> Option<(FilterCategory, &'a str)> {
    let text = text.to_lowercase();

    for word in spam_words {
        if text.contains(&word.to_lowercase()) {
            return Some((FilterCategory::Spam, word.as_str()));
        }
    }
    for word in profanity_words {
        if text.contains(&word.to_lowercase()) {
            return Some((FilterCategory::Profanity, word.as_str()));
        }
    }
    None
}

/// Decide on one message and apply the resulting state transitions.
///
/// Reads (config, filter snapshots) happen first; on a match, the warning
/// upsert, log append, and daily counter land in one transaction. Any failure
/// rolls the whole unit back — no partially applied moderation action.
pub fn decide_and_apply(
    store: &Store,
    msg: &InboundMessage,
) -> Result<Decision, error::WardenError> {
    let broker = DbBroker::new(&store.root);
    let db_path = db::moderation_db_path(&store.root);

    broker.with_conn(&db_path, "chatwarden", "engine.process", |conn| {
        let config = ModerationConfig::load(conn)?;

        let spam_words = filters::active_words_on(conn, FilterCategory::Spam)?;
        let profanity_words = filters::active_words_on(conn, FilterCategory::Profanity)?;

        let Some((category, word)) = match_filters(&msg.text, &spam_words, &profanity_words)
        else {
            return Ok(Decision::none());
        };

        let (action, decided, reason) = match category {
            FilterCategory::Spam => (
                Action::Remove,
                DecisionAction::Remove,
                format!("Spam: {}", word),
            ),
            FilterCategory::Profanity => (
                Action::Mute,
                DecisionAction::Mute,
                format!("Profanity: {}", word),
            ),
        };

        let now = time::now_utc();
        let tx = conn.transaction()?;

        if action == Action::Mute {
            let mute_until = time::mute_expiry(now, config.mute_duration_minutes);
            upsert_warning(&tx, msg, now.to_rfc3339(), mute_until.to_rfc3339())?;
        }

        append_log(&tx, action, msg, &reason, now.to_rfc3339())?;
        bump_daily_counter(&tx, action, &time::stat_date(now))?;

        tx.commit()?;

        Ok(Decision {
            action: decided,
            reason: Some(reason),
        })
    })
}

/// Process one raw webhook update.
///
/// Updates without a message, or messages without text, are a normal
/// `ignored` result. A message missing `from.id` or `chat.id` is rejected
/// before any storage access.
pub fn process_update(
    store: &Store,
    update: &serde_json::Value,
) -> Result<Decision, error::WardenError> {
    let Some(message) = update.get("message") else {
        return Ok(Decision::ignored());
    };

    let Some(text) = message.get("text").and_then(|t| t.as_str()) else {
        return Ok(Decision::ignored());
    };

    let sender_id = message
        .get("from")
        .and_then(|f| f.get("id"))
        .and_then(|id| id.as_i64())
        .ok_or_else(|| {
            error::WardenError::ValidationError("message is missing from.id".into())
        })?;

    let chat_id = message
        .get("chat")
        .and_then(|c| c.get("id"))
        .and_then(|id| id.as_i64())
        .ok_or_else(|| {
            error::WardenError::ValidationError("message is missing chat.id".into())
        })?;

    let sender_username = message
        .get("from")
        .and_then(|f| f.get("username"))
        .and_then(|u| u.as_str())
        .map(|u| u.to_string());

    let msg = InboundMessage {
        chat_id,
        sender_id,
        sender_username,
        text: text.to_string(),
    };

    decide_and_apply(store, &msg)
}

/// Atomic insert-or-increment keyed by `user_id`. A refreshed mute replaces
/// the previous expiry rather than extending it.
fn upsert_warning(
    tx: &Transaction,
    msg: &InboundMessage,
    now: String,
    mute_until: String,
) -> Result<(), error::WardenError> {
    tx.execute(
        "INSERT INTO user_warnings (user_id, username, warning_count, last_warning_at, is_muted, mute_until)
         VALUES (?1, ?2, 1, ?3, 1, ?4)
         ON CONFLICT(user_id) DO UPDATE SET
             warning_count = warning_count + 1,
             username = excluded.username,
             last_warning_at = excluded.last_warning_at,
             is_muted = 1,
             mute_until = excluded.mute_until",
        params![msg.sender_id, msg.display_name(), now, mute_until],
    )?;
    Ok(())
}

fn append_log(
    tx: &Transaction,
    action: Action,
    msg: &InboundMessage,
    reason: &str,
    now: String,
) -> Result<(), error::WardenError> {
    tx.execute(
        "INSERT INTO moderation_logs (action_type, user_id, username, reason, chat_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            action.as_str(),
            msg.sender_id,
            msg.display_name(),
            reason,
            msg.chat_id,
            now
        ],
    )?;
    Ok(())
}

/// Ensure today's `daily_stats` row exists, then increment the counter for
/// the action. The counter column name comes from the closed `Action`
/// vocabulary, never from input.
fn bump_daily_counter(
    tx: &Transaction,
    action: Action,
    stat_date: &str,
) -> Result<(), error::WardenError> {
    tx.execute(
        "INSERT INTO daily_stats (stat_date, total_bans, total_mutes, total_warns, total_removes)
         VALUES (?1, 0, 0, 0, 0)
         ON CONFLICT(stat_date) DO NOTHING",
        params![stat_date],
    )?;
    let sql = format!(
        "UPDATE daily_stats SET {col} = {col} + 1 WHERE stat_date = ?1",
        col = action.counter_column()
    );
    tx.execute(&sql, params![stat_date])?;
    Ok(())
}
