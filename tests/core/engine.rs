use chatwarden::core::db::{db_connect, initialize_moderation_db, moderation_db_path};
use chatwarden::core::engine::{
    Decision, DecisionAction, InboundMessage, decide_and_apply, process_update,
};
use chatwarden::core::error::WardenError;
use chatwarden::core::store::Store;
use chatwarden::core::time;
use chatwarden::plugins::filters::{FilterCategory, add_words};
use chatwarden::plugins::modlog::recent_logs;
use chatwarden::plugins::settings::{seed_defaults, set_setting};
use chatwarden::plugins::stats::daily;
use chatwarden::plugins::warnings::{get_warning, list_warnings};
use serde_json::json;
use tempfile::tempdir;

fn new_store(tmp: &tempfile::TempDir) -> Store {
    let store = Store::new(tmp.path().to_path_buf());
    initialize_moderation_db(&store.root).unwrap();
    store
}

fn seeded_store(tmp: &tempfile::TempDir) -> Store {
    let store = new_store(tmp);
    seed_defaults(&store).unwrap();
    add_words(&store, FilterCategory::Spam, &["buy now".to_string()]).unwrap();
    add_words(&store, FilterCategory::Profanity, &["damn".to_string()]).unwrap();
    store
}

fn message(text: &str) -> InboundMessage {
    InboundMessage {
        chat_id: -1001,
        sender_id: 42,
        sender_username: Some("alice".to_string()),
        text: text.to_string(),
    }
}

#[test]
fn test_no_match_returns_none_and_writes_nothing() {
    let tmp = tempdir().unwrap();
    let store = seeded_store(&tmp);

    let decision = decide_and_apply(&store, &message("hello there")).unwrap();
    assert_eq!(decision, Decision::none());

    assert!(recent_logs(&store, 50).unwrap().is_empty());
    assert!(list_warnings(&store).unwrap().is_empty());
    assert!(daily(&store, 30).unwrap().is_empty());
}

#[test]
fn test_empty_text_is_no_match() {
    let tmp = tempdir().unwrap();
    let store = seeded_store(&tmp);

    let decision = decide_and_apply(&store, &message("")).unwrap();
    assert_eq!(decision.action, DecisionAction::None);
}

#[test]
fn test_spam_removes_and_takes_precedence() {
    let tmp = tempdir().unwrap();
    let store = seeded_store(&tmp);

    // Both a spam and a profanity word present: spam wins, no mute happens.
    let decision = decide_and_apply(&store, &message("damn, buy now!")).unwrap();
    assert_eq!(decision.action, DecisionAction::Remove);
    assert!(decision.reason.unwrap().contains("buy now"));

    assert!(get_warning(&store, 42).unwrap().is_none());

    let logs = recent_logs(&store, 50).unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].reason, "Spam: buy now");
    assert_eq!(logs[0].chat_id, -1001);

    let days = daily(&store, 30).unwrap();
    assert_eq!(days.len(), 1);
    assert_eq!(days[0].removes, 1);
    assert_eq!(days[0].mutes, 0);
    assert_eq!(days[0].bans, 0);
}

#[test]
fn test_profanity_mutes_and_increments_warning_count() {
    let tmp = tempdir().unwrap();
    let store = seeded_store(&tmp);

    let decision = decide_and_apply(&store, &message("oh damn")).unwrap();
    assert_eq!(decision.action, DecisionAction::Mute);
    assert_eq!(decision.reason.as_deref(), Some("Profanity: damn"));

    let warning = get_warning(&store, 42).unwrap().unwrap();
    assert_eq!(warning.warning_count, 1);
    assert!(warning.is_muted);
    let until = time::parse_rfc3339(warning.mute_until.as_deref().unwrap()).unwrap();
    let minutes = (until - time::now_utc()).num_minutes();
    assert!((9..=10).contains(&minutes), "mute_until ~ now+10m, got {}m", minutes);

    decide_and_apply(&store, &message("damn again")).unwrap();
    let warning = get_warning(&store, 42).unwrap().unwrap();
    assert_eq!(warning.warning_count, 2);
}

#[test]
fn test_mute_refresh_replaces_rather_than_extends() {
    let tmp = tempdir().unwrap();
    let store = seeded_store(&tmp);

    set_setting(&store, "mute_duration_minutes", "60").unwrap();
    decide_and_apply(&store, &message("damn")).unwrap();
    let first = get_warning(&store, 42).unwrap().unwrap();
    let first_until = time::parse_rfc3339(first.mute_until.as_deref().unwrap()).unwrap();

    // A shorter duration on the next offense must pull the expiry in; the new
    // expiry replaces the old one, it is never max()'d against it.
    set_setting(&store, "mute_duration_minutes", "1").unwrap();
    decide_and_apply(&store, &message("damn")).unwrap();
    let second = get_warning(&store, 42).unwrap().unwrap();
    let second_until = time::parse_rfc3339(second.mute_until.as_deref().unwrap()).unwrap();

    assert_eq!(second.warning_count, 2);
    assert!(second_until < first_until);
}

#[test]
fn test_missing_mute_duration_is_configuration_error() {
    let tmp = tempdir().unwrap();
    let store = new_store(&tmp);
    add_words(&store, FilterCategory::Profanity, &["damn".to_string()]).unwrap();

    let err = decide_and_apply(&store, &message("damn")).unwrap_err();
    assert!(matches!(err, WardenError::ConfigurationMissing(_)));

    // Fatal before any write, even though a profanity match would occur.
    assert!(recent_logs(&store, 50).unwrap().is_empty());
    assert!(list_warnings(&store).unwrap().is_empty());
}

#[test]
fn test_non_numeric_mute_duration_is_configuration_error() {
    let tmp = tempdir().unwrap();
    let store = seeded_store(&tmp);
    set_setting(&store, "mute_duration_minutes", "soon").unwrap();

    let err = decide_and_apply(&store, &message("damn")).unwrap_err();
    assert!(matches!(err, WardenError::ConfigurationMissing(_)));
}

#[test]
fn test_daily_aggregate_matches_log_counts() {
    let tmp = tempdir().unwrap();
    let store = seeded_store(&tmp);

    decide_and_apply(&store, &message("buy now, everyone")).unwrap();
    decide_and_apply(&store, &message("oh damn")).unwrap();
    decide_and_apply(&store, &message("damn damn")).unwrap();
    decide_and_apply(&store, &message("nothing wrong here")).unwrap();

    let logs = recent_logs(&store, 50).unwrap();
    let mutes = logs
        .iter()
        .filter(|l| l.action == chatwarden::core::engine::Action::Mute)
        .count();
    let removes = logs
        .iter()
        .filter(|l| l.action == chatwarden::core::engine::Action::Remove)
        .count();

    let days = daily(&store, 30).unwrap();
    assert_eq!(days.len(), 1);
    assert_eq!(days[0].mutes as usize, mutes);
    assert_eq!(days[0].removes as usize, removes);
    assert_eq!(days[0].mutes, 2);
    assert_eq!(days[0].removes, 1);
    assert_eq!(days[0].bans, 0);
    assert_eq!(days[0].warns, 0);
}

#[test]
fn test_failed_write_set_rolls_back_completely() {
    let tmp = tempdir().unwrap();
    let store = seeded_store(&tmp);

    // Break the last statement of the write set: the daily counter bump
    // fails, so the earlier warning upsert and log append must not survive
    // on their own.
    let db_path = moderation_db_path(&store.root);
    let conn = db_connect(&db_path.to_string_lossy()).unwrap();
    conn.execute("DROP TABLE daily_stats", []).unwrap();
    drop(conn);

    let err = decide_and_apply(&store, &message("oh damn")).unwrap_err();
    assert!(matches!(err, WardenError::Persistence(_)));

    assert!(get_warning(&store, 42).unwrap().is_none());
    assert!(recent_logs(&store, 50).unwrap().is_empty());
    assert!(list_warnings(&store).unwrap().is_empty());
}

#[test]
fn test_committed_decision_survives_audit_append_failure() {
    let tmp = tempdir().unwrap();
    let store = seeded_store(&tmp);

    // Make the audit trail unappendable; the moderation writes still commit
    // and the invocation still reports success.
    let audit = store.root.join("broker.events.jsonl");
    std::fs::remove_file(&audit).unwrap();
    std::fs::create_dir(&audit).unwrap();

    let decision = decide_and_apply(&store, &message("oh damn")).unwrap();
    assert_eq!(decision.action, DecisionAction::Mute);

    let warning = get_warning(&store, 42).unwrap().unwrap();
    assert_eq!(warning.warning_count, 1);
    assert_eq!(recent_logs(&store, 50).unwrap().len(), 1);
}

#[test]
fn test_update_without_message_is_ignored() {
    let tmp = tempdir().unwrap();
    let store = seeded_store(&tmp);

    let update = json!({"edited_channel_post": {"id": 9}});
    let decision = process_update(&store, &update).unwrap();
    assert_eq!(decision, Decision::ignored());
    assert!(recent_logs(&store, 50).unwrap().is_empty());
}

#[test]
fn test_message_without_text_is_ignored() {
    let tmp = tempdir().unwrap();
    let store = seeded_store(&tmp);

    let update = json!({"message": {"photo": [], "from": {"id": 7}, "chat": {"id": -1}}});
    let decision = process_update(&store, &update).unwrap();
    assert_eq!(decision.action, DecisionAction::Ignored);
}

#[test]
fn test_message_missing_ids_is_rejected() {
    let tmp = tempdir().unwrap();
    let store = seeded_store(&tmp);

    let update = json!({"message": {"text": "damn", "chat": {"id": -1}}});
    let err = process_update(&store, &update).unwrap_err();
    assert!(matches!(err, WardenError::ValidationError(_)));

    let update = json!({"message": {"text": "damn", "from": {"id": 7}}});
    let err = process_update(&store, &update).unwrap_err();
    assert!(matches!(err, WardenError::ValidationError(_)));

    // Rejected before storage access: nothing recorded.
    assert!(recent_logs(&store, 50).unwrap().is_empty());
    assert!(list_warnings(&store).unwrap().is_empty());
}

#[test]
fn test_username_fallback_in_ledger() {
    let tmp = tempdir().unwrap();
    let store = seeded_store(&tmp);

    let update = json!({"message": {
        "text": "oh damn",
        "from": {"id": 77},
        "chat": {"id": -1}
    }});
    let decision = process_update(&store, &update).unwrap();
    assert_eq!(decision.action, DecisionAction::Mute);

    let warning = get_warning(&store, 77).unwrap().unwrap();
    assert_eq!(warning.username, "user_77");
}

#[test]
fn test_concurrent_mutes_lose_no_updates() {
    let tmp = tempdir().unwrap();
    let store = seeded_store(&tmp);

    const N: usize = 16;
    let mut handles = Vec::new();
    for _ in 0..N {
        let store = store.clone();
        handles.push(std::thread::spawn(move || {
            decide_and_apply(&store, &message("damn")).unwrap();
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    let warning = get_warning(&store, 42).unwrap().unwrap();
    assert_eq!(warning.warning_count, N as i64);

    let days = daily(&store, 30).unwrap();
    assert_eq!(days[0].mutes, N as i64);
    assert_eq!(recent_logs(&store, 100).unwrap().len(), N);
}
