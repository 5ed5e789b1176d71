use chatwarden::core::db::initialize_moderation_db;
use chatwarden::core::store::Store;
use chatwarden::plugins::filters::{
    FilterCategory, active_words, add_words, disable_word, list_filters,
};
use tempfile::tempdir;

fn new_store(tmp: &tempfile::TempDir) -> Store {
    let store = Store::new(tmp.path().to_path_buf());
    initialize_moderation_db(&store.root).unwrap();
    store
}

fn w(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_add_is_idempotent() {
    let tmp = tempdir().unwrap();
    let store = new_store(&tmp);

    assert_eq!(add_words(&store, FilterCategory::Spam, &w(&["buy now"])).unwrap(), 1);
    assert_eq!(add_words(&store, FilterCategory::Spam, &w(&["buy now"])).unwrap(), 0);
    assert_eq!(active_words(&store, FilterCategory::Spam).unwrap(), w(&["buy now"]));
}

#[test]
fn test_same_word_allowed_across_categories() {
    let tmp = tempdir().unwrap();
    let store = new_store(&tmp);

    assert_eq!(add_words(&store, FilterCategory::Spam, &w(&["junk"])).unwrap(), 1);
    assert_eq!(add_words(&store, FilterCategory::Profanity, &w(&["junk"])).unwrap(), 1);
}

#[test]
fn test_blank_words_are_skipped() {
    let tmp = tempdir().unwrap();
    let store = new_store(&tmp);

    let added = add_words(&store, FilterCategory::Spam, &w(&["", "  ", "real"])).unwrap();
    assert_eq!(added, 1);
    assert_eq!(active_words(&store, FilterCategory::Spam).unwrap(), w(&["real"]));
}

#[test]
fn test_active_words_preserve_insertion_order() {
    let tmp = tempdir().unwrap();
    let store = new_store(&tmp);

    add_words(&store, FilterCategory::Profanity, &w(&["zzz", "aaa"])).unwrap();
    add_words(&store, FilterCategory::Profanity, &w(&["mmm"])).unwrap();
    assert_eq!(
        active_words(&store, FilterCategory::Profanity).unwrap(),
        w(&["zzz", "aaa", "mmm"])
    );
}

#[test]
fn test_disable_is_soft() {
    let tmp = tempdir().unwrap();
    let store = new_store(&tmp);

    add_words(&store, FilterCategory::Spam, &w(&["buy now", "free money"])).unwrap();
    assert!(disable_word(&store, FilterCategory::Spam, "buy now").unwrap());

    assert_eq!(
        active_words(&store, FilterCategory::Spam).unwrap(),
        w(&["free money"])
    );

    // The row survives, just inactive.
    let all = list_filters(&store, FilterCategory::Spam, true).unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().any(|f| f.word == "buy now" && !f.is_active));

    // Already disabled: no change.
    assert!(!disable_word(&store, FilterCategory::Spam, "buy now").unwrap());
}

#[test]
fn test_disable_missing_word_reports_no_change() {
    let tmp = tempdir().unwrap();
    let store = new_store(&tmp);
    assert!(!disable_word(&store, FilterCategory::Spam, "ghost").unwrap());
}
