//! Integration tests for the live index against a real store directory.

use std::fs::{self, File};
use std::sync::Arc;
use std::time::Duration;

use passrunner_index::{Entry, EntryIndex, LiveIndex, Relevance, match_entries};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

/// Poll the index until `predicate` holds or the deadline passes.
async fn wait_for(index: &EntryIndex, predicate: impl Fn(&[&str]) -> bool) -> Vec<String> {
    for _ in 0..200 {
        let snapshot = index.current_snapshot().await;
        let ids: Vec<&str> = snapshot.iter().map(Entry::as_str).collect();
        if predicate(&ids) {
            return ids.into_iter().map(String::from).collect();
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    let snapshot = index.current_snapshot().await;
    snapshot.iter().map(|e| e.as_str().to_string()).collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_scenario_store_queries() {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir(temp_dir.path().join("email")).unwrap();
    File::create(temp_dir.path().join("email/work.gpg")).unwrap();
    File::create(temp_dir.path().join("bank.gpg")).unwrap();

    let index = EntryIndex::new(temp_dir.path());
    index.rebuild().await.unwrap();
    let snapshot = index.current_snapshot().await;

    let wor = match_entries(&snapshot, "wor");
    assert_eq!(wor.len(), 1);
    assert_eq!(wor[0].entry, Entry::new("email/work"));
    assert_eq!(wor[0].relevance, Relevance::Partial);

    let bank = match_entries(&snapshot, "bank");
    assert_eq!(bank.len(), 1);
    assert_eq!(bank[0].relevance, Relevance::Exact);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_watcher_picks_up_changes() {
    let temp_dir = TempDir::new().unwrap();
    File::create(temp_dir.path().join("bank.gpg")).unwrap();

    let index = Arc::new(EntryIndex::new(temp_dir.path()));
    let live = LiveIndex::spawn(index.clone()).await.unwrap();
    assert_eq!(index.current_snapshot().await.len(), 1);

    File::create(temp_dir.path().join("mail.gpg")).unwrap();
    let ids = wait_for(&index, |ids| ids.contains(&"mail")).await;
    assert_eq!(ids, vec!["bank", "mail"]);

    fs::remove_file(temp_dir.path().join("bank.gpg")).unwrap();
    let ids = wait_for(&index, |ids| !ids.contains(&"bank")).await;
    assert_eq!(ids, vec!["mail"]);

    live.shutdown();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_watcher_follows_new_directories() {
    let temp_dir = TempDir::new().unwrap();

    let index = Arc::new(EntryIndex::new(temp_dir.path()));
    let live = LiveIndex::spawn(index.clone()).await.unwrap();
    assert!(index.current_snapshot().await.is_empty());

    fs::create_dir_all(temp_dir.path().join("social")).unwrap();
    File::create(temp_dir.path().join("social/forum.gpg")).unwrap();
    let ids = wait_for(&index, |ids| ids.contains(&"social/forum")).await;
    assert_eq!(ids, vec!["social/forum"]);

    // The new directory is watched, so later changes inside it are seen too.
    File::create(temp_dir.path().join("social/chat.gpg")).unwrap();
    let ids = wait_for(&index, |ids| ids.contains(&"social/chat")).await;
    assert_eq!(ids, vec!["social/chat", "social/forum"]);

    live.shutdown();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_store_recreated_after_removal() {
    let temp_dir = TempDir::new().unwrap();
    let store = temp_dir.path().join("store");
    fs::create_dir(&store).unwrap();
    File::create(store.join("bank.gpg")).unwrap();

    let index = Arc::new(EntryIndex::new(&store));
    let live = LiveIndex::spawn(index.clone()).await.unwrap();
    assert_eq!(index.current_snapshot().await.len(), 1);

    fs::remove_dir_all(&store).unwrap();
    let ids = wait_for(&index, |ids| ids.is_empty()).await;
    assert!(ids.is_empty());

    fs::create_dir(&store).unwrap();
    File::create(store.join("bank.gpg")).unwrap();
    let ids = wait_for(&index, |ids| ids.contains(&"bank")).await;
    assert_eq!(ids, vec!["bank"]);

    live.shutdown();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_store_created_after_start() {
    let temp_dir = TempDir::new().unwrap();
    let store = temp_dir.path().join("store");

    let index = Arc::new(EntryIndex::new(&store));
    let live = LiveIndex::spawn(index.clone()).await.unwrap();
    assert!(index.current_snapshot().await.is_empty());

    fs::create_dir_all(store.join("email")).unwrap();
    File::create(store.join("email/work.gpg")).unwrap();
    let ids = wait_for(&index, |ids| ids.contains(&"email/work")).await;
    assert_eq!(ids, vec!["email/work"]);

    live.shutdown();
}
