//! High scores and preferences persisted through the JSON file store.

use snake::core::constants::{HIGH_SCORES_KEY, LEGACY_HIGH_SCORE_KEY, MUTED_KEY};
use snake::core::Difficulty;
use snake::preferences::Preferences;
use snake::scores::{HighScoreTable, ScoreTracker};
use snake::store::{JsonFileStore, KeyValueStore};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn read_file(path: &Path) -> BTreeMap<String, String> {
    let json = fs::read_to_string(path).unwrap();
    serde_json::from_str(&json).unwrap()
}

#[test]
fn test_records_survive_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.json");

    let mut tracker = ScoreTracker::load(Box::new(JsonFileStore::at(&path)));
    assert_eq!(tracker.table(), HighScoreTable::default());
    assert!(tracker.record_score(Difficulty::Easy, 3));
    assert!(tracker.record_score(Difficulty::Easy, 5));
    assert!(!tracker.record_score(Difficulty::Easy, 2));
    assert!(tracker.record_score(Difficulty::Hard, 1));

    let reloaded = ScoreTracker::load(Box::new(JsonFileStore::at(&path)));
    assert_eq!(
        reloaded.table(),
        HighScoreTable {
            easy: 5,
            medium: 0,
            hard: 1
        }
    );

    let raw = read_file(&path);
    let table: HighScoreTable = serde_json::from_str(&raw[HIGH_SCORES_KEY]).unwrap();
    assert_eq!(table.easy, 5);
}

#[test]
fn test_legacy_file_is_migrated() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.json");
    fs::write(&path, r#"{"high_score":"14","muted":"true"}"#).unwrap();

    let tracker = ScoreTracker::load(Box::new(JsonFileStore::at(&path)));
    assert_eq!(tracker.best(Difficulty::Easy), 14);
    assert_eq!(tracker.best(Difficulty::Medium), 0);

    let raw = read_file(&path);
    assert!(!raw.contains_key(LEGACY_HIGH_SCORE_KEY));
    assert!(raw.contains_key(HIGH_SCORES_KEY));
    assert_eq!(raw.get(MUTED_KEY).map(String::as_str), Some("true"));
}

#[test]
fn test_scores_and_preferences_share_one_file() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::at(dir.path().join("store.json"));

    let mut tracker = ScoreTracker::load(Box::new(store.clone()));
    let mut prefs = Preferences::load(Box::new(store.clone()));

    assert!(prefs.toggle_mute());
    assert!(tracker.record_score(Difficulty::Medium, 8));

    assert!(Preferences::load(Box::new(store.clone())).muted());
    assert_eq!(
        ScoreTracker::load(Box::new(store.clone())).best(Difficulty::Medium),
        8
    );
    assert_eq!(store.get(MUTED_KEY).unwrap().as_deref(), Some("true"));
}

#[test]
fn test_corrupt_file_starts_from_zero_and_recovers() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.json");
    fs::write(&path, "{{{{ definitely not json").unwrap();

    let mut tracker = ScoreTracker::load(Box::new(JsonFileStore::at(&path)));
    assert_eq!(tracker.table(), HighScoreTable::default());
    assert!(!Preferences::load(Box::new(JsonFileStore::at(&path))).muted());

    assert!(tracker.record_score(Difficulty::Hard, 2));
    let reloaded = ScoreTracker::load(Box::new(JsonFileStore::at(&path)));
    assert_eq!(reloaded.best(Difficulty::Hard), 2);
}

#[test]
fn test_missing_directory_is_created_on_write() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("deeper").join("store.json");

    let mut tracker = ScoreTracker::load(Box::new(JsonFileStore::at(&path)));
    assert!(tracker.record_score(Difficulty::Easy, 1));
    assert!(path.exists());
}
