//! Per-difficulty best scores backed by a [`KeyValueStore`].

use crate::core::constants::{HIGH_SCORES_KEY, LEGACY_HIGH_SCORE_KEY};
use crate::core::types::Difficulty;
use crate::store::{KeyValueStore, StoreError};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Best score for each difficulty. Missing entries deserialize as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighScoreTable {
    pub easy: u32,
    pub medium: u32,
    pub hard: u32,
}

impl HighScoreTable {
    pub fn get(&self, difficulty: Difficulty) -> u32 {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
        }
    }

    fn slot_mut(&mut self, difficulty: Difficulty) -> &mut u32 {
        match difficulty {
            Difficulty::Easy => &mut self.easy,
            Difficulty::Medium => &mut self.medium,
            Difficulty::Hard => &mut self.hard,
        }
    }

    /// (difficulty, best) in display order.
    pub fn entries(&self) -> [(Difficulty, u32); 3] {
        Difficulty::ALL.map(|d| (d, self.get(d)))
    }
}

/// Keeps the table in memory and writes it through on every new record.
pub struct ScoreTracker {
    table: HighScoreTable,
    store: Box<dyn KeyValueStore>,
}

impl ScoreTracker {
    /// Read the table, falling back to zeros on absent or malformed data.
    /// A legacy single high score is moved into the easy slot.
    pub fn load(mut store: Box<dyn KeyValueStore>) -> Self {
        let table = match store.get(HIGH_SCORES_KEY) {
            Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_else(|e| {
                warn!(error = %e, "malformed high score table, starting from zero");
                HighScoreTable::default()
            }),
            Ok(None) => migrate_legacy(store.as_mut()),
            Err(e) => {
                warn!(error = %e, "could not read high scores, starting from zero");
                HighScoreTable::default()
            }
        };
        Self { table, store }
    }

    pub fn table(&self) -> HighScoreTable {
        self.table
    }

    pub fn best(&self, difficulty: Difficulty) -> u32 {
        self.table.get(difficulty)
    }

    /// Store `score` if it beats the current best. Returns whether it did.
    pub fn record_score(&mut self, difficulty: Difficulty, score: u32) -> bool {
        let slot = self.table.slot_mut(difficulty);
        if score <= *slot {
            return false;
        }
        *slot = score;
        info!(difficulty = difficulty.key(), score, "new high score");
        if let Err(e) = self.persist() {
            warn!(error = %e, "failed to save high scores");
        }
        true
    }

    fn persist(&mut self) -> Result<(), StoreError> {
        let json = serde_json::to_string(&self.table)?;
        self.store.set(HIGH_SCORES_KEY, &json)
    }
}

fn migrate_legacy(store: &mut dyn KeyValueStore) -> HighScoreTable {
    let mut table = HighScoreTable::default();
    let raw = match store.get(LEGACY_HIGH_SCORE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return table,
        Err(e) => {
            warn!(error = %e, "could not read legacy high score");
            return table;
        }
    };

    match raw.trim().parse::<u32>() {
        Ok(score) => {
            table.easy = score;
            let migrated = serde_json::to_string(&table)
                .map_err(StoreError::from)
                .and_then(|json| store.set(HIGH_SCORES_KEY, &json))
                .and_then(|()| store.remove(LEGACY_HIGH_SCORE_KEY));
            match migrated {
                Ok(()) => info!(score, "migrated legacy high score to easy"),
                Err(e) => warn!(error = %e, "failed to migrate legacy high score"),
            }
        }
        Err(e) => warn!(value = %raw, error = %e, "ignoring unreadable legacy high score"),
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn tracker_with(store: &MemoryStore) -> ScoreTracker {
        ScoreTracker::load(Box::new(store.clone()))
    }

    #[test]
    fn test_record_scenario() {
        let store = MemoryStore::with_entries([(HIGH_SCORES_KEY, r#"{"easy":3,"medium":0,"hard":0}"#)]);
        let mut tracker = tracker_with(&store);
        assert_eq!(tracker.best(Difficulty::Easy), 3);

        assert!(tracker.record_score(Difficulty::Easy, 5));
        assert_eq!(tracker.best(Difficulty::Easy), 5);

        assert!(!tracker.record_score(Difficulty::Easy, 2));
        assert_eq!(tracker.best(Difficulty::Easy), 5);
    }

    #[test]
    fn test_equal_score_is_not_a_record() {
        let store = MemoryStore::new();
        let mut tracker = tracker_with(&store);
        assert!(tracker.record_score(Difficulty::Hard, 4));
        assert!(!tracker.record_score(Difficulty::Hard, 4));
    }

    #[test]
    fn test_zero_never_records_on_empty_table() {
        let store = MemoryStore::new();
        let mut tracker = tracker_with(&store);
        assert!(!tracker.record_score(Difficulty::Medium, 0));
        assert!(!store.contains_key(HIGH_SCORES_KEY));
    }

    #[test]
    fn test_record_is_persisted() {
        let store = MemoryStore::new();
        let mut tracker = tracker_with(&store);
        tracker.record_score(Difficulty::Medium, 9);

        let reloaded = tracker_with(&store);
        assert_eq!(reloaded.best(Difficulty::Medium), 9);
        assert_eq!(reloaded.best(Difficulty::Easy), 0);
    }

    #[test]
    fn test_difficulties_are_independent() {
        let store = MemoryStore::new();
        let mut tracker = tracker_with(&store);
        tracker.record_score(Difficulty::Hard, 12);
        assert_eq!(tracker.best(Difficulty::Easy), 0);
        assert!(tracker.record_score(Difficulty::Easy, 1));
        assert_eq!(
            tracker.table(),
            HighScoreTable {
                easy: 1,
                medium: 0,
                hard: 12
            }
        );
    }

    #[test]
    fn test_malformed_table_falls_back_to_zero() {
        let store = MemoryStore::with_entries([(HIGH_SCORES_KEY, "not json at all")]);
        let tracker = tracker_with(&store);
        assert_eq!(tracker.table(), HighScoreTable::default());
    }

    #[test]
    fn test_negative_scores_are_malformed() {
        let store = MemoryStore::with_entries([(HIGH_SCORES_KEY, r#"{"easy":-4}"#)]);
        let tracker = tracker_with(&store);
        assert_eq!(tracker.table(), HighScoreTable::default());
    }

    #[test]
    fn test_partial_table_fills_missing_with_zero() {
        let store = MemoryStore::with_entries([(HIGH_SCORES_KEY, r#"{"hard":7}"#)]);
        let tracker = tracker_with(&store);
        assert_eq!(tracker.best(Difficulty::Hard), 7);
        assert_eq!(tracker.best(Difficulty::Easy), 0);
        assert_eq!(tracker.best(Difficulty::Medium), 0);
    }

    #[test]
    fn test_legacy_score_migrates_to_easy() {
        let store = MemoryStore::with_entries([(LEGACY_HIGH_SCORE_KEY, "11")]);
        let tracker = tracker_with(&store);

        assert_eq!(tracker.best(Difficulty::Easy), 11);
        assert!(!store.contains_key(LEGACY_HIGH_SCORE_KEY));
        assert!(store.contains_key(HIGH_SCORES_KEY));
        assert_eq!(tracker_with(&store).best(Difficulty::Easy), 11);
    }

    #[test]
    fn test_unreadable_legacy_score_is_ignored() {
        let store = MemoryStore::with_entries([(LEGACY_HIGH_SCORE_KEY, "eleven")]);
        let tracker = tracker_with(&store);
        assert_eq!(tracker.table(), HighScoreTable::default());
    }

    #[test]
    fn test_legacy_score_with_trailing_text_is_ignored() {
        let store = MemoryStore::with_entries([(LEGACY_HIGH_SCORE_KEY, "12abc")]);
        let tracker = tracker_with(&store);
        assert_eq!(tracker.best(Difficulty::Easy), 0);
        assert!(!store.contains_key(HIGH_SCORES_KEY));
    }

    #[test]
    fn test_table_entries_order() {
        let table = HighScoreTable {
            easy: 1,
            medium: 2,
            hard: 3,
        };
        assert_eq!(
            table.entries(),
            [
                (Difficulty::Easy, 1),
                (Difficulty::Medium, 2),
                (Difficulty::Hard, 3)
            ]
        );
    }
}
