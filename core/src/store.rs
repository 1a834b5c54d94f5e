use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::*;

/// Key holding the snapshot of the game in progress.
pub const SESSION_KEY: &str = "trapgrid.session";

/// Key holding every recorded victory.
pub const LEADERBOARD_KEY: &str = "trapgrid.leaderboard";

/// String key/value storage provided by the host environment, such as browser local storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> core::result::Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: String) -> core::result::Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> core::result::Result<(), StoreError>;
}

/// In-memory store; clones share the same entries.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> core::result::Result<Option<String>, StoreError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> core::result::Result<(), StoreError> {
        self.entries.borrow_mut().insert(key.into(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> core::result::Result<(), StoreError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Saved game snapshots on top of a [`KeyValueStore`]. Failures are logged, never returned.
pub trait SnapshotStore {
    /// The stored session for `config`, `None` when missing, unreadable or from another puzzle.
    fn load_session(&self, config: &PuzzleConfig) -> Option<Session>;
    fn save_session(&mut self, session: &Session);
    fn clear_session(&mut self);
}

fn read_session(
    store: &(impl KeyValueStore + ?Sized),
    config: &PuzzleConfig,
) -> core::result::Result<Option<Session>, StoreError> {
    let Some(raw) = store.get(SESSION_KEY)? else {
        return Ok(None);
    };
    let session: Session = serde_json::from_str(&raw)?;
    session.validate_for(config)?;
    Ok(Some(session))
}

impl<S: KeyValueStore + ?Sized> SnapshotStore for S {
    fn load_session(&self, config: &PuzzleConfig) -> Option<Session> {
        match read_session(self, config) {
            Ok(session) => session,
            Err(err) => {
                log::warn!("Discarding saved game: {}", err);
                None
            }
        }
    }

    fn save_session(&mut self, session: &Session) {
        let result = serde_json::to_string(session)
            .map_err(StoreError::from)
            .and_then(|raw| self.set(SESSION_KEY, raw));
        if let Err(err) = result {
            log::error!("Could not save game: {}", err);
        }
    }

    fn clear_session(&mut self) {
        if let Err(err) = self.remove(SESSION_KEY) {
            log::error!("Could not clear saved game: {}", err);
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEntry {
    pub shape_set_id: String,
    pub score: u32,
    /// Unix timestamp in seconds.
    pub timestamp: u64,
}

/// Append-only list of victories. Lower scores are better.
pub trait Leaderboard {
    fn scores(&self) -> Vec<ScoreEntry>;
    fn record_score(&mut self, entry: ScoreEntry);

    /// Best score of each shape set, best first.
    fn best_scores(&self) -> Vec<ScoreEntry> {
        let mut best: HashMap<String, ScoreEntry> = HashMap::new();
        for entry in self.scores() {
            match best.get(&entry.shape_set_id) {
                Some(current) if current.score <= entry.score => {}
                _ => {
                    best.insert(entry.shape_set_id.clone(), entry);
                }
            }
        }
        let mut best: Vec<ScoreEntry> = best.into_values().collect();
        best.sort_by(|a, b| {
            a.score
                .cmp(&b.score)
                .then_with(|| a.shape_set_id.cmp(&b.shape_set_id))
        });
        best
    }
}

fn read_scores(
    store: &(impl KeyValueStore + ?Sized),
) -> core::result::Result<Vec<ScoreEntry>, StoreError> {
    match store.get(LEADERBOARD_KEY)? {
        Some(raw) => Ok(serde_json::from_str(&raw)?),
        None => Ok(Vec::new()),
    }
}

impl<S: KeyValueStore + ?Sized> Leaderboard for S {
    fn scores(&self) -> Vec<ScoreEntry> {
        read_scores(self).unwrap_or_else(|err| {
            log::warn!("Could not read leaderboard: {}", err);
            Vec::new()
        })
    }

    fn record_score(&mut self, entry: ScoreEntry) {
        let mut scores = self.scores();
        scores.push(entry);
        let result = serde_json::to_string(&scores)
            .map_err(StoreError::from)
            .and_then(|raw| self.set(LEADERBOARD_KEY, raw));
        if let Err(err) = result {
            log::error!("Could not record score: {}", err);
        }
    }
}
