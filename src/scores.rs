//! Score, best score and bonus tally bookkeeping
//!
//! The bonus tally is split in two: `pending` collects bonuses earned since
//! the last safe landing, `committed` is what has been banked and persisted.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::persistence::{KeyValueStore, keys, load_json, save_json};

/// Kinds of bonus the player can earn
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BonusKind {
    /// Stick tip landed inside the perfect zone
    Perfect,
    /// Bonus item picked up while hanging under the stick
    Collectible,
}

impl BonusKind {
    pub const ALL: [BonusKind; 2] = [BonusKind::Perfect, BonusKind::Collectible];

    /// Key under which the kind is persisted
    pub fn key(self) -> &'static str {
        match self {
            BonusKind::Perfect => "perfect",
            BonusKind::Collectible => "collectible",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.key() == key)
    }
}

/// Per-kind counters
pub type TallyMap = BTreeMap<BonusKind, u32>;

/// Committed + pending bonus counts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BonusTally {
    committed: TallyMap,
    pending: TallyMap,
    /// Saved counts under kinds this build does not know; written back untouched
    #[serde(default)]
    foreign: BTreeMap<String, u32>,
}

impl BonusTally {
    /// Same banked counts with nothing pending, for the next run
    pub fn banked(&self) -> Self {
        Self {
            committed: self.committed.clone(),
            pending: TallyMap::new(),
            foreign: self.foreign.clone(),
        }
    }

    pub fn add_pending(&mut self, kind: BonusKind) -> u32 {
        let count = self.pending.entry(kind).or_insert(0);
        *count += 1;
        *count
    }

    /// Merge pending into committed. Returns true if anything moved.
    pub fn commit(&mut self) -> bool {
        if self.pending.is_empty() {
            return false;
        }
        for (kind, count) in std::mem::take(&mut self.pending) {
            *self.committed.entry(kind).or_insert(0) += count;
        }
        true
    }

    /// Throw pending away. Returns true if anything was dropped.
    pub fn discard_pending(&mut self) -> bool {
        let dropped = !self.pending.is_empty();
        self.pending.clear();
        dropped
    }

    pub fn committed(&self, kind: BonusKind) -> u32 {
        self.committed.get(&kind).copied().unwrap_or(0)
    }

    pub fn pending(&self, kind: BonusKind) -> u32 {
        self.pending.get(&kind).copied().unwrap_or(0)
    }

    /// Load the committed tally. Absent or unreadable data yields an empty tally.
    ///
    /// Unknown kinds are kept aside so a save does not drop them.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let stored = match load_json::<BTreeMap<String, u32>>(store, keys::BONUS_TALLY) {
            Ok(Some(stored)) => stored,
            Ok(None) => return Self::default(),
            Err(e) => {
                log::warn!("Ignoring stored bonus tally: {}", e);
                return Self::default();
            }
        };

        let mut tally = Self::default();
        for (key, count) in stored {
            match BonusKind::from_key(&key) {
                Some(kind) => {
                    tally.committed.insert(kind, count);
                }
                None => {
                    log::warn!("Keeping unknown bonus kind {:?} ({})", key, count);
                    tally.foreign.insert(key, count);
                }
            }
        }
        log::info!("Loaded bonus tally: {:?}", tally.committed);
        tally
    }

    /// Persist the committed tally as a flat `kind -> count` object
    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StoreError> {
        let mut flat = self.foreign.clone();
        for (kind, count) in &self.committed {
            flat.insert(kind.key().to_owned(), *count);
        }
        save_json(store, keys::BONUS_TALLY, &flat)
    }
}

/// Run score and best score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBoard {
    score: u32,
    best_score: u32,
}

impl ScoreBoard {
    pub fn with_best(best_score: u32) -> Self {
        Self {
            score: 0,
            best_score,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    /// Add one point and return the new score
    pub fn increment(&mut self) -> u32 {
        self.score = self.score.saturating_add(1);
        self.score
    }

    /// Fold the run score into the best score. Returns true on a new best.
    pub fn finish_run(&mut self) -> bool {
        if self.score > self.best_score {
            self.best_score = self.score;
            log::info!("New best score: {}", self.best_score);
            return true;
        }
        false
    }

    pub fn load_best(store: &dyn KeyValueStore) -> u32 {
        match load_json::<u32>(store, keys::BEST_SCORE) {
            Ok(best) => best.unwrap_or(0),
            Err(e) => {
                log::warn!("Ignoring stored best score: {}", e);
                0
            }
        }
    }

    pub fn save_best(&self, store: &mut dyn KeyValueStore) -> Result<(), StoreError> {
        save_json(store, keys::BEST_SCORE, &self.best_score)
    }
}
