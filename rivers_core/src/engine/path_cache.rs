use crate::engine::distance::PathResult;
use crate::logic::board::{Player, Position};
use std::collections::HashMap;

/// Everything a shortest-path answer depends on. The board signature covers
/// the whole grid, so two different boards never share an entry.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PathKey {
    pub signature: u64,
    pub start: Position,
    pub goals: Vec<Position>,
    pub use_rivers: bool,
    pub player: Player,
}

/// Memo of Distance Oracle results, owned by whoever drives the search and
/// passed down by reference.
#[derive(Debug, Default)]
pub struct PathCache {
    entries: HashMap<PathKey, PathResult>,
    hits: u64,
    misses: u64,
}

impl PathCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn probe(&mut self, key: &PathKey) -> Option<PathResult> {
        let found = self.entries.get(key).cloned();
        if found.is_some() {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        found
    }

    pub fn store(&mut self, key: PathKey, result: PathResult) {
        self.entries.insert(key, result);
    }

    /// Drops every entry. Called after each applied move; counters survive.
    pub fn invalidate(&mut self) {
        self.entries.clear();
    }

    pub const fn hits(&self) -> u64 {
        self.hits
    }

    pub const fn misses(&self) -> u64 {
        self.misses
    }

    pub fn reset_counters(&mut self) {
        self.hits = 0;
        self.misses = 0;
    }
}
