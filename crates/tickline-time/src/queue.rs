//! Pending snapshot queue

use tickline_core::{TickId, WorldSnapshot};

/// What happened to a fed snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedOutcome {
    /// Waiting to be stepped into
    Queued,
    /// Tick already consumed; dropped
    Stale,
    /// Tick already queued; the first arrival is kept
    Duplicate,
}

/// Snapshots waiting to be played, unique by tick id
///
/// Kept sorted by descending tick id so the lowest tick sits at the tail.
#[derive(Debug, Default)]
pub struct SnapshotQueue {
    entries: Vec<WorldSnapshot>,
}

impl SnapshotQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert in order; a tick that is already queued is rejected
    pub fn insert(&mut self, snapshot: WorldSnapshot) -> FeedOutcome {
        let tick_id = snapshot.tick_id();
        match self
            .entries
            .binary_search_by(|probe| tick_id.cmp(&probe.tick_id()))
        {
            Ok(_) => FeedOutcome::Duplicate,
            Err(pos) => {
                self.entries.insert(pos, snapshot);
                FeedOutcome::Queued
            }
        }
    }

    /// Remove the snapshot with the lowest tick id
    pub fn pop_lowest(&mut self) -> Option<WorldSnapshot> {
        self.entries.pop()
    }

    /// Lowest queued tick id
    pub fn lowest_tick(&self) -> Option<TickId> {
        self.entries.last().map(|s| s.tick_id())
    }

    /// Highest queued tick id
    pub fn highest_tick(&self) -> Option<TickId> {
        self.entries.first().map(|s| s.tick_id())
    }

    /// Drop lowest ticks until at most `max` remain.
    /// Returns how many snapshots were dropped.
    pub fn trim(&mut self, max: usize) -> usize {
        let mut dropped = 0;
        while self.entries.len() > max {
            self.pop_lowest();
            dropped += 1;
        }
        dropped
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
