//! Prediction history

use std::collections::VecDeque;
use std::sync::Arc;

use tickline_core::{Event, WorldSnapshot};

/// Predicted ticks: the event applied and the world it produced
#[derive(Debug)]
pub struct PredictionHistory {
    entries: VecDeque<(Event, Arc<WorldSnapshot>)>,
    capacity: usize,
}

impl PredictionHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    /// Record a predicted tick, dropping the oldest past capacity
    pub fn push(&mut self, event: Event, world: Arc<WorldSnapshot>) {
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back((event, world));
    }

    pub fn last(&self) -> Option<&(Event, Arc<WorldSnapshot>)> {
        self.entries.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Event, Arc<WorldSnapshot>)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
