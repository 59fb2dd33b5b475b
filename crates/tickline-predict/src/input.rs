//! Local input queue

use std::collections::VecDeque;

use tickline_core::Event;

/// Pending local events, most recent at the back
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<Event>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, event: Event) {
        self.events.push_back(event);
    }

    /// Most recently fed event, left in the queue
    pub fn latest(&self) -> Option<&Event> {
        self.events.back()
    }

    pub fn pop_latest(&mut self) -> Option<Event> {
        self.events.pop_back()
    }

    /// Pop from the most recent end until at most `max` remain.
    /// Returns how many events were dropped.
    pub fn trim(&mut self, max: usize) -> usize {
        let mut dropped = 0;
        while self.events.len() > max {
            self.pop_latest();
            dropped += 1;
        }
        dropped
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
