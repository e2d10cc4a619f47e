//! Bounded log of recently recommended items, used by the exploration branch
//! to steer away from what the user has just been shown.

use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct HistoryTracker {
    entries: VecDeque<String>,
    capacity: usize,
}

impl HistoryTracker {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append `items` in order, keeping only the most recent `capacity` entries.
    pub fn record<I, S>(&mut self, items: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for item in items {
            self.entries.push_back(item.into());
        }
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.entries.iter().any(|e| e == item_id)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
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

    /// Oldest first.
    pub fn entries(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }
}
