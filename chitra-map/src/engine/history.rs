//! Bounded undo and unbounded redo stacks.

use std::collections::VecDeque;

use crate::core::{Cell, RangeReading};

/// Default number of undo entries retained.
pub const MAX_UNDO_HISTORY: usize = 160;

/// Snapshot taken immediately before a reading was applied.
#[derive(Clone, Debug)]
pub struct UndoEntry {
    /// The reading this entry reverses
    pub reading: RangeReading,
    /// Previous value of every cell touched, in application order
    pub prior: Vec<Cell>,
}

/// Undo/redo history.
///
/// The undo stack drops its oldest entry once `capacity` is reached.
#[derive(Debug)]
pub struct History {
    undo: VecDeque<UndoEntry>,
    redo: Vec<RangeReading>,
    capacity: usize,
}

impl History {
    /// Create an empty history holding at most `capacity` undo entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            undo: VecDeque::with_capacity(capacity.min(MAX_UNDO_HISTORY)),
            redo: Vec::new(),
            capacity,
        }
    }

    /// Maximum undo entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Record an applied reading.
    pub fn push_undo(&mut self, entry: UndoEntry) {
        if self.capacity == 0 {
            return;
        }
        while self.undo.len() >= self.capacity {
            self.undo.pop_front();
        }
        self.undo.push_back(entry);
    }

    /// Most recent undo entry.
    pub fn pop_undo(&mut self) -> Option<UndoEntry> {
        self.undo.pop_back()
    }

    /// Queue an undone reading for replay.
    pub fn push_redo(&mut self, reading: RangeReading) {
        self.redo.push(reading);
    }

    /// Most recently undone reading.
    pub fn pop_redo(&mut self) -> Option<RangeReading> {
        self.redo.pop()
    }

    /// Drop pending redo entries.
    pub fn clear_redo(&mut self) {
        self.redo.clear();
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    /// Readings in the undo stack, oldest first.
    pub fn readings(&self) -> impl Iterator<Item = &RangeReading> {
        self.undo.iter().map(|entry| &entry.reading)
    }

    /// Undo entries available.
    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    /// Redo entries available.
    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(MAX_UNDO_HISTORY)
    }
}
