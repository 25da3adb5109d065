// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Second-order transition table keyed by pitch pairs.
//!
//! Each context (the two most recent pitches) maps to every event that was
//! observed to follow it, duplicates included. Sampling uniformly from that
//! list reproduces the empirical conditional distribution.

use std::collections::BTreeMap;
use std::fmt;

use super::event::{EventSequence, NoteEvent, MIN_MODEL_EVENTS};

/// The two most recent pitches, used as the chain state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Context {
    /// Pitch before the current one
    pub previous: u8,
    /// Most recent pitch
    pub current: u8,
}

impl Context {
    /// Create a new context
    pub fn new(previous: u8, current: u8) -> Self {
        Self { previous, current }
    }

    /// Context of a consecutive event pair
    pub fn of(previous: &NoteEvent, current: &NoteEvent) -> Self {
        Self::new(previous.pitch, current.pitch)
    }

    /// Shift in the next pitch
    pub fn advance(self, next: u8) -> Self {
        Self::new(self.current, next)
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.previous, self.current)
    }
}

/// Mapping from context to the events observed after it
///
/// Keys are kept ordered so that walking the table is reproducible.
/// Every stored candidate list is non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionTable {
    transitions: BTreeMap<Context, Vec<NoteEvent>>,
}

impl TransitionTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `event` followed `context`
    pub fn observe(&mut self, context: Context, event: NoteEvent) {
        self.transitions.entry(context).or_default().push(event);
    }

    /// Events observed after `context`, in observation order
    pub fn candidates(&self, context: &Context) -> Option<&[NoteEvent]> {
        self.transitions.get(context).map(Vec::as_slice)
    }

    /// Number of distinct contexts
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    /// Check if the table has no contexts
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Total number of recorded transitions
    pub fn observation_count(&self) -> usize {
        self.transitions.values().map(Vec::len).sum()
    }

    /// Contexts in key order
    pub fn contexts(&self) -> impl Iterator<Item = &Context> {
        self.transitions.keys()
    }

    /// Context/candidate pairs in key order
    pub fn iter(&self) -> impl Iterator<Item = (&Context, &[NoteEvent])> {
        self.transitions.iter().map(|(c, e)| (c, e.as_slice()))
    }
}

/// Build the transition table for a sequence
///
/// Returns `None` when the sequence has fewer than three events, since no
/// context can be followed by an event.
pub fn train(sequence: &EventSequence) -> Option<TransitionTable> {
    if sequence.len() < MIN_MODEL_EVENTS {
        return None;
    }

    let mut table = TransitionTable::new();
    for window in sequence.events().windows(3) {
        table.observe(Context::of(&window[0], &window[1]), window[2]);
    }
    Some(table)
}
