// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Note events and ordered event sequences.

use super::ModelError;
use crate::analysis::PitchClass;

/// Minimum number of events needed to train or analyze
pub const MIN_MODEL_EVENTS: usize = 3;

/// A single note onset taken from a source piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoteEvent {
    /// MIDI note number (0-127)
    pub pitch: u8,
    /// Ticks since the previous event
    pub delta: u32,
    /// Velocity (1-127)
    pub velocity: u8,
}

impl NoteEvent {
    /// Create a new note event
    pub fn new(pitch: u8, delta: u32, velocity: u8) -> Self {
        Self {
            pitch,
            delta,
            velocity,
        }
    }

    /// Pitch class of this event's note
    pub fn pitch_class(&self) -> PitchClass {
        PitchClass::from_pitch(self.pitch)
    }
}

impl From<(u8, u32, u8)> for NoteEvent {
    fn from((pitch, delta, velocity): (u8, u32, u8)) -> Self {
        Self::new(pitch, delta, velocity)
    }
}

/// Note events in temporal order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventSequence {
    events: Vec<NoteEvent>,
}

impl EventSequence {
    /// Create an empty sequence
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty sequence with room for `capacity` events
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Vec::with_capacity(capacity),
        }
    }

    /// Append an event
    pub fn push(&mut self, event: NoteEvent) {
        self.events.push(event);
    }

    /// Number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the sequence has no events
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events as a slice
    pub fn events(&self) -> &[NoteEvent] {
        &self.events
    }

    /// Iterate over events
    pub fn iter(&self) -> std::slice::Iter<'_, NoteEvent> {
        self.events.iter()
    }

    /// The first two events, used as the default generation seed
    pub fn opening_pair(&self) -> Option<(NoteEvent, NoteEvent)> {
        match self.events.as_slice() {
            [first, second, ..] => Some((*first, *second)),
            _ => None,
        }
    }

    /// Pitches in order
    pub fn pitches(&self) -> Vec<u8> {
        self.events.iter().map(|e| e.pitch).collect()
    }

    /// Pitch classes in order
    pub fn pitch_classes(&self) -> Vec<PitchClass> {
        self.events.iter().map(NoteEvent::pitch_class).collect()
    }

    /// Reject sequences too short to model
    pub fn ensure_modelable(&self) -> Result<(), ModelError> {
        if self.events.len() < MIN_MODEL_EVENTS {
            return Err(ModelError::InsufficientData {
                len: self.events.len(),
            });
        }
        Ok(())
    }
}

impl From<Vec<NoteEvent>> for EventSequence {
    fn from(events: Vec<NoteEvent>) -> Self {
        Self { events }
    }
}

impl FromIterator<NoteEvent> for EventSequence {
    fn from_iter<I: IntoIterator<Item = NoteEvent>>(iter: I) -> Self {
        Self {
            events: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a EventSequence {
    type Item = &'a NoteEvent;
    type IntoIter = std::slice::Iter<'a, NoteEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
