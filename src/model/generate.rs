// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Sequence generation by walking a trained transition table.
//!
//! Known contexts sample uniformly among their observed followers. A context
//! that never occurred in training falls back to a uniformly chosen context
//! and takes the first event recorded for it. Timing and velocity are copied
//! verbatim from whichever event is chosen.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use super::chain::{Context, TransitionTable};
use super::event::{EventSequence, NoteEvent};
use super::ModelError;

/// How a generated event was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// Sampled from the current context's candidates
    Observed(NoteEvent),
    /// Taken from a random context after the current one was unseen
    Fallback(NoteEvent),
}

impl Step {
    fn event(self) -> NoteEvent {
        match self {
            Step::Observed(event) | Step::Fallback(event) => event,
        }
    }
}

/// Generates new sequences from a trained table
///
/// Construction fails with [`ModelError::EmptyModel`] if the table has no
/// contexts, so the fallback always has somewhere to go.
#[derive(Debug, Clone)]
pub struct SequenceGenerator {
    table: TransitionTable,
    /// First candidate of each context, in key order
    fallback_pool: Vec<NoteEvent>,
}

impl SequenceGenerator {
    /// Take ownership of a table for generation
    pub fn new(table: TransitionTable) -> Result<Self, ModelError> {
        if table.is_empty() {
            return Err(ModelError::EmptyModel);
        }

        let fallback_pool = table
            .iter()
            .filter_map(|(_, candidates)| candidates.first().copied())
            .collect();

        Ok(Self {
            table,
            fallback_pool,
        })
    }

    /// The table being walked
    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    /// Generate `length` events after the two seed events
    ///
    /// The output holds the seed verbatim followed by the generated events,
    /// `length + 2` in total. Output is fully determined by `rng`.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        seed: (NoteEvent, NoteEvent),
        length: usize,
        rng: &mut R,
    ) -> EventSequence {
        let mut output = EventSequence::with_capacity(length + 2);
        output.push(seed.0);
        output.push(seed.1);

        let mut context = Context::of(&seed.0, &seed.1);
        let mut fallbacks = 0usize;

        for _ in 0..length {
            let step = self.next_step(&context, rng);
            if matches!(step, Step::Fallback(_)) {
                fallbacks += 1;
            }

            let event = step.event();
            output.push(event);
            context = context.advance(event.pitch);
        }

        debug!(
            generated = length,
            fallbacks,
            contexts = self.table.len(),
            "generated sequence"
        );
        output
    }

    fn next_step<R: Rng + ?Sized>(&self, context: &Context, rng: &mut R) -> Step {
        match self
            .table
            .candidates(context)
            .and_then(|candidates| candidates.choose(rng))
        {
            Some(event) => Step::Observed(*event),
            None => {
                let index = rng.gen_range(0..self.fallback_pool.len());
                Step::Fallback(self.fallback_pool[index])
            }
        }
    }
}
