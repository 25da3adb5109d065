// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Pitch-class transition analysis.
//!
//! This module provides:
//! - Pitch class definitions in canonical chromatic order
//! - The column-stochastic pitch-class transition matrix
//! - Stationary distribution estimation by power iteration
//! - Summaries of dominant pitch classes and typical transitions

pub mod matrix;
pub mod pitch_class;
pub mod stationary;

pub use matrix::{PitchClassMatrix, TransitionCounts};
pub use pitch_class::{PitchClass, PITCH_CLASS_COUNT};
pub use stationary::{
    stationary_distribution, Convergence, PowerIteration, StationaryVector, DEFAULT_ITERATIONS,
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{EventSequence, ModelError};

/// A strong `origin -> destination` move between pitch classes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub origin: PitchClass,
    pub destination: PitchClass,
    /// Probability of `destination` given `origin`
    pub weight: f64,
}

/// Matrix and stationary distribution for one piece
#[derive(Debug, Clone)]
pub struct PitchClassAnalysis {
    /// Pitch classes of the piece in order
    pub pitch_classes: Vec<PitchClass>,
    /// Raw transition counts
    pub counts: TransitionCounts,
    /// Column-normalized transition matrix
    pub matrix: PitchClassMatrix,
    /// Power iteration result
    pub convergence: Convergence,
}

impl PitchClassAnalysis {
    /// Analyze a sequence
    ///
    /// Sequences shorter than three events are rejected.
    pub fn analyze(sequence: &EventSequence, runner: &PowerIteration) -> Result<Self, ModelError> {
        sequence.ensure_modelable()?;

        let pitch_classes = sequence.pitch_classes();
        let counts = TransitionCounts::from_pitch_classes(&pitch_classes);
        let matrix = PitchClassMatrix::from_counts(&counts);
        let convergence = runner.run(&matrix);

        debug!(
            transitions = counts.total(),
            iterations = convergence.iterations,
            converged = convergence.converged,
            dominant = %convergence.vector.dominant(),
            "pitch-class analysis complete"
        );

        Ok(Self {
            pitch_classes,
            counts,
            matrix,
            convergence,
        })
    }

    /// The stationary distribution
    pub fn stationary(&self) -> &StationaryVector {
        &self.convergence.vector
    }

    /// Occurrences of each pitch class, in chromatic order
    pub fn histogram(&self) -> [usize; PITCH_CLASS_COUNT] {
        let mut histogram = [0; PITCH_CLASS_COUNT];
        for pc in &self.pitch_classes {
            histogram[pc.index()] += 1;
        }
        histogram
    }

    /// Pitch classes that occur in the piece, in chromatic order
    pub fn present(&self) -> Vec<PitchClass> {
        let histogram = self.histogram();
        PitchClass::ALL
            .iter()
            .copied()
            .filter(|pc| histogram[pc.index()] > 0)
            .collect()
    }

    /// Transitions heavier than `threshold` from pitch classes in the piece
    ///
    /// Ordered by origin, then destination.
    pub fn typical_transitions(&self, threshold: f64) -> Vec<Transition> {
        let mut transitions = Vec::new();
        for origin in self.present() {
            for destination in PitchClass::ALL {
                let weight = self.matrix.get(destination, origin);
                if weight > threshold {
                    transitions.push(Transition {
                        origin,
                        destination,
                        weight,
                    });
                }
            }
        }
        transitions
    }

    /// Pitch classes whose stationary weight exceeds `threshold`
    pub fn dominant_pitch_classes(&self, threshold: f64) -> Vec<(PitchClass, f64)> {
        self.stationary().above(threshold)
    }
}
