// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Stationary distribution by power iteration.
//!
//! The vector is renormalized to unit Euclidean length after every
//! multiplication and rescaled to sum to 1 at the end. The default mode runs
//! a fixed number of iterations with no convergence check.

use super::matrix::PitchClassMatrix;
use super::pitch_class::{PitchClass, PITCH_CLASS_COUNT};

const N: usize = PITCH_CLASS_COUNT;

/// Default number of power iterations
pub const DEFAULT_ITERATIONS: usize = 200;

/// Long-run pitch-class prevalence, summing to 1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StationaryVector {
    weights: [f64; N],
}

impl StationaryVector {
    /// Uniform distribution
    pub fn uniform() -> Self {
        Self {
            weights: [1.0 / N as f64; N],
        }
    }

    /// Rescale non-negative weights to sum to 1
    ///
    /// Degenerate input (zero or non-finite total) yields the uniform
    /// distribution.
    fn normalized(weights: [f64; N]) -> Self {
        let total: f64 = weights.iter().sum();
        if total <= 0.0 || !total.is_finite() {
            return Self::uniform();
        }
        let mut out = [0.0; N];
        for (o, w) in out.iter_mut().zip(weights.iter()) {
            *o = (w / total).max(0.0);
        }
        Self { weights: out }
    }

    /// Weights in chromatic order
    pub fn weights(&self) -> &[f64; N] {
        &self.weights
    }

    /// Weight of one pitch class
    pub fn get(&self, pc: PitchClass) -> f64 {
        self.weights[pc.index()]
    }

    /// Sum of all weights
    pub fn sum(&self) -> f64 {
        self.weights.iter().sum()
    }

    /// Pitch classes sorted by descending weight
    ///
    /// Ties keep chromatic order.
    pub fn ranked(&self) -> Vec<(PitchClass, f64)> {
        let mut ranked: Vec<(PitchClass, f64)> = PitchClass::ALL
            .iter()
            .map(|&pc| (pc, self.get(pc)))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }

    /// Heaviest pitch class
    pub fn dominant(&self) -> PitchClass {
        self.ranked()
            .first()
            .map(|(pc, _)| *pc)
            .unwrap_or(PitchClass::C)
    }

    /// Pitch classes weighing strictly more than `threshold`, heaviest first
    pub fn above(&self, threshold: f64) -> Vec<(PitchClass, f64)> {
        self.ranked()
            .into_iter()
            .filter(|(_, w)| *w > threshold)
            .collect()
    }
}

/// Outcome of a power iteration run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Convergence {
    /// Estimated stationary distribution
    pub vector: StationaryVector,
    /// Multiplications actually performed
    pub iterations: usize,
    /// Whether the tolerance check ended the run early
    pub converged: bool,
}

/// Power iteration settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerIteration {
    iterations: usize,
    tolerance: Option<f64>,
}

impl Default for PowerIteration {
    fn default() -> Self {
        Self::new(DEFAULT_ITERATIONS)
    }
}

impl PowerIteration {
    /// Fixed-count iteration with no convergence check
    pub fn new(iterations: usize) -> Self {
        Self {
            iterations,
            tolerance: None,
        }
    }

    /// Stop early once no component moves by more than `tolerance`
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    /// Maximum number of iterations
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Early-exit tolerance, if any
    pub fn tolerance(&self) -> Option<f64> {
        self.tolerance
    }

    /// Run against a matrix
    pub fn run(&self, matrix: &PitchClassMatrix) -> Convergence {
        let mut v = *StationaryVector::uniform().weights();

        for i in 0..self.iterations {
            let next = matrix.apply(&v);
            let norm = next.iter().map(|x| x * x).sum::<f64>().sqrt();
            if norm == 0.0 || !norm.is_finite() {
                return Convergence {
                    vector: StationaryVector::uniform(),
                    iterations: i + 1,
                    converged: false,
                };
            }

            let mut scaled = [0.0; N];
            for (s, x) in scaled.iter_mut().zip(next.iter()) {
                *s = x / norm;
            }

            let shift = scaled
                .iter()
                .zip(v.iter())
                .map(|(a, b)| (a - b).abs())
                .fold(0.0, f64::max);
            v = scaled;

            if let Some(tolerance) = self.tolerance {
                if shift <= tolerance {
                    return Convergence {
                        vector: StationaryVector::normalized(v),
                        iterations: i + 1,
                        converged: true,
                    };
                }
            }
        }

        Convergence {
            vector: StationaryVector::normalized(v),
            iterations: self.iterations,
            converged: false,
        }
    }
}

/// Fixed-count power iteration
pub fn stationary_distribution(matrix: &PitchClassMatrix, iterations: usize) -> StationaryVector {
    PowerIteration::new(iterations).run(matrix).vector
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EventSequence, NoteEvent};

    const EPSILON: f64 = 1e-9;

    fn matrix_for(pitches: &[u8]) -> PitchClassMatrix {
        let seq: EventSequence = pitches
            .iter()
            .map(|&p| NoteEvent::new(p, 0, 80))
            .collect();
        PitchClassMatrix::build(&seq)
    }

    fn assert_probability_vector(v: &StationaryVector) {
        assert_eq!(v.weights().len(), 12);
        assert!(v.weights().iter().all(|w| *w >= 0.0));
        assert!((v.sum() - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_uniform_matrix_stays_uniform() {
        let matrix = PitchClassMatrix::from_cells([[1.0 / 12.0; N]; N]).unwrap();
        let v = stationary_distribution(&matrix, DEFAULT_ITERATIONS);
        assert_probability_vector(&v);
        for w in v.weights() {
            assert!((w - 1.0 / 12.0).abs() < EPSILON);
        }
    }

    #[test]
    fn test_stationary_is_probability_vector() {
        let matrices = [
            matrix_for(&[60, 62, 64, 60, 62, 64]),
            matrix_for(&[60, 67, 64, 72, 71, 69, 67, 65, 64, 62, 60]),
            matrix_for(&[61, 61, 61, 61]),
            matrix_for(&[60, 62, 66]),
        ];
        for matrix in &matrices {
            assert_probability_vector(&stationary_distribution(matrix, DEFAULT_ITERATIONS));
            assert_probability_vector(&stationary_distribution(matrix, 1));
        }
    }

    #[test]
    fn test_zero_iterations_returns_start_vector() {
        let matrix = matrix_for(&[60, 62, 64]);
        let v = stationary_distribution(&matrix, 0);
        for w in v.weights() {
            assert!((w - 1.0 / 12.0).abs() < EPSILON);
        }
    }

    #[test]
    fn test_absorbing_self_loop_dominates() {
        // Every non-A column is uniform, A only moves to A
        let mut cells = [[1.0 / 12.0; N]; N];
        for row in cells.iter_mut() {
            row[PitchClass::A.index()] = 0.0;
        }
        cells[PitchClass::A.index()][PitchClass::A.index()] = 1.0;
        let matrix = PitchClassMatrix::from_cells(cells).unwrap();

        let v = stationary_distribution(&matrix, DEFAULT_ITERATIONS);
        assert_probability_vector(&v);
        assert_eq!(v.dominant(), PitchClass::A);
        assert!(v.get(PitchClass::A) > 0.99);
    }

    #[test]
    fn test_two_cycle_is_balanced() {
        // C -> G -> C, everything else uniform
        let matrix = matrix_for(&[60, 67, 60, 67, 60, 67]);
        let v = stationary_distribution(&matrix, DEFAULT_ITERATIONS);
        assert_probability_vector(&v);
        assert!((v.get(PitchClass::C) - v.get(PitchClass::G)).abs() < 1e-6);
        assert!(v.get(PitchClass::C) > v.get(PitchClass::D));
    }

    #[test]
    fn test_tolerance_stops_early() {
        let matrix = PitchClassMatrix::from_cells([[1.0 / 12.0; N]; N]).unwrap();
        let result = PowerIteration::new(200).with_tolerance(1e-12).run(&matrix);
        assert!(result.converged);
        assert!(result.iterations < 200);
        assert_probability_vector(&result.vector);
    }

    #[test]
    fn test_fixed_mode_runs_every_iteration() {
        let matrix = matrix_for(&[60, 62, 64, 65, 67]);
        let result = PowerIteration::default().run(&matrix);
        assert!(!result.converged);
        assert_eq!(result.iterations, DEFAULT_ITERATIONS);
        assert_eq!(result.vector, stationary_distribution(&matrix, DEFAULT_ITERATIONS));
    }

    #[test]
    fn test_ranked_and_above() {
        // Everything flows to E
        let mut cells = [[0.0; N]; N];
        for j in 0..N {
            cells[PitchClass::E.index()][j] = 1.0;
        }
        let matrix = PitchClassMatrix::from_cells(cells).unwrap();
        let v = stationary_distribution(&matrix, 10);

        let ranked = v.ranked();
        assert_eq!(ranked[0].0, PitchClass::E);
        assert_eq!(v.above(0.5), vec![(PitchClass::E, v.get(PitchClass::E))]);
        assert!(v.above(1.0).is_empty());
    }
}
