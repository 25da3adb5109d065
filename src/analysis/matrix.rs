// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Column-stochastic pitch-class transition matrix.
//!
//! Rows are destinations and columns are origins, so multiplying the matrix
//! by a column vector of origin weights yields destination weights.

use super::pitch_class::{PitchClass, PITCH_CLASS_COUNT};
use crate::model::EventSequence;

const N: usize = PITCH_CLASS_COUNT;

/// Raw transition counts between pitch classes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionCounts {
    /// counts[destination][origin]
    counts: [[u32; N]; N],
}

impl Default for TransitionCounts {
    fn default() -> Self {
        Self {
            counts: [[0; N]; N],
        }
    }
}

impl TransitionCounts {
    /// Create zeroed counts
    pub fn new() -> Self {
        Self::default()
    }

    /// Count every consecutive pair in a pitch-class sequence
    pub fn from_pitch_classes(classes: &[PitchClass]) -> Self {
        let mut counts = Self::new();
        for pair in classes.windows(2) {
            counts.observe(pair[0], pair[1]);
        }
        counts
    }

    /// Record one `origin -> destination` transition
    pub fn observe(&mut self, origin: PitchClass, destination: PitchClass) {
        self.counts[destination.index()][origin.index()] += 1;
    }

    /// Add another set of counts cell by cell
    pub fn merge(&mut self, other: &TransitionCounts) {
        for (row, other_row) in self.counts.iter_mut().zip(other.counts.iter()) {
            for (cell, other_cell) in row.iter_mut().zip(other_row.iter()) {
                *cell += other_cell;
            }
        }
    }

    /// Count for one transition
    pub fn get(&self, destination: PitchClass, origin: PitchClass) -> u32 {
        self.counts[destination.index()][origin.index()]
    }

    /// Total transitions leaving `origin`
    pub fn outgoing(&self, origin: PitchClass) -> u32 {
        self.counts.iter().map(|row| row[origin.index()]).sum()
    }

    /// Total transitions counted
    pub fn total(&self) -> u32 {
        self.counts.iter().flatten().sum()
    }
}

/// 12x12 column-stochastic transition matrix over pitch classes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchClassMatrix {
    /// cells[destination][origin]
    cells: [[f64; N]; N],
}

impl PitchClassMatrix {
    /// Build the matrix for a sequence
    ///
    /// Columns with no outgoing transition are filled with `1/12`.
    pub fn build(sequence: &EventSequence) -> Self {
        Self::from_counts(&TransitionCounts::from_pitch_classes(
            &sequence.pitch_classes(),
        ))
    }

    /// Normalize counts column by column
    pub fn from_counts(counts: &TransitionCounts) -> Self {
        let mut cells = [[0.0; N]; N];

        for origin in PitchClass::ALL {
            let j = origin.index();
            let total = counts.outgoing(origin);
            for (i, row) in cells.iter_mut().enumerate() {
                row[j] = if total > 0 {
                    counts.counts[i][j] as f64 / total as f64
                } else {
                    1.0 / N as f64
                };
            }
        }

        Self { cells }
    }

    /// Wrap cells given as `[destination][origin]`
    ///
    /// Returns `None` unless every entry is finite and non-negative and
    /// every column sums to 1 within `1e-9`.
    pub fn from_cells(cells: [[f64; N]; N]) -> Option<Self> {
        if cells.iter().flatten().any(|v| !v.is_finite() || *v < 0.0) {
            return None;
        }
        let matrix = Self { cells };
        matrix.is_column_stochastic(1e-9).then_some(matrix)
    }

    /// Probability of moving from `origin` to `destination`
    pub fn get(&self, destination: PitchClass, origin: PitchClass) -> f64 {
        self.cells[destination.index()][origin.index()]
    }

    /// Distribution of destinations for one origin
    pub fn column(&self, origin: PitchClass) -> [f64; N] {
        let mut column = [0.0; N];
        for (value, row) in column.iter_mut().zip(self.cells.iter()) {
            *value = row[origin.index()];
        }
        column
    }

    /// Rows indexed by destination
    pub fn rows(&self) -> &[[f64; N]; N] {
        &self.cells
    }

    /// Sum of each column
    pub fn column_sums(&self) -> [f64; N] {
        let mut sums = [0.0; N];
        for row in &self.cells {
            for (sum, value) in sums.iter_mut().zip(row.iter()) {
                *sum += value;
            }
        }
        sums
    }

    /// Check that every column sums to 1 within `tolerance`
    pub fn is_column_stochastic(&self, tolerance: f64) -> bool {
        self.column_sums()
            .iter()
            .all(|sum| (sum - 1.0).abs() <= tolerance)
    }

    /// Matrix-vector product
    pub fn apply(&self, vector: &[f64; N]) -> [f64; N] {
        let mut out = [0.0; N];
        for (value, row) in out.iter_mut().zip(self.cells.iter()) {
            *value = row.iter().zip(vector.iter()).map(|(m, v)| m * v).sum();
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NoteEvent;

    const EPSILON: f64 = 1e-9;

    fn sequence(pitches: &[u8]) -> EventSequence {
        pitches
            .iter()
            .map(|&p| NoteEvent::new(p, 100, 80))
            .collect()
    }

    #[test]
    fn test_repeating_pattern_matrix() {
        let matrix = PitchClassMatrix::build(&sequence(&[60, 62, 64, 60, 62, 64]));

        assert!((matrix.get(PitchClass::D, PitchClass::C) - 1.0).abs() < EPSILON);
        assert!((matrix.get(PitchClass::E, PitchClass::D) - 1.0).abs() < EPSILON);
        assert!((matrix.get(PitchClass::C, PitchClass::E) - 1.0).abs() < EPSILON);

        for origin in [PitchClass::C, PitchClass::D, PitchClass::E] {
            let column = matrix.column(origin);
            assert_eq!(column.iter().filter(|v| **v > 0.0).count(), 1);
        }

        for origin in PitchClass::ALL {
            if matches!(origin, PitchClass::C | PitchClass::D | PitchClass::E) {
                continue;
            }
            for value in matrix.column(origin) {
                assert!((value - 1.0 / 12.0).abs() < EPSILON);
            }
        }
    }

    #[test]
    fn test_columns_sum_to_one() {
        let matrix = PitchClassMatrix::build(&sequence(&[
            60, 67, 64, 72, 71, 69, 67, 65, 64, 62, 60, 61, 63, 66, 70, 68,
        ]));
        assert!(matrix.is_column_stochastic(EPSILON));
        for sum in matrix.column_sums() {
            assert!((sum - 1.0).abs() < EPSILON);
        }
    }

    #[test]
    fn test_final_note_without_successor_is_uniform() {
        // F# only appears as the last note
        let matrix = PitchClassMatrix::build(&sequence(&[60, 62, 66]));
        for value in matrix.column(PitchClass::Fs) {
            assert!((value - 1.0 / 12.0).abs() < EPSILON);
        }
        assert!(matrix.is_column_stochastic(EPSILON));
    }

    #[test]
    fn test_octaves_share_a_class() {
        let matrix = PitchClassMatrix::build(&sequence(&[48, 62, 72, 50]));
        // C -> D twice, D -> C once
        assert!((matrix.get(PitchClass::D, PitchClass::C) - 1.0).abs() < EPSILON);
        assert!((matrix.get(PitchClass::C, PitchClass::D) - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_split_counts_merge_to_sequential() {
        let classes: Vec<PitchClass> = [60, 64, 67, 72, 67, 64, 60, 62, 65, 69]
            .iter()
            .map(|&p| PitchClass::from_pitch(p))
            .collect();
        let sequential = TransitionCounts::from_pitch_classes(&classes);

        // Shards overlap by one element so the boundary pair is counted once
        let mut merged = TransitionCounts::from_pitch_classes(&classes[..5]);
        merged.merge(&TransitionCounts::from_pitch_classes(&classes[4..]));

        assert_eq!(merged, sequential);
        assert_eq!(sequential.total(), 9);
    }

    #[test]
    fn test_self_transition_counted() {
        let counts = TransitionCounts::from_pitch_classes(&[
            PitchClass::A,
            PitchClass::A,
            PitchClass::B,
        ]);
        assert_eq!(counts.get(PitchClass::A, PitchClass::A), 1);
        assert_eq!(counts.get(PitchClass::B, PitchClass::A), 1);
        assert_eq!(counts.outgoing(PitchClass::A), 2);
        assert_eq!(counts.outgoing(PitchClass::B), 0);
    }

    #[test]
    fn test_from_cells_validation() {
        let uniform = [[1.0 / 12.0; N]; N];
        assert!(PitchClassMatrix::from_cells(uniform).is_some());

        let mut broken = uniform;
        broken[0][0] = 0.5;
        assert!(PitchClassMatrix::from_cells(broken).is_none());

        let mut negative = [[0.0; N]; N];
        for j in 0..N {
            negative[j][j] = 1.0;
        }
        negative[1][0] = -0.5;
        negative[2][0] = 0.5;
        assert!(PitchClassMatrix::from_cells(negative).is_none());
    }

    #[test]
    fn test_apply_identity() {
        let mut identity = [[0.0; N]; N];
        for i in 0..N {
            identity[i][i] = 1.0;
        }
        let matrix = PitchClassMatrix::from_cells(identity).unwrap();
        let v = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0];
        assert_eq!(matrix.apply(&v), v);
    }
}
