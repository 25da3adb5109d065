// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Standard MIDI file input and output.
//!
//! This module provides:
//! - Decoding a file into a note event sequence plus source metadata
//! - Writing generated sequences with velocity humanizing
//! - Merging a generated melody into an existing arrangement

pub mod decode;
pub mod export;
pub mod remix;

use std::io;

use thiserror::Error;

pub use decode::{decode, read_midi, DecodedPiece};
pub use export::{MidiExporter, MAX_DELTA};
pub use remix::{mix, mix_files, MixOptions};

/// Default tempo when a file has no tempo meta event (120 BPM)
pub const DEFAULT_TEMPO: u32 = 500_000;

/// Default ticks per quarter note for files we create from scratch
pub const DEFAULT_PPQN: u16 = 480;

/// Errors reading or writing MIDI files
#[derive(Debug, Error)]
pub enum MidiFileError {
    #[error("malformed MIDI file: {0}")]
    Parse(#[from] midly::Error),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("SMPTE timecode files are not supported, metrical timing required")]
    UnsupportedTiming,
    #[error("delta of {delta} ticks exceeds the MIDI maximum")]
    DeltaOverflow { delta: u32 },
}

/// Playback settings of the source file, carried through to the output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceMetadata {
    /// Microseconds per quarter note
    pub tempo: u32,
    /// Ticks per quarter note
    pub ticks_per_beat: u16,
    /// General MIDI program (0-127)
    pub instrument: u8,
}

impl Default for SourceMetadata {
    fn default() -> Self {
        Self {
            tempo: DEFAULT_TEMPO,
            ticks_per_beat: DEFAULT_PPQN,
            instrument: 0,
        }
    }
}

impl SourceMetadata {
    /// Tempo in beats per minute
    pub fn bpm(&self) -> f64 {
        60_000_000.0 / self.tempo.max(1) as f64
    }
}
