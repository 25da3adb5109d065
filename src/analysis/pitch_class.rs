// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Chromatic pitch classes in canonical order.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of chromatic pitch classes
pub const PITCH_CLASS_COUNT: usize = 12;

/// Octave-independent note identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PitchClass {
    C,
    #[serde(rename = "C#")]
    Cs, // C# / Db
    D,
    #[serde(rename = "D#")]
    Ds, // D# / Eb
    E,
    F,
    #[serde(rename = "F#")]
    Fs, // F# / Gb
    G,
    #[serde(rename = "G#")]
    Gs, // G# / Ab
    A,
    #[serde(rename = "A#")]
    As, // A# / Bb
    B,
}

impl PitchClass {
    /// All pitch classes in chromatic order
    pub const ALL: [PitchClass; PITCH_CLASS_COUNT] = [
        PitchClass::C,
        PitchClass::Cs,
        PitchClass::D,
        PitchClass::Ds,
        PitchClass::E,
        PitchClass::F,
        PitchClass::Fs,
        PitchClass::G,
        PitchClass::Gs,
        PitchClass::A,
        PitchClass::As,
        PitchClass::B,
    ];

    /// Position in the chromatic order (0-11)
    pub fn index(self) -> usize {
        self as usize
    }

    /// Pitch class of a MIDI note number
    pub fn from_pitch(pitch: u8) -> Self {
        PitchClass::ALL[(pitch % 12) as usize]
    }

    /// Pitch class at a chromatic index, wrapping past 11
    pub fn from_index(index: usize) -> Self {
        PitchClass::ALL[index % PITCH_CLASS_COUNT]
    }

    /// Sharp-spelled name
    pub fn name(self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::Cs => "C#",
            PitchClass::D => "D",
            PitchClass::Ds => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::Fs => "F#",
            PitchClass::G => "G",
            PitchClass::Gs => "G#",
            PitchClass::A => "A",
            PitchClass::As => "A#",
            PitchClass::B => "B",
        }
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}
