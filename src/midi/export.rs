// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Standard MIDI file export of generated sequences.
//!
//! Writes a Type 0 file carrying the source tempo, program and resolution.
//! Each event becomes a note on after its delta followed by a note off a
//! fixed gate later. Velocities get a small random offset on the way out.

use std::io::Write;
use std::path::Path;

use midly::num::{u15, u24, u28, u4, u7};
use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind};
use rand::Rng;

use super::{MidiFileError, SourceMetadata, DEFAULT_PPQN, DEFAULT_TEMPO};
use crate::model::EventSequence;

/// Largest delta a track event can carry
pub const MAX_DELTA: u32 = 0x0FFF_FFFF;

/// Velocity written on note off
const RELEASE_VELOCITY: u8 = 64;

/// Output channel
const CHANNEL: u8 = 0;

/// MIDI file exporter for generated sequences
#[derive(Debug, Clone)]
pub struct MidiExporter {
    /// PPQN (ticks per quarter note)
    ppqn: u16,
    /// Microseconds per quarter note
    tempo: u32,
    /// Program change at start
    program: u8,
    /// Maximum velocity offset in either direction
    velocity_jitter: u8,
    /// Note length is `ppqn / gate_divisor`
    gate_divisor: u16,
}

impl MidiExporter {
    /// Create a new exporter
    pub fn new() -> Self {
        Self {
            ppqn: DEFAULT_PPQN,
            tempo: DEFAULT_TEMPO,
            program: 0,
            velocity_jitter: 5,
            gate_divisor: 2,
        }
    }

    /// Exporter matching a decoded source file
    pub fn for_source(metadata: &SourceMetadata) -> Self {
        let mut exporter = Self::new();
        exporter.set_ppqn(metadata.ticks_per_beat);
        exporter.set_tempo(metadata.tempo);
        exporter.set_program(metadata.instrument);
        exporter
    }

    /// Set PPQN (1-32767)
    pub fn set_ppqn(&mut self, ppqn: u16) {
        self.ppqn = ppqn.clamp(1, 0x7FFF);
    }

    /// Get PPQN
    pub fn ppqn(&self) -> u16 {
        self.ppqn
    }

    /// Set tempo in microseconds per quarter note
    pub fn set_tempo(&mut self, microseconds: u32) {
        self.tempo = microseconds.clamp(1, 0x00FF_FFFF);
    }

    /// Get tempo in microseconds per quarter note
    pub fn tempo(&self) -> u32 {
        self.tempo
    }

    /// Set program
    pub fn set_program(&mut self, program: u8) {
        self.program = program & 0x7F;
    }

    /// Get program
    pub fn program(&self) -> u8 {
        self.program
    }

    /// Set the humanizing range
    pub fn set_velocity_jitter(&mut self, jitter: u8) {
        self.velocity_jitter = jitter.min(63);
    }

    /// Get the humanizing range
    pub fn velocity_jitter(&self) -> u8 {
        self.velocity_jitter
    }

    /// Set the gate divisor
    pub fn set_gate_divisor(&mut self, divisor: u16) {
        self.gate_divisor = divisor.max(1);
    }

    /// Length of every written note in ticks
    pub fn note_length(&self) -> u32 {
        (self.ppqn / self.gate_divisor) as u32
    }

    /// Export to file
    pub fn export<P: AsRef<Path>, R: Rng + ?Sized>(
        &self,
        path: P,
        sequence: &EventSequence,
        rng: &mut R,
    ) -> Result<(), MidiFileError> {
        self.to_smf(sequence, rng)?.save(path.as_ref())?;
        Ok(())
    }

    /// Export to bytes
    pub fn export_to_bytes<R: Rng + ?Sized>(
        &self,
        sequence: &EventSequence,
        rng: &mut R,
    ) -> Result<Vec<u8>, MidiFileError> {
        let mut buffer = Vec::new();
        self.write(&mut buffer, sequence, rng)?;
        Ok(buffer)
    }

    /// Write MIDI data to writer
    pub fn write<W: Write, R: Rng + ?Sized>(
        &self,
        writer: &mut W,
        sequence: &EventSequence,
        rng: &mut R,
    ) -> Result<(), MidiFileError> {
        self.to_smf(sequence, rng)?.write_std(writer)?;
        Ok(())
    }

    /// Build the single-track file
    ///
    /// Fails with [`MidiFileError::DeltaOverflow`] if an event waits longer
    /// than [`MAX_DELTA`] ticks.
    pub fn to_smf<R: Rng + ?Sized>(
        &self,
        sequence: &EventSequence,
        rng: &mut R,
    ) -> Result<Smf<'static>, MidiFileError> {
        let mut smf = Smf::new(Header::new(
            Format::SingleTrack,
            Timing::Metrical(u15::new(self.ppqn)),
        ));
        smf.tracks.push(self.track(sequence, rng)?);
        Ok(smf)
    }

    /// Offset a velocity by a uniform amount in `-jitter..=jitter`
    fn humanize<R: Rng + ?Sized>(&self, velocity: u8, rng: &mut R) -> u8 {
        let jitter = self.velocity_jitter as i16;
        let offset = if jitter > 0 {
            rng.gen_range(-jitter..=jitter)
        } else {
            0
        };
        (velocity as i16 + offset).clamp(1, 127) as u8
    }

    fn track<R: Rng + ?Sized>(
        &self,
        sequence: &EventSequence,
        rng: &mut R,
    ) -> Result<Track<'static>, MidiFileError> {
        let channel = u4::new(CHANNEL);
        let mut track: Track<'static> = Vec::with_capacity(sequence.len() * 2 + 3);

        track.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(self.tempo))),
        });
        track.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Midi {
                channel,
                message: MidiMessage::ProgramChange {
                    program: u7::new(self.program),
                },
            },
        });

        let gate = u28::new(self.note_length());
        for event in sequence {
            if event.delta > MAX_DELTA {
                return Err(MidiFileError::DeltaOverflow { delta: event.delta });
            }
            let key = u7::new(event.pitch & 0x7F);

            track.push(TrackEvent {
                delta: u28::new(event.delta),
                kind: TrackEventKind::Midi {
                    channel,
                    message: MidiMessage::NoteOn {
                        key,
                        vel: u7::new(self.humanize(event.velocity, rng)),
                    },
                },
            });
            track.push(TrackEvent {
                delta: gate,
                kind: TrackEventKind::Midi {
                    channel,
                    message: MidiMessage::NoteOff {
                        key,
                        vel: u7::new(RELEASE_VELOCITY),
                    },
                },
            });
        }

        track.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        });
        Ok(track)
    }
}

impl Default for MidiExporter {
    fn default() -> Self {
        Self::new()
    }
}
