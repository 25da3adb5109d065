// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Standard MIDI file decoding.
//!
//! All tracks are merged into one time-ordered stream, the way a player
//! walks the file. Every note on with non-zero velocity becomes a note
//! event whose delta is the tick distance from the previous message in
//! that merged stream. The last tempo and program change seen anywhere are
//! reported as source metadata.

use std::fs;
use std::path::Path;

use midly::{Format, MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};
use tracing::debug;

use super::{MidiFileError, SourceMetadata, DEFAULT_TEMPO};
use crate::model::{EventSequence, NoteEvent};

/// A decoded source piece
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedPiece {
    /// Note onsets in temporal order
    pub events: EventSequence,
    /// Playback settings of the source
    pub metadata: SourceMetadata,
}

/// Read and decode a MIDI file
pub fn read_midi<P: AsRef<Path>>(path: P) -> Result<DecodedPiece, MidiFileError> {
    let bytes = fs::read(path.as_ref())?;
    decode(&bytes)
}

/// Decode MIDI file bytes
pub fn decode(bytes: &[u8]) -> Result<DecodedPiece, MidiFileError> {
    let smf = Smf::parse(bytes)?;

    let ticks_per_beat = match smf.header.timing {
        Timing::Metrical(ticks) => ticks.as_int(),
        Timing::Timecode(..) => return Err(MidiFileError::UnsupportedTiming),
    };

    let mut metadata = SourceMetadata {
        tempo: DEFAULT_TEMPO,
        ticks_per_beat,
        instrument: 0,
    };
    let mut events = EventSequence::new();
    let mut last_tick = 0u64;

    for (tick, kind) in merged_timeline(&smf) {
        let delta = u32::try_from(tick - last_tick).unwrap_or(u32::MAX);
        last_tick = tick;

        match kind {
            TrackEventKind::Meta(MetaMessage::Tempo(tempo)) => metadata.tempo = tempo.as_int(),
            TrackEventKind::Midi {
                message: MidiMessage::ProgramChange { program },
                ..
            } => metadata.instrument = program.as_int(),
            TrackEventKind::Midi {
                message: MidiMessage::NoteOn { key, vel },
                ..
            } if vel.as_int() > 0 => {
                events.push(NoteEvent::new(key.as_int(), delta, vel.as_int()));
            }
            _ => {}
        }
    }

    debug!(
        format = ?smf.header.format,
        tracks = smf.tracks.len(),
        notes = events.len(),
        tempo = metadata.tempo,
        ticks_per_beat,
        instrument = metadata.instrument,
        "decoded MIDI file"
    );

    Ok(DecodedPiece { events, metadata })
}

/// Every message with its absolute tick, across all tracks
///
/// Parallel files are interleaved by tick, keeping track order for ties.
/// Sequential files play their tracks back to back. End-of-track markers
/// are dropped.
fn merged_timeline<'a>(smf: &Smf<'a>) -> Vec<(u64, TrackEventKind<'a>)> {
    let mut timeline = Vec::new();
    let mut offset = 0u64;

    for track in &smf.tracks {
        let mut tick = offset;
        for event in track {
            tick += event.delta.as_int() as u64;
            if !matches!(event.kind, TrackEventKind::Meta(MetaMessage::EndOfTrack)) {
                timeline.push((tick, event.kind));
            }
        }
        if smf.header.format == Format::Sequential {
            offset = tick;
        }
    }

    timeline.sort_by_key(|(tick, _)| *tick);
    timeline
}

#[cfg(test)]
mod tests {
    use super::*;
    use midly::num::{u15, u24, u28, u4, u7};
    use midly::{Header, Track, TrackEvent};

    fn midi(delta: u32, channel: u8, message: MidiMessage) -> TrackEvent<'static> {
        TrackEvent {
            delta: u28::new(delta),
            kind: TrackEventKind::Midi {
                channel: u4::new(channel),
                message,
            },
        }
    }

    fn note_on(delta: u32, key: u8, vel: u8) -> TrackEvent<'static> {
        midi(
            delta,
            0,
            MidiMessage::NoteOn {
                key: u7::new(key),
                vel: u7::new(vel),
            },
        )
    }

    fn note_off(delta: u32, key: u8) -> TrackEvent<'static> {
        midi(
            delta,
            0,
            MidiMessage::NoteOff {
                key: u7::new(key),
                vel: u7::new(64),
            },
        )
    }

    fn end_of_track() -> TrackEvent<'static> {
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        }
    }

    fn to_bytes(format: Format, tracks: Vec<Track<'static>>) -> Vec<u8> {
        let mut smf = Smf::new(Header::new(format, Timing::Metrical(u15::new(96))));
        smf.tracks = tracks;
        let mut buf = Vec::new();
        smf.write_std(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_decode_single_track() {
        let track = vec![
            TrackEvent {
                delta: u28::new(0),
                kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(400_000))),
            },
            midi(0, 0, MidiMessage::ProgramChange { program: u7::new(40) }),
            note_on(0, 60, 90),
            note_off(48, 60),
            note_on(0, 62, 80),
            note_off(48, 62),
            note_on(24, 64, 70),
            note_off(48, 64),
            end_of_track(),
        ];
        let piece = decode(&to_bytes(Format::SingleTrack, vec![track])).unwrap();

        assert_eq!(piece.metadata.tempo, 400_000);
        assert_eq!(piece.metadata.ticks_per_beat, 96);
        assert_eq!(piece.metadata.instrument, 40);
        assert_eq!(
            piece.events.events(),
            &[
                NoteEvent::new(60, 0, 90),
                NoteEvent::new(62, 0, 80),
                NoteEvent::new(64, 24, 70),
            ]
        );
    }

    #[test]
    fn test_zero_velocity_note_on_is_release() {
        let track = vec![
            note_on(0, 60, 90),
            note_on(10, 60, 0),
            note_on(5, 67, 100),
            end_of_track(),
        ];
        let piece = decode(&to_bytes(Format::SingleTrack, vec![track])).unwrap();
        assert_eq!(piece.events.pitches(), vec![60, 67]);
        assert_eq!(piece.events.events()[1].delta, 5);
    }

    #[test]
    fn test_defaults_without_meta() {
        let track = vec![note_on(0, 60, 90), end_of_track()];
        let piece = decode(&to_bytes(Format::SingleTrack, vec![track])).unwrap();
        assert_eq!(piece.metadata.tempo, DEFAULT_TEMPO);
        assert_eq!(piece.metadata.instrument, 0);
    }

    #[test]
    fn test_parallel_tracks_interleave() {
        let conductor = vec![
            TrackEvent {
                delta: u28::new(0),
                kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(600_000))),
            },
            end_of_track(),
        ];
        let upper = vec![note_on(0, 72, 80), note_on(100, 74, 80), end_of_track()];
        let lower = vec![note_on(50, 48, 70), note_on(100, 50, 70), end_of_track()];

        let piece =
            decode(&to_bytes(Format::Parallel, vec![conductor, upper, lower])).unwrap();

        assert_eq!(piece.metadata.tempo, 600_000);
        assert_eq!(piece.events.pitches(), vec![72, 48, 74, 50]);
        let deltas: Vec<u32> = piece.events.iter().map(|e| e.delta).collect();
        assert_eq!(deltas, vec![0, 50, 50, 50]);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            decode(b"not a midi file"),
            Err(MidiFileError::Parse(_))
        ));
    }

    #[test]
    fn test_rejects_timecode() {
        let mut smf = Smf::new(Header::new(
            Format::SingleTrack,
            Timing::Timecode(midly::Fps::Fps25, 40),
        ));
        smf.tracks.push(vec![note_on(0, 60, 90), end_of_track()]);
        let mut buf = Vec::new();
        smf.write_std(&mut buf).unwrap();

        assert!(matches!(decode(&buf), Err(MidiFileError::UnsupportedTiming)));
    }
}
