// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Merging a generated melody into an existing arrangement.
//!
//! The base file's tracks are kept as they are. Every non-empty track of the
//! melody file is moved to one channel, transposed by whole octaves and
//! labelled with a track name, then appended. Output is always Type 1.

use std::fs;
use std::path::Path;

use midly::num::{u4, u7, u28};
use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Track, TrackEvent, TrackEventKind};
use tracing::debug;

use super::MidiFileError;

/// How melody tracks are placed in the mix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixOptions {
    /// Target MIDI channel (0-15)
    pub channel: u8,
    /// Whole octaves to transpose by
    pub octaves: i8,
    /// Name given to each inserted track
    pub track_name: String,
}

impl Default for MixOptions {
    fn default() -> Self {
        Self {
            channel: 2,
            octaves: 1,
            track_name: "Markov Melody".to_string(),
        }
    }
}

/// Merge two files on disk, returning the number of tracks written
pub fn mix_files<P, Q, O>(
    base: P,
    melody: Q,
    output: O,
    options: &MixOptions,
) -> Result<usize, MidiFileError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    O: AsRef<Path>,
{
    let base_bytes = fs::read(base.as_ref())?;
    let melody_bytes = fs::read(melody.as_ref())?;
    let base_smf = Smf::parse(&base_bytes)?;
    let melody_smf = Smf::parse(&melody_bytes)?;

    let mixed = mix(&base_smf, &melody_smf, options);
    mixed.save(output.as_ref())?;

    debug!(
        base_tracks = base_smf.tracks.len(),
        tracks = mixed.tracks.len(),
        "wrote mix"
    );
    Ok(mixed.tracks.len())
}

/// Merge a melody into a base arrangement
pub fn mix<'a>(base: &Smf<'a>, melody: &Smf<'a>, options: &'a MixOptions) -> Smf<'a> {
    let mut mixed = Smf::new(Header::new(Format::Parallel, base.header.timing));
    mixed.tracks.extend(base.tracks.iter().cloned());

    let channel = u4::new(options.channel.min(15));
    let shift = options.octaves as i16 * 12;

    for track in melody.tracks.iter().filter(|t| !t.is_empty()) {
        let mut retargeted = retarget(track, channel, shift);
        retargeted.insert(
            0,
            TrackEvent {
                delta: u28::new(0),
                kind: TrackEventKind::Meta(MetaMessage::TrackName(options.track_name.as_bytes())),
            },
        );
        mixed.tracks.push(retargeted);
    }

    mixed
}

/// Move channel messages to `channel` and shift note keys
fn retarget<'a>(track: &Track<'a>, channel: u4, shift: i16) -> Track<'a> {
    track
        .iter()
        .map(|event| {
            let kind = match event.kind {
                TrackEventKind::Midi { message, .. } => TrackEventKind::Midi {
                    channel,
                    message: transpose(message, shift),
                },
                other => other,
            };
            TrackEvent {
                delta: event.delta,
                kind,
            }
        })
        .collect()
}

fn transpose(message: MidiMessage, shift: i16) -> MidiMessage {
    let shifted = |key: u7| u7::new((key.as_int() as i16 + shift).clamp(0, 127) as u8);
    match message {
        MidiMessage::NoteOn { key, vel } => MidiMessage::NoteOn {
            key: shifted(key),
            vel,
        },
        MidiMessage::NoteOff { key, vel } => MidiMessage::NoteOff {
            key: shifted(key),
            vel,
        },
        other => other,
    }
}
