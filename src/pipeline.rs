// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! End-to-end remix and mix runs over files.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rand::Rng;
use tracing::{info, warn};

use crate::analysis::PitchClassAnalysis;
use crate::config::RemixConfig;
use crate::midi::{mix_files, read_midi};
use crate::model::{train, EventSequence, ModelError, SequenceGenerator};
use crate::render::write_reports;

/// Result of a remix run
#[derive(Debug, Clone)]
pub struct RemixOutcome {
    /// Written MIDI file
    pub output: PathBuf,
    /// Analysis reports, empty if they could not be written
    pub reports: Vec<PathBuf>,
    /// Note events decoded from the input
    pub source_events: usize,
    /// Seed pair plus generated events
    pub generated: EventSequence,
}

/// Decode, analyze, train, generate and write `remix_<file name>`
///
/// Inputs with fewer than three note events fail with
/// [`ModelError::InsufficientData`]. Report failures are logged only.
pub fn remix_file<R: Rng + ?Sized>(
    input: &Path,
    config: &RemixConfig,
    rng: &mut R,
) -> Result<RemixOutcome> {
    let piece =
        read_midi(input).with_context(|| format!("Failed to read MIDI file: {:?}", input))?;
    info!(
        notes = piece.events.len(),
        tempo = piece.metadata.tempo,
        bpm = piece.metadata.bpm(),
        ticks_per_beat = piece.metadata.ticks_per_beat,
        instrument = piece.metadata.instrument,
        "decoded {:?}",
        input
    );

    piece.events.ensure_modelable()?;
    let file_name = file_name(input)?;
    let directory = &config.output.directory;

    let reports = match PitchClassAnalysis::analyze(&piece.events, &config.power_iteration()) {
        Ok(analysis) => {
            let stem = input
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| file_name.clone());
            write_reports(&analysis, &stem, directory, &config.analysis).unwrap_or_else(|e| {
                warn!("analysis report not written: {:#}", e);
                Vec::new()
            })
        }
        Err(e) => {
            warn!("analysis skipped: {}", e);
            Vec::new()
        }
    };

    let table = train(&piece.events).ok_or(ModelError::InsufficientData {
        len: piece.events.len(),
    })?;
    info!(
        contexts = table.len(),
        observations = table.observation_count(),
        "trained transition table"
    );

    let seed = piece.events.opening_pair().ok_or(ModelError::InsufficientData {
        len: piece.events.len(),
    })?;
    let generator = SequenceGenerator::new(table)?;
    let generated = generator.generate(seed, config.generation.length, rng);

    fs::create_dir_all(directory)
        .with_context(|| format!("Failed to create output directory: {:?}", directory))?;
    let output = directory.join(format!("remix_{}", file_name));
    config
        .exporter(&piece.metadata)
        .export(&output, &generated, rng)
        .with_context(|| format!("Failed to write MIDI file: {:?}", output))?;
    info!(events = generated.len(), "wrote {:?}", output);

    Ok(RemixOutcome {
        output,
        reports,
        source_events: piece.events.len(),
        generated,
    })
}

/// Merge a generated melody into `base`, writing `mix_<base file name>`
pub fn mix_into_output(base: &Path, melody: &Path, config: &RemixConfig) -> Result<PathBuf> {
    let directory = &config.output.directory;
    fs::create_dir_all(directory)
        .with_context(|| format!("Failed to create output directory: {:?}", directory))?;

    let output = directory.join(format!("mix_{}", file_name(base)?));
    let tracks = mix_files(base, melody, &output, &config.mix_options())
        .with_context(|| format!("Failed to mix {:?} into {:?}", melody, base))?;
    info!(tracks, "wrote {:?}", output);
    Ok(output)
}

fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("Not a file path: {:?}", path))
}
