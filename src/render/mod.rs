// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Text and YAML reports of a pitch-class analysis.
//!
//! This module provides:
//! - A 12x12 heatmap of the transition matrix
//! - A list of typical transitions between pitch classes in the piece
//! - A bar chart of the stationary distribution
//! - A serializable summary saved next to the text report

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analysis::{
    PitchClass, PitchClassAnalysis, PitchClassMatrix, StationaryVector, Transition,
};
use crate::config::AnalysisConfig;

/// Width of a full bar in the dominant chart
const BAR_WIDTH: usize = 40;

/// Heatmap of the matrix, origins across and destinations down
pub fn render_heatmap(matrix: &PitchClassMatrix) -> String {
    let mut out = String::new();

    let _ = write!(out, "{:<8}", "to\\from");
    for origin in PitchClass::ALL {
        let _ = write!(out, "{:>6}", origin);
    }
    out.push('\n');

    for (destination, row) in PitchClass::ALL.iter().zip(matrix.rows().iter()) {
        let _ = write!(out, "{:<8}", destination);
        for value in row {
            let _ = write!(out, "{:>6.2}", value);
        }
        out.push('\n');
    }

    out
}

/// One line per typical transition
pub fn render_graph(transitions: &[Transition]) -> String {
    if transitions.is_empty() {
        return "(no transitions above threshold)\n".to_string();
    }

    let mut out = String::new();
    for t in transitions {
        let _ = writeln!(
            out,
            "{:<3} -> {:<3} {:.2}",
            t.origin, t.destination, t.weight
        );
    }
    out
}

/// Bar per pitch class, scaled to the heaviest weight
///
/// Pitch classes above `threshold` are marked with `*`.
pub fn render_dominant_chart(vector: &StationaryVector, threshold: f64) -> String {
    let max = vector.weights().iter().copied().fold(0.0, f64::max);
    let mut out = String::new();

    for pc in PitchClass::ALL {
        let weight = vector.get(pc);
        let filled = if max > 0.0 {
            ((weight / max * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH)
        } else {
            0
        };
        let bar: String = "█".repeat(filled) + &"░".repeat(BAR_WIDTH - filled);
        let marker = if weight > threshold { " *" } else { "" };
        let _ = writeln!(out, "{:<3} {} {:.3}{}", pc, bar, weight, marker);
    }

    out
}

/// Full text report
pub fn render_text(analysis: &PitchClassAnalysis, source: &str, config: &AnalysisConfig) -> String {
    let convergence = &analysis.convergence;
    let mut out = String::new();

    let _ = writeln!(out, "Pitch-class analysis: {}", source);
    let _ = writeln!(
        out,
        "{} notes, {} power iterations{}",
        analysis.pitch_classes.len(),
        convergence.iterations,
        if convergence.converged { " (converged)" } else { "" }
    );

    out.push_str("\nTransition matrix\n");
    out.push_str(&render_heatmap(&analysis.matrix));

    let _ = writeln!(out, "\nTypical transitions (> {:.2})", config.edge_threshold);
    out.push_str(&render_graph(
        &analysis.typical_transitions(config.edge_threshold),
    ));

    let _ = writeln!(
        out,
        "\nStationary distribution (* > {:.2})",
        config.dominant_threshold
    );
    out.push_str(&render_dominant_chart(
        analysis.stationary(),
        config.dominant_threshold,
    ));

    out
}

/// Per pitch class figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitchClassSummary {
    pub pitch_class: PitchClass,
    /// Occurrences in the piece
    pub count: usize,
    /// Stationary weight
    pub weight: f64,
}

/// Serializable summary of an analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub source: String,
    pub notes: usize,
    pub iterations: usize,
    pub converged: bool,
    pub pitch_classes: Vec<PitchClassSummary>,
    /// Rows indexed by destination, columns by origin
    pub matrix: Vec<Vec<f64>>,
    /// Heaviest first
    pub dominant: Vec<PitchClass>,
    pub transitions: Vec<Transition>,
}

impl AnalysisReport {
    /// Summarize an analysis under the given thresholds
    pub fn new(analysis: &PitchClassAnalysis, source: &str, config: &AnalysisConfig) -> Self {
        let histogram = analysis.histogram();
        let stationary = analysis.stationary();

        Self {
            source: source.to_string(),
            notes: analysis.pitch_classes.len(),
            iterations: analysis.convergence.iterations,
            converged: analysis.convergence.converged,
            pitch_classes: PitchClass::ALL
                .iter()
                .map(|&pc| PitchClassSummary {
                    pitch_class: pc,
                    count: histogram[pc.index()],
                    weight: stationary.get(pc),
                })
                .collect(),
            matrix: analysis.matrix.rows().iter().map(|r| r.to_vec()).collect(),
            dominant: analysis
                .dominant_pitch_classes(config.dominant_threshold)
                .into_iter()
                .map(|(pc, _)| pc)
                .collect(),
            transitions: analysis.typical_transitions(config.edge_threshold),
        }
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize analysis report")
    }
}

/// Write `analysis_<name>.txt` and `analysis_<name>.yaml` into `directory`
pub fn write_reports(
    analysis: &PitchClassAnalysis,
    name: &str,
    directory: &Path,
    config: &AnalysisConfig,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(directory)
        .with_context(|| format!("Failed to create output directory: {:?}", directory))?;

    let text_path = directory.join(format!("analysis_{}.txt", name));
    fs::write(&text_path, render_text(analysis, name, config))
        .with_context(|| format!("Failed to write report: {:?}", text_path))?;

    let yaml_path = directory.join(format!("analysis_{}.yaml", name));
    let report = AnalysisReport::new(analysis, name, config);
    fs::write(&yaml_path, report.to_yaml()?)
        .with_context(|| format!("Failed to write report: {:?}", yaml_path))?;

    info!(text = ?text_path, yaml = ?yaml_path, "wrote analysis reports");
    Ok(vec![text_path, yaml_path])
}
