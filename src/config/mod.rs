// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Configuration for a remix run.
//!
//! Settings are loaded from YAML, or from TOML when the file has a `.toml`
//! extension. Every field has a default, so an empty file is valid.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::analysis::{PowerIteration, DEFAULT_ITERATIONS};
use crate::midi::{MidiExporter, MixOptions, SourceMetadata};

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RemixConfig {
    /// Melody generation settings
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Pitch-class analysis settings
    #[serde(default)]
    pub analysis: AnalysisConfig,
    /// Output file settings
    #[serde(default)]
    pub output: OutputConfig,
    /// MIDI writing settings
    #[serde(default)]
    pub encoding: EncodingConfig,
    /// Remix utility settings
    #[serde(default)]
    pub mix: MixConfig,
}

impl RemixConfig {
    /// Load a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml(&contents)?,
            _ => Self::from_yaml(&contents)?,
        };
        config
            .validate()
            .with_context(|| format!("Invalid configuration in {:?}", path))?;
        Ok(config)
    }

    /// Parse a configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document deserializes to unit, not an empty map
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).context("Failed to parse YAML configuration")
    }

    /// Parse a configuration from TOML string
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse TOML configuration")
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize configuration to YAML")
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = self.to_yaml()?;
        fs::write(path.as_ref(), yaml)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if self.generation.length == 0 {
            bail!("generation.length must be at least 1");
        }
        if self.analysis.iterations == 0 {
            bail!("analysis.iterations must be at least 1");
        }
        if let Some(tolerance) = self.analysis.tolerance {
            if !(tolerance > 0.0) {
                bail!("analysis.tolerance must be positive, got {}", tolerance);
            }
        }
        for (name, value) in [
            ("analysis.edge_threshold", self.analysis.edge_threshold),
            ("analysis.dominant_threshold", self.analysis.dominant_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                bail!("{} must be between 0 and 1, got {}", name, value);
            }
        }
        if self.encoding.gate_divisor == 0 {
            bail!("encoding.gate_divisor must be at least 1");
        }
        if self.encoding.velocity_jitter > 63 {
            bail!(
                "encoding.velocity_jitter must be at most 63, got {}",
                self.encoding.velocity_jitter
            );
        }
        if self.mix.channel > 15 {
            bail!("mix.channel must be 0-15, got {}", self.mix.channel);
        }
        Ok(())
    }

    /// Power iteration runner for the analysis settings
    pub fn power_iteration(&self) -> PowerIteration {
        let runner = PowerIteration::new(self.analysis.iterations);
        match self.analysis.tolerance {
            Some(tolerance) => runner.with_tolerance(tolerance),
            None => runner,
        }
    }

    /// Exporter for a source file under the encoding settings
    pub fn exporter(&self, metadata: &SourceMetadata) -> MidiExporter {
        let mut exporter = MidiExporter::for_source(metadata);
        exporter.set_velocity_jitter(self.encoding.velocity_jitter);
        exporter.set_gate_divisor(self.encoding.gate_divisor);
        exporter
    }

    /// Remix options
    pub fn mix_options(&self) -> MixOptions {
        MixOptions {
            channel: self.mix.channel,
            octaves: self.mix.octaves,
            track_name: self.mix.track_name.clone(),
        }
    }
}

/// Melody generation settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationConfig {
    /// Events generated after the two seed events
    #[serde(default = "default_length")]
    pub length: usize,
    /// RNG seed (None = from entropy)
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_length() -> usize {
    500
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            length: default_length(),
            seed: None,
        }
    }
}

/// Pitch-class analysis settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisConfig {
    /// Power iterations
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    /// Early-exit tolerance (None = always run every iteration)
    #[serde(default)]
    pub tolerance: Option<f64>,
    /// Minimum probability for a typical transition
    #[serde(default = "default_edge_threshold")]
    pub edge_threshold: f64,
    /// Minimum stationary weight for a dominant pitch class
    #[serde(default = "default_dominant_threshold")]
    pub dominant_threshold: f64,
}

fn default_iterations() -> usize {
    DEFAULT_ITERATIONS
}
fn default_edge_threshold() -> f64 {
    0.20
}
fn default_dominant_threshold() -> f64 {
    0.10
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            tolerance: None,
            edge_threshold: default_edge_threshold(),
            dominant_threshold: default_dominant_threshold(),
        }
    }
}

/// Output file settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputConfig {
    /// Directory for all written files
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
}

fn default_directory() -> PathBuf {
    PathBuf::from("output")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
        }
    }
}

/// MIDI writing settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EncodingConfig {
    /// Maximum velocity offset in either direction
    #[serde(default = "default_velocity_jitter")]
    pub velocity_jitter: u8,
    /// Note length is ticks per beat divided by this
    #[serde(default = "default_gate_divisor")]
    pub gate_divisor: u16,
}

fn default_velocity_jitter() -> u8 {
    5
}
fn default_gate_divisor() -> u16 {
    2
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            velocity_jitter: default_velocity_jitter(),
            gate_divisor: default_gate_divisor(),
        }
    }
}

/// Remix utility settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MixConfig {
    /// Channel for the melody tracks (0-15)
    #[serde(default = "default_mix_channel")]
    pub channel: u8,
    /// Octaves to transpose the melody by
    #[serde(default = "default_mix_octaves")]
    pub octaves: i8,
    /// Name of the inserted tracks
    #[serde(default = "default_track_name")]
    pub track_name: String,
}

fn default_mix_channel() -> u8 {
    2
}
fn default_mix_octaves() -> i8 {
    1
}
fn default_track_name() -> String {
    "Markov Melody".to_string()
}

impl Default for MixConfig {
    fn default() -> Self {
        Self {
            channel: default_mix_channel(),
            octaves: default_mix_octaves(),
            track_name: default_track_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let yaml = r#"
generation:
  length: 64
  seed: 7

analysis:
  iterations: 50
  tolerance: 0.000001
  edge_threshold: 0.3

output:
  directory: "renders"

mix:
  channel: 5
  octaves: -1
"#;

        let config = RemixConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.generation.length, 64);
        assert_eq!(config.generation.seed, Some(7));
        assert_eq!(config.analysis.iterations, 50);
        assert_eq!(config.analysis.tolerance, Some(0.000001));
        assert_eq!(config.analysis.edge_threshold, 0.3);
        assert_eq!(config.analysis.dominant_threshold, 0.10);
        assert_eq!(config.output.directory, PathBuf::from("renders"));
        assert_eq!(config.mix.channel, 5);
        assert_eq!(config.mix.octaves, -1);
        assert_eq!(config.mix.track_name, "Markov Melody");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_values() {
        let config = RemixConfig::from_yaml("").unwrap();
        assert_eq!(config, RemixConfig::default());
        assert_eq!(config.generation.length, 500);
        assert_eq!(config.generation.seed, None);
        assert_eq!(config.analysis.iterations, 200);
        assert_eq!(config.analysis.tolerance, None);
        assert_eq!(config.analysis.edge_threshold, 0.20);
        assert_eq!(config.output.directory, PathBuf::from("output"));
        assert_eq!(config.encoding.velocity_jitter, 5);
        assert_eq!(config.encoding.gate_divisor, 2);
        assert_eq!(config.mix.channel, 2);
        assert_eq!(config.mix.octaves, 1);
    }

    #[test]
    fn test_partial_section() {
        let config = RemixConfig::from_yaml("encoding:\n  velocity_jitter: 0\n").unwrap();
        assert_eq!(config.encoding.velocity_jitter, 0);
        assert_eq!(config.encoding.gate_divisor, 2);
    }

    #[test]
    fn test_parse_toml() {
        let text = r#"
[generation]
length = 32

[analysis]
iterations = 10
"#;
        let config = RemixConfig::from_toml(text).unwrap();
        assert_eq!(config.generation.length, 32);
        assert_eq!(config.analysis.iterations, 10);
        assert_eq!(config.mix, MixConfig::default());
    }

    #[test]
    fn test_validation() {
        let mut config = RemixConfig::default();
        assert!(config.validate().is_ok());

        config.mix.channel = 16;
        assert!(config.validate().is_err());

        let mut config = RemixConfig::default();
        config.analysis.edge_threshold = 1.5;
        assert!(config.validate().is_err());

        let mut config = RemixConfig::default();
        config.generation.length = 0;
        assert!(config.validate().is_err());

        let mut config = RemixConfig::default();
        config.analysis.tolerance = Some(0.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_round_trip() {
        let mut original = RemixConfig::default();
        original.generation.seed = Some(1234);
        original.mix.track_name = "Lead".to_string();

        let yaml = original.to_yaml().unwrap();
        let parsed = RemixConfig::from_yaml(&yaml).unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_load_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let toml_path = dir.path().join("remix.toml");
        fs::write(&toml_path, "[generation]\nlength = 12\n").unwrap();
        assert_eq!(RemixConfig::load(&toml_path).unwrap().generation.length, 12);

        let yaml_path = dir.path().join("remix.yaml");
        RemixConfig::default().save(&yaml_path).unwrap();
        assert_eq!(RemixConfig::load(&yaml_path).unwrap(), RemixConfig::default());

        let bad_path = dir.path().join("bad.yaml");
        fs::write(&bad_path, "mix:\n  channel: 40\n").unwrap();
        assert!(RemixConfig::load(&bad_path).is_err());
    }

    #[test]
    fn test_derived_settings() {
        let mut config = RemixConfig::default();
        config.analysis.tolerance = Some(1e-8);
        config.encoding.velocity_jitter = 0;

        let runner = config.power_iteration();
        assert_eq!(runner.iterations(), 200);
        assert_eq!(runner.tolerance(), Some(1e-8));

        let exporter = config.exporter(&SourceMetadata::default());
        assert_eq!(exporter.velocity_jitter(), 0);
        assert_eq!(exporter.note_length(), 240);

        assert_eq!(config.mix_options(), MixOptions::default());
    }
}
