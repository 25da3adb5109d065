// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Melody remixing with a second-order Markov chain.
//!
//! A Standard MIDI File is decoded into note events, analyzed as a chain of
//! pitch classes, and used to train a transition table over pitch pairs. The
//! table then generates a new melody that is written back out as MIDI.

pub mod analysis;
pub mod config;
pub mod midi;
pub mod model;
pub mod pipeline;
pub mod render;
