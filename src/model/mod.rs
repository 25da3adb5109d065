// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Second-order Markov model of melodic motion.
//!
//! This module provides:
//! - The note event data model shared by every stage
//! - Training of the pitch-pair transition table
//! - Generation of new sequences from a trained table

pub mod chain;
pub mod event;
pub mod generate;

pub use chain::{train, Context, TransitionTable};
pub use event::{EventSequence, NoteEvent, MIN_MODEL_EVENTS};
pub use generate::SequenceGenerator;

use thiserror::Error;

/// Errors raised at the boundary of the modeling core
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    /// The sequence is too short to derive a single context
    #[error("insufficient data: {len} note events, at least {} required", MIN_MODEL_EVENTS)]
    InsufficientData { len: usize },
    /// Generation was requested from a table with no contexts
    #[error("cannot generate from an empty transition table")]
    EmptyModel,
}
