//! # tagsweep
//!
//! Character-level part-of-speech tagging over fixed-length token windows,
//! with a hyperparameter sweep and accuracy ranking on top.
//!
//! This crate only re-exports [`tagsweep_core`] (encoding, decoding, model
//! identifiers) and [`tagsweep_trainer`] (training driver, sweep, ranking).

pub use tagsweep_core;
pub use tagsweep_trainer;

pub use tagsweep_core::{
    Decoder, EncodingScheme, HyperparameterConfig, ModelId, SequenceBuilder, TokenEncoder,
};
pub use tagsweep_trainer::{Driver, RankingReport, SweepConfig, TrainerConfig};
