//! # Model identifiers
//!
//! A trained model is keyed by the scheme sizes plus its hyperparameters:
//!
//! ```text
//! model_{charEncodingSize}_{maxWordSize}_{tagVectorSize}_{rnnSize}_{timeSteps}_{epochs}_{maxBatch}
//! ```
//!
//! The field order and count are part of the on-disk format.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TagsweepError};
use crate::scheme::EncodingScheme;

/// The swept hyperparameters. One config identifies exactly one model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HyperparameterConfig {
    /// Width of the recurrent layer.
    pub rnn_size: usize,
    /// Window length every sequence is normalized to.
    pub time_steps: usize,
    /// Training epochs per batch.
    pub epochs: usize,
}

impl HyperparameterConfig {
    pub fn new(rnn_size: usize, time_steps: usize, epochs: usize) -> Self {
        Self {
            rnn_size,
            time_steps,
            epochs,
        }
    }
}

impl fmt::Display for HyperparameterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rnn={} ts={} epochs={}",
            self.rnn_size, self.time_steps, self.epochs
        )
    }
}

/// Stable identifier of a trained model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelId {
    pub char_encoding_size: usize,
    pub max_word_size: usize,
    pub tag_vector_size: usize,
    pub rnn_size: usize,
    pub time_steps: usize,
    pub epochs: usize,
    pub max_batch: usize,
}

impl ModelId {
    /// Derive the identifier for `config` under `scheme`.
    pub fn new(scheme: &EncodingScheme, config: &HyperparameterConfig, max_batch: usize) -> Self {
        Self {
            char_encoding_size: scheme.char_encoding_size(),
            max_word_size: scheme.max_word_size,
            tag_vector_size: scheme.tag_encoding_size(),
            rnn_size: config.rnn_size,
            time_steps: config.time_steps,
            epochs: config.epochs,
            max_batch,
        }
    }

    /// The hyperparameters embedded in the identifier.
    pub fn config(&self) -> HyperparameterConfig {
        HyperparameterConfig::new(self.rnn_size, self.time_steps, self.epochs)
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "model_{}_{}_{}_{}_{}_{}_{}",
            self.char_encoding_size,
            self.max_word_size,
            self.tag_vector_size,
            self.rnn_size,
            self.time_steps,
            self.epochs,
            self.max_batch
        )
    }
}

/// Fixed-field parser for [`ModelId`] strings.
#[derive(Debug, Clone)]
pub struct ModelIdParser {
    re: Regex,
}

impl ModelIdParser {
    /// # Errors
    ///
    /// Returns `TagsweepError::Regex` if the pattern fails to compile
    /// (should never happen with the static pattern defined here).
    pub fn new() -> Result<Self> {
        Ok(Self {
            re: Regex::new(r"^model_(\d+)_(\d+)_(\d+)_(\d+)_(\d+)_(\d+)_(\d+)$")?,
        })
    }

    pub fn parse(&self, s: &str) -> Result<ModelId> {
        let invalid = || TagsweepError::InvalidModelId(s.to_string());
        let caps = self.re.captures(s).ok_or_else(invalid)?;
        let field = |i: usize| -> Result<usize> { caps[i].parse().map_err(|_| invalid()) };

        Ok(ModelId {
            char_encoding_size: field(1)?,
            max_word_size: field(2)?,
            tag_vector_size: field(3)?,
            rnn_size: field(4)?,
            time_steps: field(5)?,
            epochs: field(6)?,
            max_batch: field(7)?,
        })
    }
}

impl std::str::FromStr for ModelId {
    type Err = TagsweepError;

    fn from_str(s: &str) -> Result<Self> {
        ModelIdParser::new()?.parse(s)
    }
}
