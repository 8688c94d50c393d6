//! The trainable sequence model capability the driver is written against.
//!
//! The driver never looks inside a model: it builds one, fits it on stacked
//! batches, asks it for predictions, and saves or loads it from a model
//! directory. Any network that maps `[batch, time_steps, input_size]`
//! inputs to `[batch, time_steps, output_size]` scores can plug in here.

use std::path::Path;

use candle_core::{Device, Tensor};

use crate::error::Result;

/// Weights file written by models into their model directory.
pub const WEIGHTS_FILE: &str = "weights.safetensors";

/// Shape information needed to build a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelSpec {
    /// Sequence length of every input.
    pub time_steps: usize,
    /// Width of one input step (one encoded word).
    pub input_size: usize,
    /// Width of one output step (one tag vector).
    pub output_size: usize,
    /// Recurrent layer width.
    pub rnn_size: usize,
}

/// A model that can be fitted, queried and persisted.
pub trait SequenceModel {
    /// Train on `inputs` `[n, time_steps, input_size]` against one-hot
    /// `targets` `[n, time_steps, output_size]` for `epochs` passes.
    /// Blocks until training completes; state carries over between calls.
    fn fit(&mut self, inputs: &Tensor, targets: &Tensor, epochs: usize) -> Result<()>;

    /// Scores `[n, time_steps, output_size]` for `inputs`.
    fn predict(&self, inputs: &Tensor) -> Result<Tensor>;

    /// Write the model into `dir`, which already exists.
    fn save(&self, dir: &Path) -> Result<()>;
}

/// Constructs fresh models and restores persisted ones.
pub trait ModelBuilder {
    type Model: SequenceModel;

    /// Device tensors for this model family live on.
    fn device(&self) -> &Device;

    /// A new, untrained model.
    fn build(&self, spec: &ModelSpec) -> Result<Self::Model>;

    /// A model previously written by [`SequenceModel::save`] into `dir`.
    fn load(&self, spec: &ModelSpec, dir: &Path) -> Result<Self::Model>;
}
