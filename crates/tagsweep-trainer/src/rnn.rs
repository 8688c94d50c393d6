//! Simple recurrent tagger on candle.
//!
//! `h_t = tanh(W_x x_t + b + W_h h_{t-1})`, followed by a per-step linear
//! projection to tag scores. Trained with AdamW on softmax cross-entropy
//! against the one-hot targets.

use std::path::Path;

use candle_core::{D, DType, Device, Module, Tensor};
use candle_nn::optim::{AdamW, ParamsAdamW};
use candle_nn::{Linear, Optimizer, VarBuilder, VarMap, linear, linear_no_bias, ops};
use tracing::debug;

use crate::error::Result;
use crate::model::{ModelBuilder, ModelSpec, SequenceModel, WEIGHTS_FILE};

pub struct RnnTagger {
    varmap: VarMap,
    input: Linear,
    recurrent: Linear,
    output: Linear,
    optimizer: AdamW,
    rnn_size: usize,
}

impl RnnTagger {
    pub fn new(spec: &ModelSpec, learning_rate: f64, device: &Device) -> Result<Self> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, device);

        let input = linear(spec.input_size, spec.rnn_size, vb.pp("rnn.input"))?;
        let recurrent = linear_no_bias(spec.rnn_size, spec.rnn_size, vb.pp("rnn.recurrent"))?;
        let output = linear(spec.rnn_size, spec.output_size, vb.pp("output"))?;

        let optimizer = AdamW::new(
            varmap.all_vars(),
            ParamsAdamW {
                lr: learning_rate,
                ..Default::default()
            },
        )?;

        Ok(Self {
            varmap,
            input,
            recurrent,
            output,
            optimizer,
            rnn_size: spec.rnn_size,
        })
    }

    /// Unnormalized tag scores, `[batch, time_steps, output_size]`.
    fn logits(&self, xs: &Tensor) -> candle_core::Result<Tensor> {
        let (batch, steps, _) = xs.dims3()?;
        let projected = self.input.forward(xs)?;

        let mut h = Tensor::zeros((batch, self.rnn_size), DType::F32, xs.device())?;
        let mut states = Vec::with_capacity(steps);
        for t in 0..steps {
            let x_t = projected.narrow(1, t, 1)?.squeeze(1)?;
            h = (x_t + self.recurrent.forward(&h)?)?.tanh()?;
            states.push(h.clone());
        }

        let hidden = Tensor::stack(&states, 1)?;
        self.output.forward(&hidden)
    }
}

impl SequenceModel for RnnTagger {
    fn fit(&mut self, inputs: &Tensor, targets: &Tensor, epochs: usize) -> Result<()> {
        for epoch in 0..epochs {
            let log_probs = ops::log_softmax(&self.logits(inputs)?, D::Minus1)?;
            let loss = (targets * log_probs)?.sum(D::Minus1)?.neg()?.mean_all()?;
            self.optimizer.backward_step(&loss)?;

            if (epoch + 1) % 50 == 0 || epoch + 1 == epochs {
                debug!(
                    epoch = epoch + 1,
                    epochs,
                    loss = loss.to_scalar::<f32>()?,
                    "fit progress"
                );
            }
        }
        Ok(())
    }

    fn predict(&self, inputs: &Tensor) -> Result<Tensor> {
        Ok(ops::softmax(&self.logits(inputs)?, D::Minus1)?)
    }

    fn save(&self, dir: &Path) -> Result<()> {
        self.varmap.save(dir.join(WEIGHTS_FILE))?;
        Ok(())
    }
}

/// Builds [`RnnTagger`]s on one device with one learning rate.
#[derive(Debug, Clone)]
pub struct RnnBuilder {
    device: Device,
    learning_rate: f64,
}

impl RnnBuilder {
    pub fn new(device: Device, learning_rate: f64) -> Self {
        Self {
            device,
            learning_rate,
        }
    }

    /// CPU builder.
    pub fn cpu(learning_rate: f64) -> Self {
        Self::new(Device::Cpu, learning_rate)
    }
}

impl ModelBuilder for RnnBuilder {
    type Model = RnnTagger;

    fn device(&self) -> &Device {
        &self.device
    }

    fn build(&self, spec: &ModelSpec) -> Result<RnnTagger> {
        RnnTagger::new(spec, self.learning_rate, &self.device)
    }

    fn load(&self, spec: &ModelSpec, dir: &Path) -> Result<RnnTagger> {
        let mut model = self.build(spec)?;
        model.varmap.load(dir.join(WEIGHTS_FILE))?;
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> ModelSpec {
        ModelSpec {
            time_steps: 3,
            input_size: 4,
            output_size: 2,
            rnn_size: 8,
        }
    }

    fn toy_batch() -> (Tensor, Tensor) {
        // Step label is 1 exactly when input feature 0 is set.
        let inputs: Vec<f32> = vec![
            1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0,
        ];
        let targets: Vec<f32> = vec![
            0.0, 1.0, 1.0, 0.0, 0.0, 1.0, //
            1.0, 0.0, 0.0, 1.0, 1.0, 0.0,
        ];
        (
            Tensor::from_vec(inputs, (2, 3, 4), &Device::Cpu).unwrap(),
            Tensor::from_vec(targets, (2, 3, 2), &Device::Cpu).unwrap(),
        )
    }

    #[test]
    fn predict_shape_and_normalization() {
        let model = RnnBuilder::cpu(0.05).build(&spec()).unwrap();
        let (inputs, _) = toy_batch();
        let scores = model.predict(&inputs).unwrap();
        assert_eq!(scores.dims(), &[2, 3, 2]);

        let rows: Vec<Vec<Vec<f32>>> = scores.to_vec3().unwrap();
        for row in rows.iter().flatten() {
            let sum: f32 = row.iter().sum();
            assert!((sum - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn fit_learns_toy_rule() {
        let mut model = RnnBuilder::cpu(0.05).build(&spec()).unwrap();
        let (inputs, targets) = toy_batch();
        model.fit(&inputs, &targets, 200).unwrap();

        let predicted = model.predict(&inputs).unwrap().argmax(D::Minus1).unwrap();
        let expected = targets.argmax(D::Minus1).unwrap();
        let predicted: Vec<Vec<u32>> = predicted.to_vec2().unwrap();
        let expected: Vec<Vec<u32>> = expected.to_vec2().unwrap();
        assert_eq!(predicted, expected);
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let builder = RnnBuilder::cpu(0.05);
        let mut model = builder.build(&spec()).unwrap();
        let (inputs, targets) = toy_batch();
        model.fit(&inputs, &targets, 5).unwrap();
        model.save(dir.path()).unwrap();

        let loaded = builder.load(&spec(), dir.path()).unwrap();
        let a: Vec<Vec<Vec<f32>>> = model.predict(&inputs).unwrap().to_vec3().unwrap();
        let b: Vec<Vec<Vec<f32>>> = loaded.predict(&inputs).unwrap().to_vec3().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn load_without_weights_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(RnnBuilder::cpu(0.05).load(&spec(), dir.path()).is_err());
    }
}
