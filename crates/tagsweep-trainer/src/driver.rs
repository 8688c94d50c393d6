//! # Trainer/Evaluator Driver
//!
//! Trains one model per hyperparameter configuration (or reuses the one
//! already persisted under the same identifier), evaluates it token by
//! token, and writes the per-model stats record next to it.
//!
//! Model directory layout:
//!
//! ```text
//! <models_dir>/<model id>/weights.safetensors   written by the model
//! <models_dir>/<model id>/meta.json             sidecar, written last
//! <models_dir>/<model id>/stats.txt             after evaluation
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use candle_core::Tensor;
use serde::{Deserialize, Serialize};
use tagsweep_core::{
    Decoder, EncodedPair, EncodingScheme, EvalStats, Frames, HyperparameterConfig, ModelId,
    STATS_FILE, SequenceBuilder, SequenceMode, TaggedRecord, TagsweepError, stack_frames,
};
use tracing::{debug, info, warn};

use crate::config::TrainerConfig;
use crate::error::{Result, TrainerError};
use crate::model::{ModelBuilder, ModelSpec, SequenceModel};

/// Sidecar metadata file name.
pub const META_FILE: &str = "meta.json";

/// Structured record written alongside every persisted model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelMeta {
    pub model: String,
    pub scheme: EncodingScheme,
    pub hyperparameters: HyperparameterConfig,
    pub max_batch: usize,
    pub created_at: String,
}

/// A model together with the identifier it is persisted under.
pub struct TrainedModel<M> {
    pub model: M,
    pub id: ModelId,
    /// Whether the model was loaded from disk instead of trained.
    pub reused: bool,
}

/// Orchestrates training, reuse, evaluation and stats persistence.
pub struct Driver<B: ModelBuilder> {
    scheme: EncodingScheme,
    config: TrainerConfig,
    builder: B,
    decoder: Decoder,
}

impl<B: ModelBuilder> Driver<B> {
    /// Create a driver, validating the scheme.
    pub fn new(scheme: EncodingScheme, config: TrainerConfig, builder: B) -> Result<Self> {
        scheme.validate()?;
        let decoder = Decoder::new(&scheme);
        Ok(Self {
            scheme,
            config,
            builder,
            decoder,
        })
    }

    pub fn scheme(&self) -> &EncodingScheme {
        &self.scheme
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    pub fn builder(&self) -> &B {
        &self.builder
    }

    fn max_batch(&self) -> usize {
        self.config.max_batch.max(1)
    }

    /// Identifier for `config` under this driver's scheme and batch size.
    pub fn model_id(&self, config: &HyperparameterConfig) -> ModelId {
        ModelId::new(&self.scheme, config, self.max_batch())
    }

    pub fn model_dir(&self, id: &ModelId) -> PathBuf {
        self.config.models_dir.join(id.to_string())
    }

    pub fn model_spec(&self, config: &HyperparameterConfig) -> ModelSpec {
        ModelSpec {
            time_steps: config.time_steps,
            input_size: self.scheme.word_vector_size(),
            output_size: self.scheme.tag_encoding_size(),
            rnn_size: config.rnn_size,
        }
    }

    pub fn sequence_builder(&self, config: &HyperparameterConfig) -> Result<SequenceBuilder> {
        Ok(SequenceBuilder::new(&self.scheme, config.time_steps)?)
    }

    /// Load the persisted model for `config`, or train and persist a new one.
    ///
    /// A model directory is only reused when its sidecar matches this exact
    /// configuration and its weights load; anything else is retrained.
    pub fn train_or_load(
        &self,
        config: &HyperparameterConfig,
        records: &[TaggedRecord],
    ) -> Result<TrainedModel<B::Model>> {
        let id = self.model_id(config);

        if self.model_dir(&id).exists() {
            match self.load(config) {
                Ok(model) => {
                    info!(model = %id, "reusing persisted model");
                    return Ok(TrainedModel {
                        model,
                        id,
                        reused: true,
                    });
                }
                Err(e) => {
                    warn!(model = %id, error = %e, "persisted model unusable, retraining");
                }
            }
        }

        let model = self.train(config, records)?;
        self.persist(&model, &id, config)?;
        Ok(TrainedModel {
            model,
            id,
            reused: false,
        })
    }

    /// Load the persisted model for `config` without ever training.
    pub fn load(&self, config: &HyperparameterConfig) -> Result<B::Model> {
        let id = self.model_id(config);
        let dir = self.model_dir(&id);
        let meta_path = dir.join(META_FILE);

        let content = match fs::read_to_string(&meta_path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(TrainerError::MissingModel(id.to_string()));
            }
            Err(e) => return Err(TrainerError::io(&meta_path)(e)),
        };
        let meta: ModelMeta =
            serde_json::from_str(&content).map_err(TrainerError::json(&meta_path))?;

        let stale = |reason: &str| TrainerError::StaleModel {
            model: id.to_string(),
            reason: reason.to_string(),
        };
        if meta.model != id.to_string() {
            return Err(stale("identifier differs"));
        }
        if meta.scheme != self.scheme {
            return Err(stale("encoding scheme differs"));
        }
        if meta.hyperparameters != *config || meta.max_batch != self.max_batch() {
            return Err(stale("hyperparameters differ"));
        }

        self.builder.load(&self.model_spec(config), &dir)
    }

    /// Train a fresh model over all records in their original order.
    ///
    /// Records are taken `max_batch` at a time; misaligned records are
    /// dropped from their batch with a warning. Each batch is one fit call
    /// of `config.epochs` epochs on the same model.
    pub fn train(
        &self,
        config: &HyperparameterConfig,
        records: &[TaggedRecord],
    ) -> Result<B::Model> {
        let sequences = self.sequence_builder(config)?;
        let mut model = self.builder.build(&self.model_spec(config))?;
        let batches = records.len().div_ceil(self.max_batch());

        info!(%config, records = records.len(), batches, "training model");

        for (i, batch) in records.chunks(self.max_batch()).enumerate() {
            let pairs = sequences.build_aligned(batch)?;
            let Some((inputs, targets)) = self.stack_pairs(&pairs)? else {
                warn!(batch = i + 1, "batch has no usable records, skipping");
                continue;
            };

            debug!(batch = i + 1, batches, samples = inputs.dims()[0], "fitting batch");
            model.fit(&inputs, &targets, config.epochs)?;
        }

        Ok(model)
    }

    fn stack_pairs(&self, pairs: &[EncodedPair]) -> Result<Option<(Tensor, Tensor)>> {
        let inputs: Vec<_> = pairs.iter().flat_map(|p| p.inputs.iter().cloned()).collect();
        let targets: Vec<_> = pairs.iter().flat_map(|p| p.targets.iter().cloned()).collect();
        if inputs.is_empty() {
            return Ok(None);
        }
        let device = self.builder.device();
        Ok(Some((
            stack_frames(&inputs, device)?,
            stack_frames(&targets, device)?,
        )))
    }

    /// Write the model and its sidecar into its model directory.
    fn persist(&self, model: &B::Model, id: &ModelId, config: &HyperparameterConfig) -> Result<()> {
        let dir = self.model_dir(id);
        fs::create_dir_all(&dir).map_err(TrainerError::io(&dir))?;
        remove_if_exists(&dir.join(STATS_FILE))?;

        model.save(&dir)?;

        let meta = ModelMeta {
            model: id.to_string(),
            scheme: self.scheme.clone(),
            hyperparameters: *config,
            max_batch: self.max_batch(),
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        let json = serde_json::to_string_pretty(&meta).map_err(TrainerError::json(&dir))?;
        write_atomic(&dir.join(META_FILE), json.as_bytes())?;

        info!(model = %id, dir = %dir.display(), "model persisted");
        Ok(())
    }

    /// Predicted labels for one encoded record's tokens.
    pub fn predict_labels(
        &self,
        model: &B::Model,
        pair: &EncodedPair,
        time_steps: usize,
    ) -> Result<Vec<String>> {
        self.predict_frames(model, &pair.inputs, pair.token_count, time_steps)
    }

    /// Predicted labels for an untagged sentence.
    pub fn predict_sentence(
        &self,
        model: &B::Model,
        sentence: &str,
        time_steps: usize,
    ) -> Result<Vec<String>> {
        let sequences = SequenceBuilder::new(&self.scheme, time_steps)?;
        let token_count = sequences.tokenizer().count(sentence);
        let inputs = sequences.build_inputs(sentence)?;
        self.predict_frames(model, &inputs, token_count, time_steps)
    }

    fn predict_frames(
        &self,
        model: &B::Model,
        inputs: &[Frames],
        token_count: usize,
        time_steps: usize,
    ) -> Result<Vec<String>> {
        if inputs.is_empty() || token_count == 0 {
            return Ok(Vec::new());
        }
        let batch = stack_frames(inputs, self.builder.device())?;
        let scores = model.predict(&batch)?;
        let expected = [inputs.len(), time_steps, self.scheme.tag_encoding_size()];
        if scores.dims() != expected {
            return Err(TrainerError::OutputShape(format!(
                "expected {:?}, got {:?}",
                expected,
                scores.dims()
            )));
        }
        let outputs: Vec<Vec<Vec<f32>>> = scores.to_vec3()?;
        Ok(self.decoder.decode_sentence(&outputs, token_count, time_steps))
    }

    /// Ground-truth tags covered by the predictions for `record`.
    fn expected_tags<'r>(&self, record: &'r TaggedRecord, time_steps: usize) -> &'r [String] {
        match self.scheme.sequence_mode {
            SequenceMode::PadTruncate { .. } => {
                &record.tags[..record.tags.len().min(time_steps)]
            }
            SequenceMode::SlidingWindow => &record.tags,
        }
    }

    /// Count per-token hits and misses of `model` over `records`.
    ///
    /// Deterministic for a given model and record order. Misaligned records
    /// are skipped with a warning and contribute nothing.
    pub fn evaluate(
        &self,
        model: &B::Model,
        config: &HyperparameterConfig,
        records: &[TaggedRecord],
    ) -> Result<EvalStats> {
        let sequences = self.sequence_builder(config)?;
        let mut stats = EvalStats::default();

        for record in records {
            let pair = match sequences.build_pair(record) {
                Ok(pair) => pair,
                Err(TagsweepError::Misaligned { tokens, tags, .. }) => {
                    warn!(
                        sentence = %record.sentence,
                        tags = ?record.tags,
                        tokens,
                        tag_count = tags,
                        "skipping misaligned record in evaluation"
                    );
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let predicted = self.predict_labels(model, &pair, config.time_steps)?;
            stats.record_all(self.expected_tags(record, config.time_steps), &predicted);
        }

        info!(
            %config,
            hits = stats.hits,
            misses = stats.misses,
            ratio = stats.ratio().unwrap_or(f64::NAN),
            "evaluation complete"
        );
        Ok(stats)
    }

    /// Write the stats record for `id`, replacing any previous one.
    pub fn write_stats(&self, id: &ModelId, stats: &EvalStats) -> Result<PathBuf> {
        let dir = self.model_dir(id);
        fs::create_dir_all(&dir).map_err(TrainerError::io(&dir))?;
        let path = dir.join(STATS_FILE);
        write_atomic(&path, stats.to_record().as_bytes())?;
        Ok(path)
    }
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, contents).map_err(TrainerError::io(&tmp))?;
    fs::rename(&tmp, path).map_err(TrainerError::io(path))
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != ErrorKind::NotFound => Err(TrainerError::io(path)(e)),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_atomic_replaces_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meta.json");
        write_atomic(&path, b"one").unwrap();
        write_atomic(&path, b"two").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "two");
        assert!(!dir.path().join("meta.json.tmp").exists());
    }

    #[test]
    fn remove_if_exists_tolerates_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STATS_FILE);
        remove_if_exists(&path).unwrap();
        fs::write(&path, "x").unwrap();
        remove_if_exists(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn meta_serializes_camel_case() {
        let meta = ModelMeta {
            model: "model_27_15_5_60_15_100_100".into(),
            scheme: EncodingScheme::default(),
            hyperparameters: HyperparameterConfig::new(60, 15, 100),
            max_batch: 100,
            created_at: "2026-01-01T00:00:00Z".into(),
        };
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["maxBatch"], 100);
        assert_eq!(json["hyperparameters"]["rnnSize"], 60);
        let back: ModelMeta = serde_json::from_value(json).unwrap();
        assert_eq!(back, meta);
    }
}
