//! Trainer, sweep and config-file settings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tagsweep_core::{EncodingScheme, HyperparameterConfig};

use crate::error::{Result, TrainerError};

/// Settings for the Trainer/Evaluator Driver and the reports it writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Directory holding one subdirectory per trained model.
    pub models_dir: PathBuf,
    /// Maximum number of records per training batch.
    pub max_batch: usize,
    /// Optimizer learning rate for the reference model.
    pub learning_rate: f64,
    /// Structured ranking report.
    pub report_json: PathBuf,
    /// Tabular ranking report.
    pub report_csv: PathBuf,
    /// Log appended to by single-sentence probes.
    pub probe_log: PathBuf,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            models_dir: PathBuf::from("models"),
            max_batch: 100,
            learning_rate: 0.01,
            report_json: PathBuf::from("stats.json"),
            report_csv: PathBuf::from("stats.csv"),
            probe_log: PathBuf::from("tests.csv"),
        }
    }
}

impl TrainerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_models_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.models_dir = dir.into();
        self
    }

    /// Set the batch size; clamped to at least 1.
    pub fn with_max_batch(mut self, max_batch: usize) -> Self {
        self.max_batch = max_batch.max(1);
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_report_json(mut self, path: impl Into<PathBuf>) -> Self {
        self.report_json = path.into();
        self
    }

    pub fn with_report_csv(mut self, path: impl Into<PathBuf>) -> Self {
        self.report_csv = path.into();
        self
    }

    pub fn with_probe_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.probe_log = path.into();
        self
    }
}

/// Value sets swept by the Sweep Controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub rnn_sizes: Vec<usize>,
    pub time_steps: Vec<usize>,
    pub epochs: Vec<usize>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            rnn_sizes: vec![60],
            time_steps: vec![15, 20, 25],
            epochs: vec![100, 200, 300],
        }
    }
}

impl SweepConfig {
    pub fn new(rnn_sizes: Vec<usize>, time_steps: Vec<usize>, epochs: Vec<usize>) -> Self {
        Self {
            rnn_sizes,
            time_steps,
            epochs,
        }
    }

    /// Every combination in nested-loop order: rnn size varies slowest,
    /// epochs fastest.
    pub fn combinations(&self) -> impl Iterator<Item = HyperparameterConfig> + '_ {
        self.rnn_sizes.iter().flat_map(move |&rnn_size| {
            self.time_steps.iter().flat_map(move |&time_steps| {
                self.epochs
                    .iter()
                    .map(move |&epochs| HyperparameterConfig::new(rnn_size, time_steps, epochs))
            })
        })
    }

    pub fn len(&self) -> usize {
        self.rnn_sizes.len() * self.time_steps.len() * self.epochs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Optional JSON config file; every section falls back to its defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub scheme: EncodingScheme,
    pub trainer: TrainerConfig,
    pub sweep: SweepConfig,
}

impl ConfigFile {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(TrainerError::io(path))?;
        serde_json::from_str(&content).map_err(TrainerError::json(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combinations_in_nested_loop_order() {
        let sweep = SweepConfig::new(vec![10, 30], vec![5, 10], vec![100, 200]);
        let combos: Vec<_> = sweep.combinations().collect();
        assert_eq!(combos.len(), sweep.len());
        assert_eq!(combos[0], HyperparameterConfig::new(10, 5, 100));
        assert_eq!(combos[1], HyperparameterConfig::new(10, 5, 200));
        assert_eq!(combos[2], HyperparameterConfig::new(10, 10, 100));
        assert_eq!(combos[4], HyperparameterConfig::new(30, 5, 100));
        assert_eq!(combos[7], HyperparameterConfig::new(30, 10, 200));
    }

    #[test]
    fn default_sweep() {
        let sweep = SweepConfig::default();
        assert_eq!(sweep.len(), 9);
        assert!(sweep.combinations().all(|c| c.rnn_size == 60));
    }

    #[test]
    fn empty_axis_yields_nothing() {
        let sweep = SweepConfig::new(vec![10], vec![], vec![100]);
        assert!(sweep.is_empty());
        assert_eq!(sweep.combinations().count(), 0);
    }

    #[test]
    fn max_batch_is_clamped() {
        assert_eq!(TrainerConfig::new().with_max_batch(0).max_batch, 1);
    }

    #[test]
    fn loads_partial_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tagsweep.json");
        std::fs::write(
            &path,
            r#"{"sweep": {"rnn_sizes": [30]}, "trainer": {"max_batch": 8}, "scheme": {"threshold": 0.5}}"#,
        )
        .unwrap();

        let config = ConfigFile::load(&path).unwrap();
        assert_eq!(config.sweep.rnn_sizes, vec![30]);
        assert_eq!(config.sweep.time_steps, vec![15, 20, 25]);
        assert_eq!(config.trainer.max_batch, 8);
        assert_eq!(config.trainer.models_dir, PathBuf::from("models"));
        assert_eq!(config.scheme.threshold, Some(0.5));
    }

    #[test]
    fn missing_config_file_is_an_error() {
        assert!(ConfigFile::load("/no/such/tagsweep.json").is_err());
    }
}
