//! # tagsweep trainer
//!
//! Sweeps recurrent tagger hyperparameters over a labelled corpus. Each
//! configuration is trained (or reused from disk), evaluated token by token,
//! and persisted with a stats record; the Ranking Reporter then orders every
//! persisted model by hit ratio.
//!
//! The network itself sits behind [`ModelBuilder`] / [`SequenceModel`];
//! [`RnnBuilder`] is the candle-backed simple RNN used by the CLI.

pub mod config;
pub mod driver;
pub mod error;
pub mod model;
pub mod probe;
pub mod rank;
pub mod rnn;
pub mod sweep;

pub use config::{ConfigFile, SweepConfig, TrainerConfig};
pub use driver::{Driver, META_FILE, ModelMeta, TrainedModel};
pub use error::{Result, TrainerError};
pub use model::{ModelBuilder, ModelSpec, SequenceModel, WEIGHTS_FILE};
pub use probe::{ProbeResult, probe};
pub use rank::{RankedModel, RankingReport, RankingReporter};
pub use rnn::{RnnBuilder, RnnTagger};
pub use sweep::{SweepOutcome, run_sweep};
