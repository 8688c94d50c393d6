//! # tagsweep core
//!
//! The deterministic half of the tagsweep pipeline: turning sentences and
//! tag lists into fixed-shape one-hot frames, turning model scores back
//! into tag labels, and the on-disk formats (model identifiers, stats
//! records) the sweep and ranking stages agree on.
//!
//! ## Quick Start
//!
//! ```rust
//! use tagsweep_core::{EncodingScheme, SequenceBuilder, TaggedRecord};
//!
//! let scheme = EncodingScheme::default();
//! let builder = SequenceBuilder::new(&scheme, 5).unwrap();
//!
//! let record = TaggedRecord::new("He is a person", ["PRN", "VRB", "ART", "NOUN"]);
//! let pair = builder.build_pair(&record).unwrap();
//!
//! assert_eq!(pair.inputs[0].rows(), 5);
//! assert_eq!(pair.targets[0].rows(), 5);
//! ```
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod frames;
pub mod model_id;
pub mod record;
pub mod scheme;
pub mod sequence;
pub mod stats;
pub mod tokenizer;
pub mod vocab;

// Re-export primary API
pub use decoder::Decoder;
pub use encoder::{EncodedWord, TokenEncoder};
pub use error::{Result, TagsweepError};
pub use frames::{Frames, stack_frames};
pub use model_id::{HyperparameterConfig, ModelId, ModelIdParser};
pub use record::{TaggedRecord, load_records};
pub use scheme::{
    CharSlotFill, EncodingScheme, IndexConvention, NO_TAG, PadPosition, SequenceMode,
};
pub use sequence::{EncodedPair, SequenceBuilder, fit_length};
pub use stats::{EvalStats, STATS_FILE, StatsParser};
pub use tokenizer::{Token, Tokenizer};
pub use vocab::{CharVocab, TagVocab};
