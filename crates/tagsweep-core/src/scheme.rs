//! # Encoding Scheme
//!
//! The immutable configuration object shared by every encoding and decoding
//! component. Character set, tag set, word width and the reserved-index
//! convention live here instead of in process-wide constants, so several
//! schemes can coexist (e.g. in tests) without interfering.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TagsweepError};

/// Lowercase ASCII letters, the default character set.
pub const DEFAULT_CHARACTERS: &str = "abcdefghijklmnopqrstuvwxyz";

/// Digits appended by [`EncodingScheme::with_digits`].
pub const DIGITS: &str = "0123456789";

/// Default maximum number of characters encoded per token.
pub const DEFAULT_MAX_WORD_SIZE: usize = 15;

/// Default tag set.
pub const DEFAULT_TAGS: &[&str] = &["PRN", "VRB", "ART", "NOUN"];

/// Label reported when no tag wins decoding.
pub const NO_TAG: &str = "NO TAG";

/// How tag classes are laid out in the one-hot tag vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexConvention {
    /// Index 0 is the padding / unknown class; real tags occupy `1..=M`.
    /// The decoder never lets index 0 win.
    #[default]
    ZeroReserved,
    /// Real tags occupy `0..M`; padding and unknown tags encode as all-zero
    /// vectors. Use together with a decode threshold to reject weak rows.
    ZeroIsFirstClass,
}

/// What an empty character slot (padding or unknown character) looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharSlotFill {
    /// One-hot at index 0.
    #[default]
    ZeroHot,
    /// All-zero row.
    Blank,
}

/// Where placeholder tokens go when a sentence is shorter than the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PadPosition {
    /// Placeholders first, real tokens at the end of the window.
    #[default]
    Leading,
    /// Real tokens first, placeholders at the end of the window.
    Trailing,
}

/// How a sentence is turned into fixed-length sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SequenceMode {
    /// One sequence per sentence, padded or truncated (keeping the first
    /// `time_steps` tokens) to exactly `time_steps`.
    PadTruncate {
        /// Placeholder position.
        pad: PadPosition,
    },
    /// One window per token (stride 1) over the sentence with
    /// `time_steps - 1` leading placeholders; only the last slot of each
    /// window is predicted.
    SlidingWindow,
}

impl Default for SequenceMode {
    fn default() -> Self {
        SequenceMode::PadTruncate {
            pad: PadPosition::Leading,
        }
    }
}

/// Fixed encoding scheme for one deployed tagger configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingScheme {
    /// Recognized characters, in index order (index 0 is reserved).
    pub characters: String,
    /// Recognized tag labels, in index order.
    pub tags: Vec<String>,
    /// Characters encoded per token; longer tokens are truncated.
    pub max_word_size: usize,
    /// Reserved-index convention for tag vectors.
    pub index_convention: IndexConvention,
    /// Encoding of empty character slots.
    pub char_slot_fill: CharSlotFill,
    /// Whole-sentence or sliding-window sequences.
    pub sequence_mode: SequenceMode,
    /// Minimum winning score; below it the decoder reports [`NO_TAG`].
    pub threshold: Option<f32>,
}

impl Default for EncodingScheme {
    fn default() -> Self {
        Self {
            characters: DEFAULT_CHARACTERS.to_string(),
            tags: DEFAULT_TAGS.iter().map(|t| t.to_string()).collect(),
            max_word_size: DEFAULT_MAX_WORD_SIZE,
            index_convention: IndexConvention::default(),
            char_slot_fill: CharSlotFill::default(),
            sequence_mode: SequenceMode::default(),
            threshold: None,
        }
    }
}

impl EncodingScheme {
    /// Create a scheme with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the tag set.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the character set.
    pub fn with_characters(mut self, characters: impl Into<String>) -> Self {
        self.characters = characters.into();
        self
    }

    /// Append the ASCII digits to the character set.
    pub fn with_digits(mut self) -> Self {
        for d in DIGITS.chars() {
            if !self.characters.contains(d) {
                self.characters.push(d);
            }
        }
        self
    }

    /// Set the maximum encoded word width.
    pub fn with_max_word_size(mut self, max_word_size: usize) -> Self {
        self.max_word_size = max_word_size;
        self
    }

    /// Set the reserved-index convention.
    pub fn with_index_convention(mut self, convention: IndexConvention) -> Self {
        self.index_convention = convention;
        self
    }

    /// Set the empty character slot encoding.
    pub fn with_char_slot_fill(mut self, fill: CharSlotFill) -> Self {
        self.char_slot_fill = fill;
        self
    }

    /// Set the sequence mode.
    pub fn with_sequence_mode(mut self, mode: SequenceMode) -> Self {
        self.sequence_mode = mode;
        self
    }

    /// Set the decode threshold.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = Some(threshold);
        self
    }

    /// Number of character classes, including reserved index 0.
    pub fn char_encoding_size(&self) -> usize {
        self.characters.chars().count() + 1
    }

    /// Length of one tag vector.
    pub fn tag_encoding_size(&self) -> usize {
        match self.index_convention {
            IndexConvention::ZeroReserved => self.tags.len() + 1,
            IndexConvention::ZeroIsFirstClass => self.tags.len(),
        }
    }

    /// Length of one flattened encoded word.
    pub fn word_vector_size(&self) -> usize {
        self.max_word_size * self.char_encoding_size()
    }

    /// Check the scheme is usable.
    pub fn validate(&self) -> Result<()> {
        if self.tags.is_empty() {
            return Err(TagsweepError::InvalidScheme("tag set is empty".into()));
        }
        if self.max_word_size == 0 {
            return Err(TagsweepError::InvalidScheme(
                "max_word_size must be positive".into(),
            ));
        }
        let mut seen = std::collections::HashSet::new();
        for c in self.characters.chars() {
            if c.is_uppercase() || c.is_whitespace() {
                return Err(TagsweepError::InvalidScheme(format!(
                    "character {c:?} can never match a lowercased token"
                )));
            }
            if !seen.insert(c) {
                return Err(TagsweepError::InvalidScheme(format!(
                    "duplicate character {c:?}"
                )));
            }
        }
        let mut seen = std::collections::HashSet::new();
        for tag in &self.tags {
            if tag.is_empty() || tag == NO_TAG {
                return Err(TagsweepError::InvalidScheme(format!(
                    "reserved tag label {tag:?}"
                )));
            }
            if !seen.insert(tag.as_str()) {
                return Err(TagsweepError::InvalidScheme(format!("duplicate tag {tag:?}")));
            }
        }
        if let Some(t) = self.threshold {
            if !t.is_finite() {
                return Err(TagsweepError::InvalidScheme(
                    "threshold must be finite".into(),
                ));
            }
        }
        Ok(())
    }
}
