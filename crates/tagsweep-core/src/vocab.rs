//! Character and tag lookup tables.

use std::collections::HashMap;

use crate::scheme::{EncodingScheme, IndexConvention};

/// Character vocabulary for encoding tokens.
///
/// Index 0 is reserved for padding and unknown characters; recognized
/// characters take indices `1..=N` in scheme order.
#[derive(Debug, Clone)]
pub struct CharVocab {
    char_to_idx: HashMap<char, usize>,
    max_word_size: usize,
}

impl CharVocab {
    pub fn new(scheme: &EncodingScheme) -> Self {
        let char_to_idx = scheme
            .characters
            .chars()
            .enumerate()
            .map(|(i, c)| (c, i + 1))
            .collect();

        Self {
            char_to_idx,
            max_word_size: scheme.max_word_size,
        }
    }

    /// Index of a single (already lowercased) character, 0 when unknown.
    pub fn index(&self, c: char) -> usize {
        self.char_to_idx.get(&c).copied().unwrap_or(0)
    }

    /// Lowercase `token` and map it to exactly `max_word_size` indices,
    /// truncating long tokens and padding short ones with 0.
    pub fn encode(&self, token: &str) -> Vec<usize> {
        let mut indices: Vec<usize> = token
            .to_lowercase()
            .chars()
            .take(self.max_word_size)
            .map(|c| self.index(c))
            .collect();
        indices.resize(self.max_word_size, 0);
        indices
    }

    /// Number of character classes, including the reserved index 0.
    pub fn vocab_size(&self) -> usize {
        self.char_to_idx.len() + 1
    }
}

/// Tag vocabulary following the scheme's [`IndexConvention`].
#[derive(Debug, Clone)]
pub struct TagVocab {
    tags: Vec<String>,
    convention: IndexConvention,
}

impl TagVocab {
    pub fn new(scheme: &EncodingScheme) -> Self {
        Self {
            tags: scheme.tags.clone(),
            convention: scheme.index_convention,
        }
    }

    /// Offset of the first real class in the tag vector.
    fn base(&self) -> usize {
        match self.convention {
            IndexConvention::ZeroReserved => 1,
            IndexConvention::ZeroIsFirstClass => 0,
        }
    }

    /// Vector index of `tag`, or `None` when unrecognized.
    pub fn index(&self, tag: &str) -> Option<usize> {
        self.tags
            .iter()
            .position(|t| t == tag)
            .map(|pos| pos + self.base())
    }

    /// Vector index used for padding and unrecognized tags, if the
    /// convention reserves one.
    pub fn padding_index(&self) -> Option<usize> {
        match self.convention {
            IndexConvention::ZeroReserved => Some(0),
            IndexConvention::ZeroIsFirstClass => None,
        }
    }

    /// Label of a vector index, `None` for the reserved slot or out of range.
    pub fn label(&self, index: usize) -> Option<&str> {
        index
            .checked_sub(self.base())
            .and_then(|pos| self.tags.get(pos))
            .map(String::as_str)
    }

    /// Length of one tag vector.
    pub fn encoding_size(&self) -> usize {
        self.tags.len() + self.base()
    }
}
