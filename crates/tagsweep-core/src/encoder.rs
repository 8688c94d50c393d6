//! # Token Encoder
//!
//! Turns one token into a flattened one-hot character matrix of shape
//! `[max_word_size, char_encoding_size]`, and one tag into a one-hot tag
//! vector. Both operations are pure and never fail on unknown input:
//! unknown characters map to index 0, unknown tags to the padding slot.

use crate::error::Result;
use crate::scheme::{CharSlotFill, EncodingScheme};
use crate::vocab::{CharVocab, TagVocab};

/// Flattened one-hot character matrix for one token.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedWord(Vec<f32>);

impl EncodedWord {
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }
}

impl AsRef<[f32]> for EncodedWord {
    fn as_ref(&self) -> &[f32] {
        &self.0
    }
}

/// Encoder for tokens and tags under one [`EncodingScheme`].
#[derive(Debug, Clone)]
pub struct TokenEncoder {
    chars: CharVocab,
    tags: TagVocab,
    fill: CharSlotFill,
    max_word_size: usize,
    char_encoding_size: usize,
}

impl TokenEncoder {
    /// Build an encoder, validating the scheme first.
    pub fn new(scheme: &EncodingScheme) -> Result<Self> {
        scheme.validate()?;
        let chars = CharVocab::new(scheme);
        Ok(Self {
            char_encoding_size: chars.vocab_size(),
            chars,
            tags: TagVocab::new(scheme),
            fill: scheme.char_slot_fill,
            max_word_size: scheme.max_word_size,
        })
    }

    /// Length of one encoded word.
    pub fn word_vector_size(&self) -> usize {
        self.max_word_size * self.char_encoding_size
    }

    /// Length of one encoded tag.
    pub fn tag_vector_size(&self) -> usize {
        self.tags.encoding_size()
    }

    /// One-hot encode a token.
    ///
    /// Each of the `max_word_size` rows has exactly one hot entry, except
    /// empty slots under [`CharSlotFill::Blank`], which stay all-zero.
    pub fn encode_token(&self, token: &str) -> EncodedWord {
        let mut data = vec![0.0f32; self.word_vector_size()];
        for (row, idx) in self.chars.encode(token).into_iter().enumerate() {
            if idx == 0 && self.fill == CharSlotFill::Blank {
                continue;
            }
            data[row * self.char_encoding_size + idx] = 1.0;
        }
        EncodedWord(data)
    }

    /// The placeholder word used for padding.
    pub fn placeholder_word(&self) -> EncodedWord {
        self.encode_token("")
    }

    /// One-hot encode a tag. Unrecognized tags land in the padding slot, or
    /// encode as all-zero when the convention has none.
    pub fn encode_tag(&self, tag: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.tags.encoding_size()];
        if let Some(idx) = self.tags.index(tag).or(self.tags.padding_index()) {
            v[idx] = 1.0;
        }
        v
    }

    /// The placeholder tag vector used for padding.
    pub fn placeholder_tag(&self) -> Vec<f32> {
        let mut v = vec![0.0f32; self.tags.encoding_size()];
        if let Some(idx) = self.tags.padding_index() {
            v[idx] = 1.0;
        }
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheme::IndexConvention;

    fn hot_indices(row: &[f32]) -> Vec<usize> {
        row.iter()
            .enumerate()
            .filter(|(_, v)| **v == 1.0)
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn encodes_one_hot_per_row() {
        let scheme = EncodingScheme::default().with_max_word_size(4);
        let enc = TokenEncoder::new(&scheme).unwrap();
        let word = enc.encode_token("Cab");
        assert_eq!(word.len(), 4 * 27);

        let rows: Vec<&[f32]> = word.as_slice().chunks(27).collect();
        assert_eq!(hot_indices(rows[0]), vec![3]);
        assert_eq!(hot_indices(rows[1]), vec![1]);
        assert_eq!(hot_indices(rows[2]), vec![2]);
        assert_eq!(hot_indices(rows[3]), vec![0]);
        assert_eq!(word.as_slice().iter().sum::<f32>(), 4.0);
    }

    #[test]
    fn unknown_characters_never_fail() {
        let enc = TokenEncoder::new(&EncodingScheme::default().with_max_word_size(3)).unwrap();
        let word = enc.encode_token("ü?!");
        let rows: Vec<&[f32]> = word.as_slice().chunks(27).collect();
        for row in rows {
            assert_eq!(hot_indices(row), vec![0]);
        }
    }

    #[test]
    fn blank_fill_leaves_padding_rows_empty() {
        let scheme = EncodingScheme::default()
            .with_max_word_size(3)
            .with_char_slot_fill(CharSlotFill::Blank);
        let enc = TokenEncoder::new(&scheme).unwrap();
        let word = enc.encode_token("a");
        assert_eq!(word.as_slice().iter().sum::<f32>(), 1.0);
        assert!(enc.placeholder_word().as_slice().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn long_tokens_are_truncated() {
        let enc = TokenEncoder::new(&EncodingScheme::default().with_max_word_size(2)).unwrap();
        let word = enc.encode_token("abc");
        assert_eq!(word.len(), 2 * 27);
        assert_eq!(hot_indices(&word.as_slice()[27..]), vec![2]);
    }

    #[test]
    fn tag_encoding_zero_reserved() {
        let enc = TokenEncoder::new(&EncodingScheme::default()).unwrap();
        assert_eq!(enc.encode_tag("PRN"), vec![0.0, 1.0, 0.0, 0.0, 0.0]);
        assert_eq!(enc.encode_tag("NOUN"), vec![0.0, 0.0, 0.0, 0.0, 1.0]);
        assert_eq!(enc.encode_tag("ADJ"), vec![1.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(enc.placeholder_tag(), vec![1.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn tag_encoding_first_class() {
        let scheme =
            EncodingScheme::default().with_index_convention(IndexConvention::ZeroIsFirstClass);
        let enc = TokenEncoder::new(&scheme).unwrap();
        assert_eq!(enc.encode_tag("PRN"), vec![1.0, 0.0, 0.0, 0.0]);
        assert_eq!(enc.encode_tag("ADJ"), vec![0.0; 4]);
        assert_eq!(enc.placeholder_tag(), vec![0.0; 4]);
    }

    #[test]
    fn invalid_scheme_is_rejected() {
        let scheme = EncodingScheme::default().with_tags(Vec::<String>::new());
        assert!(TokenEncoder::new(&scheme).is_err());
    }
}
