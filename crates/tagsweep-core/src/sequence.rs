//! # Sequence Builder
//!
//! Normalizes whole sentences and tag lists to fixed-length sequences of
//! encoded vectors. Two mutually exclusive modes exist, selected by the
//! scheme's [`SequenceMode`]:
//!
//! - pad/truncate: one `[time_steps, width]` frame per sentence;
//! - sliding window: one frame per token, each ending at that token, over
//!   the sentence prefixed with `time_steps - 1` placeholders.
//!
//! Inputs and targets are always built in pairs through
//! [`SequenceBuilder::build_pair`], which refuses pairs whose token and tag
//! counts disagree.

use tracing::warn;

use crate::encoder::{EncodedWord, TokenEncoder};
use crate::error::{Result, TagsweepError};
use crate::frames::Frames;
use crate::record::TaggedRecord;
use crate::scheme::{EncodingScheme, PadPosition, SequenceMode};
use crate::tokenizer::Tokenizer;

/// Input and target frames must pair up one to one with equal row counts.
fn check_frames(inputs: &[Frames], targets: &[Frames]) -> Result<()> {
    if inputs.len() != targets.len() {
        return Err(TagsweepError::ShapeMismatch {
            expected: inputs.len(),
            actual: targets.len(),
        });
    }
    match inputs.iter().zip(targets).find(|(i, t)| i.rows() != t.rows()) {
        Some((i, t)) => Err(TagsweepError::ShapeMismatch {
            expected: i.rows(),
            actual: t.rows(),
        }),
        None => Ok(()),
    }
}

/// Pad or truncate `items` to exactly `len` entries.
///
/// Short inputs receive `len - items.len()` copies of `placeholder` at the
/// front ([`PadPosition::Leading`]) or back ([`PadPosition::Trailing`]).
/// Long inputs keep their first `len` entries.
pub fn fit_length<T: Clone>(mut items: Vec<T>, len: usize, pad: PadPosition, placeholder: &T) -> Vec<T> {
    if items.len() >= len {
        items.truncate(len);
        return items;
    }
    let missing = len - items.len();
    match pad {
        PadPosition::Leading => {
            let mut padded = Vec::with_capacity(len);
            padded.extend(std::iter::repeat_n(placeholder.clone(), missing));
            padded.append(&mut items);
            padded
        }
        PadPosition::Trailing => {
            items.extend(std::iter::repeat_n(placeholder.clone(), missing));
            items
        }
    }
}

/// Row offset of the first real token inside a pad/truncate frame holding
/// `token_count` tokens.
pub fn token_offset(token_count: usize, time_steps: usize, pad: PadPosition) -> usize {
    match pad {
        PadPosition::Leading => time_steps.saturating_sub(token_count),
        PadPosition::Trailing => 0,
    }
}

/// Number of sliding windows produced for `token_count` tokens.
pub fn window_count(token_count: usize, time_steps: usize) -> usize {
    let padded = token_count + time_steps.saturating_sub(1);
    (padded + 1).saturating_sub(time_steps)
}

/// Encoded inputs and targets for one record, positionally aligned.
#[derive(Debug, Clone)]
pub struct EncodedPair {
    /// One frame per model input (one per sentence, or one per window).
    pub inputs: Vec<Frames>,
    /// Targets, same count and row count as `inputs`.
    pub targets: Vec<Frames>,
    /// Number of real tokens in the sentence.
    pub token_count: usize,
}

/// Builds fixed-length sequences for one `time_steps` value.
#[derive(Debug, Clone)]
pub struct SequenceBuilder {
    encoder: TokenEncoder,
    tokenizer: Tokenizer,
    mode: SequenceMode,
    time_steps: usize,
}

impl SequenceBuilder {
    pub fn new(scheme: &EncodingScheme, time_steps: usize) -> Result<Self> {
        if time_steps == 0 {
            return Err(TagsweepError::InvalidScheme(
                "time_steps must be positive".into(),
            ));
        }
        Ok(Self {
            encoder: TokenEncoder::new(scheme)?,
            tokenizer: Tokenizer::new(),
            mode: scheme.sequence_mode,
            time_steps,
        })
    }

    pub fn time_steps(&self) -> usize {
        self.time_steps
    }

    pub fn mode(&self) -> SequenceMode {
        self.mode
    }

    pub fn encoder(&self) -> &TokenEncoder {
        &self.encoder
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    fn pad_position(&self) -> PadPosition {
        match self.mode {
            SequenceMode::PadTruncate { pad } => pad,
            SequenceMode::SlidingWindow => PadPosition::Leading,
        }
    }

    fn encode_words(&self, sentence: &str) -> Vec<EncodedWord> {
        self.tokenizer
            .tokenize(sentence)
            .iter()
            .map(|t| self.encoder.encode_token(&t.lower))
            .collect()
    }

    fn encode_tags<S: AsRef<str>>(&self, tags: &[S]) -> Vec<Vec<f32>> {
        tags.iter()
            .map(|t| self.encoder.encode_tag(t.as_ref()))
            .collect()
    }

    /// Encode a sentence as exactly `time_steps` words.
    pub fn build_sentence_inputs(&self, sentence: &str) -> Result<Frames> {
        let words = fit_length(
            self.encode_words(sentence),
            self.time_steps,
            self.pad_position(),
            &self.encoder.placeholder_word(),
        );
        Frames::from_rows(self.encoder.word_vector_size(), &words)
    }

    /// Encode a tag list as exactly `time_steps` tag vectors.
    ///
    /// The list must have one tag per sentence token; use
    /// [`build_pair`](Self::build_pair) to have that checked.
    pub fn build_tag_outputs<S: AsRef<str>>(&self, tags: &[S]) -> Result<Frames> {
        let rows = fit_length(
            self.encode_tags(tags),
            self.time_steps,
            self.pad_position(),
            &self.encoder.placeholder_tag(),
        );
        Frames::from_rows(self.encoder.tag_vector_size(), &rows)
    }

    /// Sliding windows over a sentence, `[window_count, time_steps, width]`.
    pub fn sentence_windows(&self, sentence: &str) -> Result<Vec<Frames>> {
        let words = self.encode_words(sentence);
        let padded = self.lead_pad(words, self.encoder.placeholder_word());
        self.windows(self.encoder.word_vector_size(), &padded)
    }

    /// Sliding windows over a tag list, one per tag.
    pub fn tag_windows<S: AsRef<str>>(&self, tags: &[S]) -> Result<Vec<Frames>> {
        let padded = self.lead_pad(self.encode_tags(tags), self.encoder.placeholder_tag());
        self.windows(self.encoder.tag_vector_size(), &padded)
    }

    fn lead_pad<T: Clone>(&self, items: Vec<T>, placeholder: T) -> Vec<T> {
        let mut padded = vec![placeholder; self.time_steps - 1];
        padded.extend(items);
        padded
    }

    fn windows<R: AsRef<[f32]>>(&self, cols: usize, padded: &[R]) -> Result<Vec<Frames>> {
        let all = Frames::from_rows(cols, padded)?;
        let n = (padded.len() + 1).saturating_sub(self.time_steps);
        (0..n).map(|start| all.window(start, self.time_steps)).collect()
    }

    /// Model inputs for a sentence in the configured mode.
    pub fn build_inputs(&self, sentence: &str) -> Result<Vec<Frames>> {
        match self.mode {
            SequenceMode::PadTruncate { .. } => Ok(vec![self.build_sentence_inputs(sentence)?]),
            SequenceMode::SlidingWindow => self.sentence_windows(sentence),
        }
    }

    /// Model targets for a tag list in the configured mode.
    pub fn build_targets<S: AsRef<str>>(&self, tags: &[S]) -> Result<Vec<Frames>> {
        match self.mode {
            SequenceMode::PadTruncate { .. } => Ok(vec![self.build_tag_outputs(tags)?]),
            SequenceMode::SlidingWindow => self.tag_windows(tags),
        }
    }

    /// Encode a record's inputs and targets, rejecting misaligned records.
    pub fn build_pair(&self, record: &TaggedRecord) -> Result<EncodedPair> {
        let token_count = self.tokenizer.count(&record.sentence);
        if token_count != record.tags.len() {
            return Err(TagsweepError::Misaligned {
                sentence: record.sentence.clone(),
                tokens: token_count,
                tags: record.tags.len(),
            });
        }

        let inputs = self.build_inputs(&record.sentence)?;
        let targets = self.build_targets(&record.tags)?;

        check_frames(&inputs, &targets)?;

        Ok(EncodedPair {
            inputs,
            targets,
            token_count,
        })
    }

    /// Encode every aligned record, skipping misaligned ones with a warning.
    pub fn build_aligned<'a, I>(&self, records: I) -> Result<Vec<EncodedPair>>
    where
        I: IntoIterator<Item = &'a TaggedRecord>,
    {
        let mut pairs = Vec::new();
        for record in records {
            match self.build_pair(record) {
                Ok(pair) => pairs.push(pair),
                Err(TagsweepError::Misaligned { tokens, tags, .. }) => {
                    warn!(
                        sentence = %record.sentence,
                        tags = ?record.tags,
                        tokens,
                        tag_count = tags,
                        "skipping misaligned record"
                    );
                }
                Err(e) => return Err(e),
            }
        }
        Ok(pairs)
    }
}
