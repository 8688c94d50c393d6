//! # Decoder
//!
//! Maps model output scores back to tag labels.
//!
//! Per time step the highest score wins, with the lowest index keeping
//! priority on ties. Under [`IndexConvention::ZeroReserved`] index 0 is
//! excluded from the comparison; with a threshold configured, a winner
//! scoring below it is reported as [`NO_TAG`].

use crate::scheme::{EncodingScheme, IndexConvention, NO_TAG, PadPosition, SequenceMode};
use crate::sequence::{token_offset, window_count};
use crate::vocab::TagVocab;

/// Decoder for one encoding scheme.
#[derive(Debug, Clone)]
pub struct Decoder {
    tags: TagVocab,
    skip_zero: bool,
    threshold: Option<f32>,
    mode: SequenceMode,
}

impl Decoder {
    pub fn new(scheme: &EncodingScheme) -> Self {
        Self {
            tags: TagVocab::new(scheme),
            skip_zero: scheme.index_convention == IndexConvention::ZeroReserved,
            threshold: scheme.threshold,
            mode: scheme.sequence_mode,
        }
    }

    /// Index and score of the maximal entry of `scores`.
    ///
    /// Uses strict `>` so the first maximal index wins. NaN scores never
    /// win. Returns `None` when no eligible entry exists.
    pub fn argmax(&self, scores: &[f32]) -> Option<(usize, f32)> {
        let start = usize::from(self.skip_zero);
        let mut best: Option<(usize, f32)> = None;
        for (i, &score) in scores.iter().enumerate().skip(start) {
            if score.is_nan() {
                continue;
            }
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((i, score)),
            }
        }
        best
    }

    /// Label for one time step's score vector.
    pub fn decode_step(&self, scores: &[f32]) -> String {
        self.argmax(scores)
            .filter(|(_, score)| self.threshold.is_none_or(|t| *score >= t))
            .and_then(|(idx, _)| self.tags.label(idx))
            .unwrap_or(NO_TAG)
            .to_string()
    }

    /// Label every time step of one output sequence.
    pub fn decode_output<R: AsRef<[f32]>>(&self, prediction: &[R]) -> Vec<String> {
        prediction
            .iter()
            .map(|row| self.decode_step(row.as_ref()))
            .collect()
    }

    /// The newest-token slot of each sliding window.
    pub fn last_slots<'a>(windows: &'a [Vec<Vec<f32>>]) -> Vec<&'a [f32]> {
        windows
            .iter()
            .filter_map(|w| w.last().map(Vec::as_slice))
            .collect()
    }

    /// Drop padding positions so labels line up with the sentence tokens.
    ///
    /// At most `time_steps` tokens are covered: truncated sentences only
    /// have predictions for their first `time_steps` tokens.
    pub fn align<T>(labels: &[T], token_count: usize, time_steps: usize, pad: PadPosition) -> &[T] {
        let offset = token_offset(token_count, time_steps, pad).min(labels.len());
        let covered = token_count.min(time_steps);
        let end = (offset + covered).min(labels.len());
        &labels[offset..end]
    }

    /// Decode a model's outputs for one sentence into per-token labels.
    ///
    /// `outputs` holds one `[time_steps, tag_size]` score matrix per model
    /// input: a single one in pad/truncate mode, one per token in sliding
    /// window mode.
    pub fn decode_sentence(
        &self,
        outputs: &[Vec<Vec<f32>>],
        token_count: usize,
        time_steps: usize,
    ) -> Vec<String> {
        match self.mode {
            SequenceMode::PadTruncate { pad } => {
                let Some(sequence) = outputs.first() else {
                    return Vec::new();
                };
                let labels = self.decode_output(sequence);
                Self::align(&labels, token_count, time_steps, pad).to_vec()
            }
            SequenceMode::SlidingWindow => {
                debug_assert_eq!(outputs.len(), window_count(token_count, time_steps));
                self.decode_output(&Self::last_slots(outputs))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_class() -> EncodingScheme {
        EncodingScheme::default().with_index_convention(IndexConvention::ZeroIsFirstClass)
    }

    #[test]
    fn tie_goes_to_lowest_index() {
        let decoder = Decoder::new(&first_class());
        assert_eq!(decoder.argmax(&[0.1, 0.4, 0.4, 0.1]), Some((1, 0.4)));
        assert_eq!(decoder.decode_step(&[0.1, 0.4, 0.4, 0.1]), "VRB");
    }

    #[test]
    fn reserved_zero_never_wins() {
        let decoder = Decoder::new(&EncodingScheme::default());
        assert_eq!(decoder.decode_step(&[0.9, 0.05, 0.02, 0.02, 0.01]), "PRN");
        assert_eq!(decoder.decode_step(&[0.9, 0.0, 0.0, 0.0, 0.08]), "NOUN");
    }

    #[test]
    fn below_threshold_is_no_tag() {
        let decoder = Decoder::new(&first_class().with_threshold(0.5));
        assert_eq!(decoder.decode_step(&[0.2, 0.3, 0.1, 0.4]), NO_TAG);
        assert_eq!(decoder.decode_step(&[0.2, 0.5, 0.1, 0.2]), "VRB");
    }

    #[test]
    fn threshold_is_inclusive() {
        let decoder = Decoder::new(&first_class().with_threshold(0.98));
        assert_eq!(decoder.decode_step(&[0.0, 0.98, 0.0, 0.0]), "VRB");
        assert_eq!(decoder.decode_step(&[0.0, 0.97, 0.0, 0.0]), NO_TAG);
    }

    #[test]
    fn degenerate_rows_yield_no_tag() {
        let decoder = Decoder::new(&EncodingScheme::default());
        assert_eq!(decoder.decode_step(&[]), NO_TAG);
        assert_eq!(decoder.decode_step(&[1.0]), NO_TAG);
        assert_eq!(decoder.decode_step(&[0.0, f32::NAN, f32::NAN, f32::NAN, f32::NAN]), NO_TAG);
    }

    #[test]
    fn nan_is_skipped() {
        let decoder = Decoder::new(&first_class());
        assert_eq!(decoder.decode_step(&[f32::NAN, 0.1, 0.2, 0.0]), "ART");
    }

    #[test]
    fn align_leading_pad() {
        let labels = ["x", "x", "a", "b", "c"];
        assert_eq!(Decoder::align(&labels, 3, 5, PadPosition::Leading), &["a", "b", "c"]);
        assert_eq!(Decoder::align(&labels, 5, 5, PadPosition::Leading), &labels);
        assert_eq!(Decoder::align(&labels, 8, 5, PadPosition::Leading), &labels);
        assert!(Decoder::align(&labels, 0, 5, PadPosition::Leading).is_empty());
    }

    #[test]
    fn align_trailing_pad() {
        let labels = ["a", "b", "x", "x"];
        assert_eq!(Decoder::align(&labels, 2, 4, PadPosition::Trailing), &["a", "b"]);
        assert_eq!(Decoder::align(&labels, 9, 4, PadPosition::Trailing), &labels);
    }

    #[test]
    fn decode_sentence_pad_truncate() {
        let decoder = Decoder::new(&EncodingScheme::default());
        let outputs = vec![vec![
            vec![1.0, 0.0, 0.0, 0.0, 0.0],
            vec![0.0, 0.0, 0.0, 0.0, 1.0],
            vec![0.0, 0.0, 1.0, 0.0, 0.0],
        ]];
        assert_eq!(decoder.decode_sentence(&outputs, 2, 3), vec!["NOUN", "VRB"]);
        assert!(decoder.decode_sentence(&[], 2, 3).is_empty());
    }

    #[test]
    fn decode_sentence_sliding_uses_last_slot() {
        let scheme = EncodingScheme::default().with_sequence_mode(SequenceMode::SlidingWindow);
        let decoder = Decoder::new(&scheme);
        let outputs = vec![
            vec![vec![0.0, 0.0, 0.0, 0.0, 1.0], vec![0.0, 1.0, 0.0, 0.0, 0.0]],
            vec![vec![0.0, 1.0, 0.0, 0.0, 0.0], vec![0.0, 0.0, 1.0, 0.0, 0.0]],
        ];
        assert_eq!(decoder.decode_sentence(&outputs, 2, 2), vec!["PRN", "VRB"]);
    }
}
