//! Single-sentence probe: tag one sentence with one model and compare the
//! result against the tags the caller expects.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use tagsweep_core::{HyperparameterConfig, Token, Tokenizer};
use tracing::{debug, info};

use crate::driver::Driver;
use crate::error::{Result, TrainerError};
use crate::model::ModelBuilder;

/// Outcome of one probe.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResult {
    pub sentence: String,
    pub expected: Vec<String>,
    /// Predicted labels, cut to the length of `expected`.
    pub predicted: Vec<String>,
    /// Fraction of expected tags matched position by position.
    /// `None` when no tags were expected.
    pub ratio: Option<f64>,
    /// Tokens of `sentence` with their byte spans.
    pub tokens: Vec<Token>,
}

impl ProbeResult {
    pub fn new(sentence: &str, expected: &[String], mut predicted: Vec<String>) -> Self {
        predicted.truncate(expected.len());
        let ratio = (!expected.is_empty()).then(|| {
            let matches = expected
                .iter()
                .zip(&predicted)
                .filter(|(e, p)| e == p)
                .count();
            matches as f64 / expected.len() as f64
        });
        Self {
            sentence: sentence.to_string(),
            expected: expected.to_vec(),
            predicted,
            ratio,
            tokens: Tokenizer::new().tokenize(sentence),
        }
    }

    /// The sentence with `/TAG` after every token that has a prediction,
    /// keeping the original spacing.
    pub fn annotated(&self) -> String {
        let mut out = String::with_capacity(self.sentence.len() + 6 * self.predicted.len());
        let mut last = 0;
        for (token, tag) in self.tokens.iter().zip(&self.predicted) {
            out.push_str(&self.sentence[last..token.end]);
            out.push('/');
            out.push_str(tag);
            last = token.end;
        }
        out.push_str(&self.sentence[last..]);
        out
    }

    /// `"<sentence>",<expected>,<predicted>,<ratio>` with tags space-joined.
    pub fn to_csv_line(&self) -> String {
        let ratio = self
            .ratio
            .map_or_else(|| "n/a".to_string(), |r| format!("{r:.2}"));
        format!(
            "\"{}\",{},{},{}",
            self.sentence.replace('"', "\"\""),
            self.expected.join(" "),
            self.predicted.join(" "),
            ratio
        )
    }

    /// Append this result as one line to `path`, creating it if needed.
    pub fn append_to(&self, path: &Path) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(TrainerError::io(path))?;
        writeln!(file, "{}", self.to_csv_line()).map_err(TrainerError::io(path))
    }
}

/// Tag `sentence` with an already obtained model.
pub fn probe<B: ModelBuilder>(
    driver: &Driver<B>,
    model: &B::Model,
    config: &HyperparameterConfig,
    sentence: &str,
    expected: &[String],
) -> Result<ProbeResult> {
    let predicted = driver.predict_sentence(model, sentence, config.time_steps)?;
    let result = ProbeResult::new(sentence, expected, predicted);
    for (token, tag) in result.tokens.iter().zip(&result.predicted) {
        debug!(
            token = %token.text,
            start = token.start,
            end = token.end,
            tag = %tag,
            "tagged token"
        );
    }
    info!(
        %config,
        predicted = ?result.predicted,
        ratio = result.ratio.unwrap_or(f64::NAN),
        "probe complete"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn ratio_counts_positional_matches() {
        let result = ProbeResult::new(
            "He is a person",
            &tags(&["PRN", "VRB", "ART", "NOUN"]),
            tags(&["PRN", "VRB", "NOUN", "NOUN"]),
        );
        assert_eq!(result.ratio, Some(0.75));
        assert_eq!(
            result.to_csv_line(),
            "\"He is a person\",PRN VRB ART NOUN,PRN VRB NOUN NOUN,0.75"
        );
    }

    #[test]
    fn short_prediction_counts_as_misses() {
        let result = ProbeResult::new("a b c", &tags(&["ART", "NOUN", "VRB"]), tags(&["ART"]));
        assert_eq!(result.ratio, Some(1.0 / 3.0));
        assert!(result.to_csv_line().ends_with(",0.33"));
    }

    #[test]
    fn prediction_is_cut_to_expected_length() {
        let result = ProbeResult::new("a b", &tags(&["ART"]), tags(&["ART", "NOUN"]));
        assert_eq!(result.predicted, tags(&["ART"]));
        assert_eq!(result.ratio, Some(1.0));
    }

    #[test]
    fn annotation_keeps_spacing() {
        let result = ProbeResult::new(
            "He  is a",
            &tags(&["PRN", "VRB"]),
            tags(&["PRN", "VRB", "ART"]),
        );
        assert_eq!(result.tokens.len(), 3);
        assert_eq!(result.tokens[1].start, 4);
        assert_eq!(result.annotated(), "He/PRN  is/VRB a");
    }

    #[test]
    fn no_expected_tags_has_no_ratio() {
        let result = ProbeResult::new("hello", &[], tags(&["NOUN"]));
        assert_eq!(result.ratio, None);
        assert_eq!(result.to_csv_line(), "\"hello\",,,n/a");
    }

    #[test]
    fn quotes_are_doubled() {
        let result = ProbeResult::new("say \"hi\"", &tags(&["VRB"]), tags(&["VRB"]));
        assert!(result.to_csv_line().starts_with("\"say \"\"hi\"\"\","));
    }

    #[test]
    fn append_accumulates_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tests.csv");
        let result = ProbeResult::new("a", &tags(&["ART"]), tags(&["ART"]));
        result.append_to(&path).unwrap();
        result.append_to(&path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "\"a\",ART,ART,1.00\n\"a\",ART,ART,1.00\n");
    }
}
