//! Data loading for tagged sentence records.
//!
//! Accepts either a JSON array of `{sentence, tags}` objects or JSON Lines
//! with one object per line.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, TagsweepError};
use crate::tokenizer::Tokenizer;

/// A single training example: a sentence and one tag per token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedRecord {
    pub sentence: String,
    pub tags: Vec<String>,
}

impl TaggedRecord {
    pub fn new<I, S>(sentence: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sentence: sentence.into(),
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    pub fn token_count(&self) -> usize {
        Tokenizer::new().count(&self.sentence)
    }

    /// Whether the sentence has exactly one tag per token.
    pub fn is_aligned(&self) -> bool {
        self.token_count() == self.tags.len()
    }
}

/// Load records from a JSON array or JSON Lines file, in file order.
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<Vec<TaggedRecord>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| TagsweepError::RecordSource {
        path: path.to_path_buf(),
        source,
    })?;

    let records = if content.trim_start().starts_with('[') {
        serde_json::from_str(&content).map_err(|source| TagsweepError::RecordFormat {
            location: path.display().to_string(),
            source,
        })?
    } else {
        let mut records = Vec::new();
        for (i, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let record = serde_json::from_str(line).map_err(|source| {
                TagsweepError::RecordFormat {
                    location: format!("{}:{}", path.display(), i + 1),
                    source,
                }
            })?;
            records.push(record);
        }
        records
    };

    debug!(path = %path.display(), count = records.len(), "loaded records");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_json_array() {
        let file = write_temp(
            r#"
            [
              {"sentence": "He is a person", "tags": ["PRN", "VRB", "ART", "NOUN"]},
              {"sentence": "a b", "tags": ["NOUN"]}
            ]"#,
        );
        let records = load_records(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].is_aligned());
        assert!(!records[1].is_aligned());
    }

    #[test]
    fn loads_json_lines_in_order() {
        let file = write_temp(
            "{\"sentence\": \"he is\", \"tags\": [\"PRN\", \"VRB\"]}\n\n{\"sentence\": \"it\", \"tags\": [\"PRN\"]}\n",
        );
        let records = load_records(file.path()).unwrap();
        assert_eq!(records[0], TaggedRecord::new("he is", ["PRN", "VRB"]));
        assert_eq!(records[1].sentence, "it");
    }

    #[test]
    fn empty_file_has_no_records() {
        let file = write_temp("  \n");
        assert!(load_records(file.path()).unwrap().is_empty());
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_records("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, TagsweepError::RecordSource { .. }));
    }

    #[test]
    fn bad_line_reports_location() {
        let file = write_temp("{\"sentence\": \"a\", \"tags\": [\"N\"]}\nnot json\n");
        let err = load_records(file.path()).unwrap_err();
        match err {
            TagsweepError::RecordFormat { location, .. } => assert!(location.ends_with(":2")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
