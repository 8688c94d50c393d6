//! # Tokenizer
//!
//! Splits sentences into whitespace-delimited tokens. Every token keeps its
//! byte span so predictions can be reported against the original text.

/// A token extracted from a sentence with positional information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The raw token text
    pub text: String,
    /// Lowercase form used for encoding
    pub lower: String,
    /// Start position in the original string
    pub start: usize,
    /// End position in the original string
    pub end: usize,
}

/// Whitespace tokenizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Tokenizer;

impl Tokenizer {
    /// Create a new tokenizer instance.
    pub fn new() -> Self {
        Self
    }

    /// Tokenize a sentence on runs of whitespace.
    ///
    /// Leading and trailing whitespace never produce empty tokens.
    ///
    /// # Examples
    /// ```
    /// use tagsweep_core::tokenizer::Tokenizer;
    ///
    /// let tokens = Tokenizer::new().tokenize("He is  a person");
    /// assert_eq!(tokens.len(), 4);
    /// assert_eq!(tokens[3].text, "person");
    /// ```
    pub fn tokenize(&self, sentence: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut current_start: Option<usize> = None;

        for (idx, c) in sentence.char_indices() {
            if c.is_whitespace() {
                if let Some(start) = current_start.take() {
                    tokens.push(Self::make_token(sentence, start, idx));
                }
            } else if current_start.is_none() {
                current_start = Some(idx);
            }
        }

        if let Some(start) = current_start {
            tokens.push(Self::make_token(sentence, start, sentence.len()));
        }

        tokens
    }

    /// Number of tokens in `sentence` without allocating them.
    pub fn count(&self, sentence: &str) -> usize {
        sentence.split_whitespace().count()
    }

    fn make_token(sentence: &str, start: usize, end: usize) -> Token {
        let text = sentence[start..end].to_string();
        Token {
            lower: text.to_lowercase(),
            text,
            start,
            end,
        }
    }
}
