// src/pipeline/pre_tokenizer.rs

use std::sync::LazyLock;

use regex::Regex;

use crate::pipeline::Result;

// Clitics, numbers with inner separators, hyphenated word runs, then single
// punctuation marks.
pub static WORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"'(?:s|t|re|ve|m|ll|d)\b|\p{N}+(?:[.,]\p{N}+)*|[\p{L}\p{M}_]+(?:-[\p{L}\p{M}_]+)*|[^\s\p{L}\p{N}]")
        .expect("static word pattern is valid")
});

/// Text to an ordered sequence of word tokens. The pipeline only relies on this
/// capability, any tokenizer can be plugged in.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Result<Vec<String>>;
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct WordTokenizer;

impl WordTokenizer {
    pub fn new() -> Self {
        WordTokenizer
    }
}

impl Tokenizer for WordTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<String>> {
        Ok(WORD_RE
            .find_iter(text)
            .map(|mat| mat.as_str().to_string())
            .collect())
    }
}

/// Splits on whitespace only. Used for the synthetic numeric corpora where
/// numbers must survive as single tokens.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<String>> {
        Ok(text.split_whitespace().map(str::to_string).collect())
    }
}
