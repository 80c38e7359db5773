// src/pipeline/encoder.rs

use crate::pipeline::utilities::{BEGIN_INDEX, CharacterTable, END_INDEX};

/// Character indices of one word, wrapped in the begin and end markers.
pub type EncodedWord = Vec<u32>;

/// `[begin] + [index(c) for c in word] + [end]`, unseen characters map to UNK.
pub fn encode_word(word: &str, table: &CharacterTable) -> EncodedWord {
    let mut indices = Vec::with_capacity(word.len() + 2);
    indices.push(BEGIN_INDEX);
    indices.extend(word.chars().map(|c| table.index(c)));
    indices.push(END_INDEX);
    indices
}

impl CharacterTable {
    pub fn encode(&self, word: &str) -> EncodedWord {
        encode_word(word, self)
    }
}
