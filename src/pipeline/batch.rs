// src/pipeline/batch.rs

use serde::{Deserialize, Serialize};

use crate::pipeline::encoder::EncodedWord;
use crate::pipeline::utilities::PAD_INDEX;

/// A right-padded integer matrix, row-major.
///
/// For a batch of `n` examples with `k` negatives there are `n * (2 + k)` rows,
/// each example contributing center, context, then its negatives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    rows: usize,
    width: usize,
    data: Vec<u32>,
}

impl Batch {
    /// Pads every sequence with PAD up to the longest one.
    pub fn from_sequences(sequences: &[EncodedWord]) -> Self {
        let width = sequences.iter().map(Vec::len).max().unwrap_or(0);
        let mut data = Vec::with_capacity(sequences.len() * width);
        for seq in sequences {
            data.extend_from_slice(seq);
            data.extend(std::iter::repeat(PAD_INDEX).take(width - seq.len()));
        }
        Self {
            rows: sequences.len(),
            width,
            data,
        }
    }

    /// `[rows, width]`
    pub fn shape(&self) -> [usize; 2] {
        [self.rows, self.width]
    }

    pub fn row(&self, i: usize) -> &[u32] {
        &self.data[i * self.width..(i + 1) * self.width]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u32]> {
        // chunks(0) panics, an empty batch has no rows anyway
        self.data.chunks(self.width.max(1)).take(self.rows)
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<u32> {
        self.data
    }
}
