// src/lib.rs

//! Turns a directory of text files into padded character-index batches for a
//! character-aware skip-gram model with negative sampling.

pub mod pipeline;

pub use pipeline::{Batch, BatchStream, Error, Pipeline, PipelineConfig, PreparedCorpus, Result};
