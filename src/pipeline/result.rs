// src/pipeline/result.rs

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Could not build the worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("The unigram table is empty, no negatives can be drawn")]
    EmptyUnigramTable,
    /// Every draw kept landing on the excluded word, the table is degenerate for it.
    #[error("Negative sampling for '{word}' gave up after {attempts} rejected draws")]
    NegativeSampling { word: String, attempts: usize },
    #[error("Archive already holds an entry for file id '{0}'")]
    DuplicateArchiveKey(String),
    #[error("Example index {index} is out of range for an archive of {len} pairs")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("The batch producer thread panicked")]
    ProducerPanicked,
}

pub type Result<T> = std::result::Result<T, Error>;
