// src/pipeline/config.rs

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::pipeline::{Error, Result};

/// Every knob of the pipeline. Passed by reference into each component
/// constructor, nothing is read from globals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Word frequency floor, also the oversampling factor of numeric corpora.
    pub min_count: u64,
    /// Context radius in tokens.
    pub window: usize,
    /// Size of the character table, including PAD, `{`, `}` and UNK.
    pub vocab_size: usize,
    /// Negatives drawn per example.
    pub neg_samples: usize,
    /// Examples per emitted batch.
    pub batch_size: usize,
    /// Threads used for the per-file vocabulary and archive tasks.
    pub num_workers: usize,
    /// Capacity of the producer/consumer channel, in batches.
    pub queue_depth: usize,
    pub subsample_threshold: f64,
    pub unigram_z: f64,
    pub max_word_len: usize,
    /// Paths containing this substring are treated as synthetic numeric corpora.
    pub numeric_marker: String,
    pub seed: Option<u64>,
    pub max_negative_draws: usize,
    pub short_timeout_ms: u64,
    pub long_timeout_ms: u64,
    pub show_progress: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_count: 5,
            window: 5,
            vocab_size: 100,
            neg_samples: 5,
            batch_size: 32,
            num_workers: 4,
            queue_depth: 10,
            subsample_threshold: 1e-4,
            unigram_z: 0.001,
            max_word_len: 30,
            numeric_marker: "numbers_".to_string(),
            seed: None,
            max_negative_draws: 10_000,
            short_timeout_ms: 1_000,
            long_timeout_ms: 600_000,
            show_progress: false,
        }
    }
}

impl PipelineConfig {
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::new()
    }

    /// Reads a JSON object of config fields, missing fields take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let config: PipelineConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn short_timeout(&self) -> Duration {
        Duration::from_millis(self.short_timeout_ms)
    }

    pub fn long_timeout(&self) -> Duration {
        Duration::from_millis(self.long_timeout_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.vocab_size < 4 {
            return Err(Error::Config(format!(
                "vocab_size must leave room for PAD, begin, end and UNK, got {}",
                self.vocab_size
            )));
        }
        if self.batch_size == 0 {
            return Err(Error::Config("batch_size must be at least 1".into()));
        }
        if self.queue_depth == 0 {
            return Err(Error::Config("queue_depth must be at least 1".into()));
        }
        if self.min_count == 0 {
            return Err(Error::Config("min_count must be at least 1".into()));
        }
        if !(self.subsample_threshold > 0.0) {
            return Err(Error::Config(format!(
                "subsample_threshold must be positive, got {}",
                self.subsample_threshold
            )));
        }
        if !(self.unigram_z > 0.0) {
            return Err(Error::Config(format!("unigram_z must be positive, got {}", self.unigram_z)));
        }
        if self.max_negative_draws == 0 {
            return Err(Error::Config("max_negative_draws must be at least 1".into()));
        }
        Ok(())
    }
}

pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl Default for PipelineConfigBuilder {
    fn default() -> Self {
        Self {
            config: PipelineConfig::default(),
        }
    }
}

impl PipelineConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn min_count(mut self, min_count: u64) -> Self {
        self.config.min_count = min_count;
        self
    }

    #[must_use]
    pub fn window(mut self, window: usize) -> Self {
        self.config.window = window;
        self
    }

    #[must_use]
    pub fn vocab_size(mut self, size: usize) -> Self {
        self.config.vocab_size = size;
        self
    }

    #[must_use]
    pub fn neg_samples(mut self, neg_samples: usize) -> Self {
        self.config.neg_samples = neg_samples;
        self
    }

    #[must_use]
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.config.batch_size = batch_size;
        self
    }

    #[must_use]
    pub fn num_workers(mut self, num_workers: usize) -> Self {
        self.config.num_workers = num_workers;
        self
    }

    #[must_use]
    pub fn queue_depth(mut self, depth: usize) -> Self {
        self.config.queue_depth = depth;
        self
    }

    #[must_use]
    pub fn subsample_threshold(mut self, threshold: f64) -> Self {
        self.config.subsample_threshold = threshold;
        self
    }

    #[must_use]
    pub fn unigram_z(mut self, z: f64) -> Self {
        self.config.unigram_z = z;
        self
    }

    #[must_use]
    pub fn max_word_len(mut self, len: usize) -> Self {
        self.config.max_word_len = len;
        self
    }

    #[must_use]
    pub fn numeric_marker<S: Into<String>>(mut self, marker: S) -> Self {
        self.config.numeric_marker = marker.into();
        self
    }

    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn max_negative_draws(mut self, draws: usize) -> Self {
        self.config.max_negative_draws = draws;
        self
    }

    #[must_use]
    pub fn timeouts(mut self, short: Duration, long: Duration) -> Self {
        self.config.short_timeout_ms = short.as_millis() as u64;
        self.config.long_timeout_ms = long.as_millis() as u64;
        self
    }

    #[must_use]
    pub fn show_progress(mut self, show: bool) -> Self {
        self.config.show_progress = show;
        self
    }

    pub fn build(self) -> Result<PipelineConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
