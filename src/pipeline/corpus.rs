// src/pipeline/corpus.rs

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::pipeline::archive::{ArchiveBuilder, ExampleArchive};
use crate::pipeline::assembler::BatchAssembler;
use crate::pipeline::consumer::BatchStream;
use crate::pipeline::parallelism::WorkerPool;
use crate::pipeline::pre_tokenizer::{Tokenizer, WordTokenizer};
use crate::pipeline::utilities::Utilities;
use crate::pipeline::vocab_builder::VocabularyBuilder;
use crate::pipeline::{PipelineConfig, Result};

/// Regular files directly under `dir`, sorted by path.
pub fn corpus_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Wires the stages together: counting, derivation, archiving, then one batch
/// stream per epoch.
pub struct Pipeline {
    config: PipelineConfig,
    tokenizer: Arc<dyn Tokenizer>,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            tokenizer: Arc::new(WordTokenizer::new()),
        }
    }

    /// Tokenizer for regular text, both when counting and when windowing.
    #[must_use]
    pub fn with_tokenizer(mut self, tokenizer: Arc<dyn Tokenizer>) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs every setup phase over `paths`. The vocabulary is fixed before any
    /// pair is generated, and the archive is complete before it is handed on.
    pub fn prepare(&self, paths: &[PathBuf]) -> Result<PreparedCorpus> {
        self.config.validate()?;
        let pool = WorkerPool::new(self.config.num_workers)?;

        let (word_counts, char_counts) = VocabularyBuilder::new(&self.config)
            .with_tokenizer(Arc::clone(&self.tokenizer))
            .build(paths, &pool);
        let utilities = Utilities::derive(&word_counts, &char_counts, &self.config);
        if utilities.unigram.is_empty() {
            tracing::warn!("unigram table is empty, negative sampling will fail");
        }

        let archive = ArchiveBuilder::new(&self.config)
            .with_tokenizer(Arc::clone(&self.tokenizer))
            .build(paths, &utilities.words, &pool)?;

        Ok(PreparedCorpus {
            config: self.config.clone(),
            utilities: Arc::new(utilities),
            archive: Arc::new(archive),
            epochs_started: 0,
        })
    }
}

/// Vocabulary and archived pairs, ready to be served as batches.
pub struct PreparedCorpus {
    config: PipelineConfig,
    utilities: Arc<Utilities>,
    archive: Arc<ExampleArchive>,
    epochs_started: u64,
}

impl PreparedCorpus {
    pub fn utilities(&self) -> &Utilities {
        &self.utilities
    }

    pub fn archive(&self) -> &ExampleArchive {
        &self.archive
    }

    /// Full batches one epoch yields; the remainder is dropped.
    pub fn batches_per_epoch(&self) -> usize {
        self.archive.len() / self.config.batch_size
    }

    /// Starts a producer over a fresh shuffle of the archive. With a seed, epoch
    /// `n` always gets the same order.
    pub fn batches(&mut self) -> Result<BatchStream> {
        let rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed ^ (self.epochs_started << 32)),
            None => StdRng::from_entropy(),
        };
        self.epochs_started += 1;

        let assembler = BatchAssembler::new(
            Arc::clone(&self.archive),
            Arc::clone(&self.utilities),
            &self.config,
            rng,
        );
        tracing::info!(
            epoch = self.epochs_started,
            examples = self.archive.len(),
            batches = self.batches_per_epoch(),
            "starting batch producer"
        );
        BatchStream::spawn(
            assembler,
            self.config.queue_depth,
            self.config.short_timeout(),
            self.config.long_timeout(),
        )
    }
}
