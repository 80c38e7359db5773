// src/pipeline/archive.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rustc_hash::FxHashMap as HashMap;

use crate::pipeline::pair::Pair;
use crate::pipeline::parallelism::{MaybeParallelIterator, WorkerPool};
use crate::pipeline::pre_tokenizer::{Tokenizer, WordTokenizer};
use crate::pipeline::progress::file_progress;
use crate::pipeline::utilities::WordVocabulary;
use crate::pipeline::windowed_pairs::WindowedPairs;
use crate::pipeline::{Error, PipelineConfig, Result};

/// Archive key of a file: its name up to the first `.`.
pub fn file_id(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.split_once('.') {
        Some((stem, _)) => stem.to_string(),
        None => name,
    }
}

/// Realized pairs of every file, one write-once entry per file id.
///
/// Seen from outside it is the concatenation of its entries in insertion order,
/// so a single flat index addresses every pair.
#[derive(Debug, Default)]
pub struct ExampleArchive {
    keys: Vec<String>,
    entries: HashMap<String, Vec<Pair>>,
    // cumulative end offset of each key, same order as `keys`
    ends: Vec<usize>,
}

impl ExampleArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: String, pairs: Vec<Pair>) -> Result<()> {
        if self.entries.contains_key(&key) {
            return Err(Error::DuplicateArchiveKey(key));
        }
        self.ends.push(self.len() + pairs.len());
        self.keys.push(key.clone());
        self.entries.insert(key, pairs);
        Ok(())
    }

    /// Total number of pairs across all entries.
    pub fn len(&self) -> usize {
        self.ends.last().copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn num_entries(&self) -> usize {
        self.keys.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    pub fn entry(&self, key: &str) -> Option<&[Pair]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    pub fn get(&self, index: usize) -> Result<&Pair> {
        let len = self.len();
        if index >= len {
            return Err(Error::IndexOutOfRange { index, len });
        }
        let slot = self.ends.partition_point(|&end| end <= index);
        let start = if slot == 0 { 0 } else { self.ends[slot - 1] };
        Ok(&self.entries[&self.keys[slot]][index - start])
    }
}

/// Fills an [`ExampleArchive`] by draining one [`WindowedPairs`] per file on the
/// worker pool. Entries are inserted only after every file task has returned.
pub struct ArchiveBuilder {
    window: usize,
    threshold: f64,
    seed: Option<u64>,
    show_progress: bool,
    tokenizer: Arc<dyn Tokenizer>,
}

impl ArchiveBuilder {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            window: config.window,
            threshold: config.subsample_threshold,
            seed: config.seed,
            show_progress: config.show_progress,
            tokenizer: Arc::new(WordTokenizer::new()),
        }
    }

    #[must_use]
    pub fn with_tokenizer(mut self, tokenizer: Arc<dyn Tokenizer>) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    pub fn build(&self, paths: &[PathBuf], vocab: &WordVocabulary, pool: &WorkerPool) -> Result<ExampleArchive> {
        let progress = file_progress(self.show_progress, paths.len(), "Generating pairs");
        let tasks: Vec<(usize, &PathBuf)> = paths.iter().enumerate().collect();

        let realized: Vec<(String, Vec<Pair>)> = pool.install(|| {
            tasks
                .into_maybe_par_iter_cond(pool.is_parallel())
                .map(|(i, path)| {
                    let pairs = self.realize_file(i, path, vocab);
                    if let Some(p) = &progress {
                        p.inc(1);
                    }
                    (file_id(path), pairs)
                })
                .collect()
        });
        if let Some(p) = &progress {
            p.finish();
        }

        let mut archive = ExampleArchive::new();
        for (key, pairs) in realized {
            archive.insert(key, pairs)?;
        }
        tracing::info!(
            files = archive.num_entries(),
            pairs = archive.len(),
            "archived training pairs"
        );
        Ok(archive)
    }

    fn rng_for(&self, file_index: usize) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(file_index as u64 + 1)),
            None => StdRng::from_entropy(),
        }
    }

    fn realize_file(&self, file_index: usize, path: &Path, vocab: &WordVocabulary) -> Vec<Pair> {
        let rng = self.rng_for(file_index);
        let realized = WindowedPairs::open(path, vocab, self.tokenizer.as_ref(), self.window, self.threshold, rng)
            .and_then(|pairs| pairs.collect::<Result<Vec<_>>>());
        match realized {
            Ok(pairs) => {
                tracing::debug!(file = %path.display(), pairs = pairs.len(), "realized file");
                pairs
            }
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "no pairs archived for file");
                Vec::new()
            }
        }
    }
}
