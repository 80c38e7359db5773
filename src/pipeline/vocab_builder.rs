// src/pipeline/vocab_builder.rs

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::pipeline::counter::{CharCounts, WordCounts};
use crate::pipeline::parallelism::{MaybeParallelIterator, WorkerPool};
use crate::pipeline::pre_tokenizer::{Tokenizer, WhitespaceTokenizer, WordTokenizer};
use crate::pipeline::progress::file_progress;
use crate::pipeline::utilities::{BEGIN_MARKER, END_MARKER};
use crate::pipeline::{PipelineConfig, Result};

/// Corpus-wide word and character counts.
///
/// One task per file: each reads its file, counts lower-cased words and raw
/// characters into its own counters and hands them back. The per-file counters
/// are then folded in file order.
pub struct VocabularyBuilder {
    min_count: u64,
    numeric_marker: String,
    show_progress: bool,
    tokenizer: Arc<dyn Tokenizer>,
    numeric_tokenizer: Arc<dyn Tokenizer>,
}

impl VocabularyBuilder {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            min_count: config.min_count,
            numeric_marker: config.numeric_marker.clone(),
            show_progress: config.show_progress,
            tokenizer: Arc::new(WordTokenizer::new()),
            numeric_tokenizer: Arc::new(WhitespaceTokenizer),
        }
    }

    #[must_use]
    pub fn with_tokenizer(mut self, tokenizer: Arc<dyn Tokenizer>) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    #[must_use]
    pub fn with_numeric_tokenizer(mut self, tokenizer: Arc<dyn Tokenizer>) -> Self {
        self.numeric_tokenizer = tokenizer;
        self
    }

    pub fn is_numeric_corpus(&self, path: &Path) -> bool {
        !self.numeric_marker.is_empty() && path.to_string_lossy().contains(&self.numeric_marker)
    }

    pub fn build(&self, paths: &[PathBuf], pool: &WorkerPool) -> (WordCounts, CharCounts) {
        let progress = file_progress(self.show_progress, paths.len(), "Counting words");

        let (word_counts, file_char_counts) = pool.install(|| {
            paths
                .into_maybe_par_iter_cond(pool.is_parallel())
                .map(|path| {
                    let counts = self.count_file(path);
                    if let Some(p) = &progress {
                        p.inc(1);
                    }
                    counts
                })
                .reduce(
                    || (WordCounts::new(), CharCounts::new()),
                    |(mut words, mut chars), (file_words, file_chars)| {
                        words.merge(file_words);
                        chars.merge(file_chars);
                        (words, chars)
                    },
                )
        });
        if let Some(p) = &progress {
            p.finish();
        }

        let mut char_counts: CharCounts = [BEGIN_MARKER, END_MARKER].into_iter().collect();
        char_counts.merge(file_char_counts);

        tracing::info!(
            files = paths.len(),
            distinct_words = word_counts.len(),
            distinct_chars = char_counts.len(),
            "counted corpus vocabulary"
        );
        (word_counts, char_counts)
    }

    /// Counts of one file. A file that cannot be read or tokenized counts as empty.
    pub fn count_file(&self, path: &Path) -> (WordCounts, CharCounts) {
        match self.try_count_file(path) {
            Ok(counts) => counts,
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "skipping file while counting vocabulary");
                (WordCounts::new(), CharCounts::new())
            }
        }
    }

    fn try_count_file(&self, path: &Path) -> Result<(WordCounts, CharCounts)> {
        let text = fs::read_to_string(path)?;
        let lowered = text.to_lowercase();

        let mut words = WordCounts::new();
        if self.is_numeric_corpus(path) {
            // synthetic numeric corpora are rare on purpose, push them over min_count
            for token in self.numeric_tokenizer.tokenize(&lowered)? {
                words.add(token, self.min_count);
            }
        } else {
            words.update(self.tokenizer.tokenize(&lowered)?);
        }
        let chars: CharCounts = text.chars().collect();

        tracing::debug!(file = %path.display(), words = words.total(), "counted file");
        Ok((words, chars))
    }
}
