// src/pipeline/assembler.rs

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::SyncSender;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::pipeline::archive::ExampleArchive;
use crate::pipeline::batch::Batch;
use crate::pipeline::encoder::EncodedWord;
use crate::pipeline::negative_sampler::NegativeSampler;
use crate::pipeline::utilities::Utilities;
use crate::pipeline::{PipelineConfig, Result};

/// What a producer run did before it stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblyReport {
    pub batches_sent: usize,
    /// Examples encoded but never sent: the trailing partial batch, or the batch
    /// in flight when the run was cancelled.
    pub examples_dropped: usize,
    /// Indices still queued when the run was cancelled.
    pub examples_skipped: usize,
    pub cancelled: bool,
}

/// Producer side of the batch channel.
///
/// Consumes a shuffled queue of flat archive indices; every `batch_size` examples
/// become one padded [`Batch`]. A trailing partial batch is never sent.
pub struct BatchAssembler {
    archive: Arc<ExampleArchive>,
    utilities: Arc<Utilities>,
    index_queue: VecDeque<usize>,
    batch_size: usize,
    neg_samples: usize,
    max_negative_draws: usize,
    rng: StdRng,
}

impl BatchAssembler {
    /// Queues every archive index in a random order drawn from `rng`.
    pub fn new(archive: Arc<ExampleArchive>, utilities: Arc<Utilities>, config: &PipelineConfig, mut rng: StdRng) -> Self {
        let mut indices: Vec<usize> = (0..archive.len()).collect();
        indices.shuffle(&mut rng);
        Self {
            archive,
            utilities,
            index_queue: indices.into(),
            batch_size: config.batch_size,
            neg_samples: config.neg_samples,
            max_negative_draws: config.max_negative_draws,
            rng,
        }
    }

    /// Replaces the queue with `indices`, consumed front to back.
    #[must_use]
    pub fn with_indices<I: IntoIterator<Item = usize>>(mut self, indices: I) -> Self {
        self.index_queue = indices.into_iter().collect();
        self
    }

    pub fn pending(&self) -> usize {
        self.index_queue.len()
    }

    /// Encoded rows of one example: center, context, then the negatives.
    pub fn encode_example(&mut self, index: usize) -> Result<Vec<EncodedWord>> {
        let pair = self.archive.get(index)?;
        let sampler = NegativeSampler::new(&self.utilities.unigram, &self.utilities.words, self.max_negative_draws);
        let negatives = sampler.sample(&pair.center, self.neg_samples, &mut self.rng)?;

        let chars = &self.utilities.chars;
        let mut rows = Vec::with_capacity(2 + negatives.len());
        rows.push(chars.encode(&pair.center));
        rows.push(chars.encode(&pair.context));
        rows.extend(negatives.into_iter().map(|word| chars.encode(word)));
        Ok(rows)
    }

    /// Runs until the queue is empty, `cancel` is raised, or the receiving end
    /// hangs up. `send` blocks while the channel is full.
    ///
    /// Stopping early loses the partially filled batch, it is counted in
    /// [`AssemblyReport::examples_dropped`].
    pub fn run(mut self, sender: SyncSender<Batch>, cancel: &AtomicBool) -> Result<AssemblyReport> {
        let mut report = AssemblyReport::default();
        let mut buffer: Vec<EncodedWord> = Vec::with_capacity(self.batch_size * (2 + self.neg_samples));
        let mut buffered = 0usize;

        loop {
            if cancel.load(Ordering::Acquire) {
                report.cancelled = true;
                break;
            }
            let Some(index) = self.index_queue.pop_front() else {
                break;
            };
            buffer.extend(self.encode_example(index)?);
            buffered += 1;

            if buffered == self.batch_size {
                let batch = Batch::from_sequences(&buffer);
                buffer.clear();
                if sender.send(batch).is_err() {
                    // receiver dropped, the batch goes with it
                    report.cancelled = true;
                    break;
                }
                buffered = 0;
                report.batches_sent += 1;
            }
        }

        report.examples_dropped = buffered;
        report.examples_skipped = self.index_queue.len();
        if report.cancelled {
            tracing::info!(
                batches = report.batches_sent,
                dropped = report.examples_dropped,
                skipped = report.examples_skipped,
                "batch producer cancelled"
            );
        } else {
            if report.examples_dropped > 0 {
                tracing::warn!(
                    dropped = report.examples_dropped,
                    batch_size = self.batch_size,
                    "discarding trailing partial batch"
                );
            }
            tracing::info!(batches = report.batches_sent, "batch producer finished");
        }
        Ok(report)
    }
}
