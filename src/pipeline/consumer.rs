// src/pipeline/consumer.rs

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, sync_channel};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::pipeline::assembler::{AssemblyReport, BatchAssembler};
use crate::pipeline::batch::Batch;
use crate::pipeline::{Error, Result};

/// Consumer side of the batch channel, one epoch long.
///
/// The producer runs on its own thread and pushes into a channel of
/// `queue_depth` batches. The stream ends when the producer hangs up after its
/// last batch, or when nothing arrives within the timeout: `short_timeout` once
/// the producer is known to be done, `long_timeout` before that. A timeout
/// cancels the producer.
///
/// Cancelling, explicitly or by dropping the stream, can lose the batch the
/// producer was filling at that moment.
///
/// A failing producer (for instance `Error::NegativeSampling`) also just ends
/// the stream. The error is logged with `tracing::error!` as soon as the stream
/// sees the producer hang up, and is returned by [`BatchStream::finish`], so
/// callers that care should finish the stream instead of dropping it.
pub struct BatchStream {
    receiver: Option<Receiver<Batch>>,
    producer: Option<JoinHandle<Result<AssemblyReport>>>,
    cancel: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
    short_timeout: Duration,
    long_timeout: Duration,
    outcome: Option<Result<AssemblyReport>>,
}

impl BatchStream {
    pub fn spawn(
        assembler: BatchAssembler,
        queue_depth: usize,
        short_timeout: Duration,
        long_timeout: Duration,
    ) -> Result<Self> {
        let (sender, receiver) = sync_channel(queue_depth);
        let cancel = Arc::new(AtomicBool::new(false));
        let finished = Arc::new(AtomicBool::new(false));

        let producer = {
            let cancel = Arc::clone(&cancel);
            let finished = Arc::clone(&finished);
            thread::Builder::new()
                .name("batch-producer".to_string())
                .spawn(move || {
                    let outcome = assembler.run(sender, &cancel);
                    finished.store(true, Ordering::Release);
                    outcome
                })?
        };

        Ok(Self {
            receiver: Some(receiver),
            producer: Some(producer),
            cancel,
            finished,
            short_timeout,
            long_timeout,
            outcome: None,
        })
    }

    pub fn is_producer_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    /// Stops the producer and waits for it. Queued batches are discarded.
    pub fn cancel(&mut self) {
        self.cancel.store(true, Ordering::Release);
        // a producer blocked in `send` wakes up once the receiver is gone
        self.receiver.take();
        self.join_producer();
    }

    /// Ends the epoch and returns what the producer reported. Called before the
    /// stream is exhausted this cancels the producer first.
    pub fn finish(mut self) -> Result<AssemblyReport> {
        self.cancel();
        self.outcome.take().unwrap_or(Err(Error::ProducerPanicked))
    }

    fn join_producer(&mut self) {
        if let Some(handle) = self.producer.take() {
            let outcome = match handle.join() {
                Ok(outcome) => outcome,
                Err(_) => Err(Error::ProducerPanicked),
            };
            if let Err(e) = &outcome {
                tracing::error!(error = %e, "batch producer failed");
            }
            self.outcome = Some(outcome);
        }
    }
}

impl Iterator for BatchStream {
    type Item = Batch;

    fn next(&mut self) -> Option<Batch> {
        let timeout = if self.is_producer_finished() {
            self.short_timeout
        } else {
            self.long_timeout
        };
        let received = self.receiver.as_ref()?.recv_timeout(timeout);
        match received {
            Ok(batch) => Some(batch),
            Err(RecvTimeoutError::Disconnected) => {
                // producer returned and dropped its sender, every batch was read;
                // a producer error gets logged by the join
                self.receiver.take();
                self.join_producer();
                None
            }
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!(
                    timeout_ms = timeout.as_millis() as u64,
                    producer_finished = self.is_producer_finished(),
                    "no batch within timeout, ending epoch"
                );
                self.cancel();
                None
            }
        }
    }
}

impl Drop for BatchStream {
    fn drop(&mut self) {
        self.cancel();
    }
}
