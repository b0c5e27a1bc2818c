//! Result collection
//!
//! Workers write [`PublishResult`]s into one bounded FIFO sized to the
//! request budget. A single collector task drains it so producers never
//! stall, and hands everything to the reporting side as a
//! [`ResultStream`], either after all workers are done ([`finish`]) or
//! immediately on interrupt ([`abandon`]).
//!
//! [`finish`]: ResultCollector::finish
//! [`abandon`]: ResultCollector::abandon

use crate::result::PublishResult;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Sender half handed to each worker
pub type ResultSender = mpsc::Sender<PublishResult>;

/// Bounded multi-producer, single-consumer result buffer
pub struct ResultCollector {
    tx: ResultSender,
    stop: CancellationToken,
    handle: JoinHandle<Vec<PublishResult>>,
    capacity: usize,
}

impl ResultCollector {
    /// Start a collector with room for `capacity` buffered results
    pub fn spawn(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, rx) = mpsc::channel(capacity);
        let stop = CancellationToken::new();
        let handle = tokio::spawn(collect(rx, stop.clone(), capacity));

        Self {
            tx,
            stop,
            handle,
            capacity,
        }
    }

    /// A sender for one producer
    pub fn sender(&self) -> ResultSender {
        self.tx.clone()
    }

    /// Buffer capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Wait until every producer has dropped its sender, then return all results
    pub async fn finish(self) -> ResultStream {
        drop(self.tx);
        ResultStream::new(self.handle.await.unwrap_or_default())
    }

    /// Stop collecting now and return whatever has arrived
    ///
    /// Never waits for producers that are still running.
    pub async fn abandon(self) -> ResultStream {
        self.stop.cancel();
        drop(self.tx);
        ResultStream::new(self.handle.await.unwrap_or_default())
    }
}

async fn collect(
    mut rx: mpsc::Receiver<PublishResult>,
    stop: CancellationToken,
    capacity: usize,
) -> Vec<PublishResult> {
    let mut results = Vec::with_capacity(capacity);

    loop {
        tokio::select! {
            biased;

            _ = stop.cancelled() => {
                while let Ok(result) = rx.try_recv() {
                    results.push(result);
                }
                break;
            }

            next = rx.recv() => match next {
                Some(result) => results.push(result),
                None => break,
            },
        }
    }

    tracing::debug!(collected = results.len(), "Result collector drained");
    results
}

/// Drainable stream of collected results, in arrival order
#[derive(Debug, Default)]
pub struct ResultStream {
    results: std::vec::IntoIter<PublishResult>,
}

impl ResultStream {
    /// Wrap already-collected results
    pub fn new(results: Vec<PublishResult>) -> Self {
        Self {
            results: results.into_iter(),
        }
    }

    /// Results not yet drained
    pub fn remaining(&self) -> usize {
        self.results.len()
    }
}

impl Iterator for ResultStream {
    type Item = PublishResult;

    fn next(&mut self) -> Option<Self::Item> {
        self.results.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.results.size_hint()
    }
}

impl ExactSizeIterator for ResultStream {}
