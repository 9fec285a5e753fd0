//! Batched backlog scheduler: strict FIFO across batches, concurrent within.

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::catalog::TrackRecord;
use crate::pipeline::{self, Services, Workspace};
use crate::progress::{Progress, ProgressKind};

/// One pending download. `redownload` is advisory: it is carried with the
/// item but no stage consults it before re-running.
#[derive(Debug)]
pub struct BacklogItem {
    pub track: TrackRecord,
    pub redownload: bool,
}

/// Ordered pending-work queue. Insertion order equals playlist/album track
/// order; the draining scheduler is the single mutator.
#[derive(Default)]
pub struct Backlog {
    items: VecDeque<BacklogItem>,
}

impl Backlog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: BacklogItem) {
        self.items.push_back(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Removes and returns up to `n` items from the front.
    fn take_batch(&mut self, n: usize) -> Vec<BacklogItem> {
        let take = n.min(self.items.len());
        self.items.drain(..take).collect()
    }
}

/// Outcome counts for one backlog drain.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct QueueReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl QueueReport {
    pub fn single(succeeded: bool) -> Self {
        Self {
            attempted: 1,
            succeeded: usize::from(succeeded),
            failed: usize::from(!succeeded),
        }
    }
}

/// Drains the backlog `batch_size` items at a time. Pipelines within a batch
/// run concurrently and each reports progress independently; the next batch
/// starts only once every pipeline in the current batch has resolved. Items
/// leave the queue whether or not their pipeline succeeded, so one failure
/// never stalls the drain.
pub async fn drain_backlog(
    services: Arc<Services>,
    workspace: Workspace,
    backlog: &mut Backlog,
    batch_size: usize,
    progress_tx: Option<mpsc::Sender<String>>,
) -> QueueReport {
    let batch_size = batch_size.max(1);
    let mut report = QueueReport::default();

    while !backlog.is_empty() {
        let batch = backlog.take_batch(batch_size);
        let mut join_set = JoinSet::new();
        for item in batch {
            report.attempted += 1;
            let label = item.track.display_name();
            let download =
                pipeline::download_track(Arc::clone(&services), workspace.clone(), item.track);
            if let Some(tx) = progress_tx.clone() {
                let mut messages = download.subscribe(ProgressKind::Message);
                tokio::spawn(async move {
                    while let Some(Progress::Message(line)) = messages.recv().await {
                        if tx.send(line).await.is_err() {
                            break;
                        }
                    }
                });
            }
            let tx = progress_tx.clone();
            join_set.spawn(async move {
                match download.join().await {
                    Ok(summary) => {
                        if let Some(tx) = &tx {
                            let _ = tx.send(summary.message).await;
                        }
                        true
                    }
                    Err(e) => {
                        tracing::warn!(track = %label, "download failed: {e}");
                        if let Some(tx) = &tx {
                            let _ = tx.send(format!("Error downloading {label}: {e}")).await;
                        }
                        false
                    }
                }
            });
        }
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(true) => report.succeeded += 1,
                Ok(false) => report.failed += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!("pipeline task join: {e}");
                }
            }
        }
    }

    report
}
