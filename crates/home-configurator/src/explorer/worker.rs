use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use super::{choice_price_ranges, ChoicePriceRange, ExplorerConfig, PriceRangeRequest};

/// Error raised when the explorer worker is no longer accepting requests.
#[derive(Debug, thiserror::Error)]
pub enum ExplorerError {
    #[error("price range worker stopped")]
    WorkerStopped,
}

struct WorkerJob {
    request: PriceRangeRequest,
    reply: oneshot::Sender<Vec<ChoicePriceRange>>,
}

/// Handle to a background price-range worker: requests go over a channel to
/// a blocking task that owns its cloned input and answers with a plain
/// result message, keeping the combinatorial search off the interactive
/// path. There is no cancellation; abandon a long run by dropping the
/// handle, which closes the channel and lets the task wind down.
pub struct PriceRangeWorker {
    sender: mpsc::Sender<WorkerJob>,
}

impl PriceRangeWorker {
    /// Spawns the worker onto the current tokio runtime's blocking pool.
    pub fn spawn(config: ExplorerConfig) -> Self {
        let (sender, mut receiver) = mpsc::channel::<WorkerJob>(8);
        tokio::task::spawn_blocking(move || {
            while let Some(job) = receiver.blocking_recv() {
                let ranges = choice_price_ranges(&job.request, &config);
                debug!(ranges = ranges.len(), "price range batch complete");
                let _ = job.reply.send(ranges);
            }
        });
        Self { sender }
    }

    /// Submits one batch computation and awaits its result.
    pub async fn submit(
        &self,
        request: PriceRangeRequest,
    ) -> Result<Vec<ChoicePriceRange>, ExplorerError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(WorkerJob { request, reply })
            .await
            .map_err(|_| ExplorerError::WorkerStopped)?;
        response.await.map_err(|_| ExplorerError::WorkerStopped)
    }
}
