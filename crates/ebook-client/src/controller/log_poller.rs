use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::time::Interval;

use super::periodic;
use crate::EbookBackend;

/// Completed server log fetch, tagged with its sequence number
pub(crate) type FetchOutcome = (u64, Result<Vec<String>>);

/// Issues numbered server log fetches and paces periodic polling. Polling only
/// produces fetches while the server log is visible.
pub(crate) struct LogPoller {
    backend: Arc<dyn EbookBackend>,
    lines: usize,
    next_seq: u64,
}

impl LogPoller {
    pub(crate) fn new(backend: Arc<dyn EbookBackend>, lines: usize) -> Self {
        Self {
            backend,
            lines,
            next_seq: 0,
        }
    }

    /// A detached fetch future; it does not borrow the poller.
    pub(crate) fn fetch(&mut self) -> BoxFuture<'static, FetchOutcome> {
        self.next_seq += 1;
        let seq = self.next_seq;
        let backend = self.backend.clone();
        let lines = self.lines;

        async move {
            let logs = backend.fetch_logs(lines).await;
            (seq, logs)
        }
        .boxed()
    }

    pub(crate) fn schedule(period: Duration) -> Interval {
        periodic(period)
    }
}
