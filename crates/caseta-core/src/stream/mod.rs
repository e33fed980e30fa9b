// ── Registry snapshot subscriptions ──
//
// Consumers hold a `SnapshotStream` to read the device table as of their
// last observation and to wait for the next registry mutation.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_util::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

type Snapshot<T> = Arc<Vec<Arc<T>>>;

/// A subscription to a snapshotted collection of records.
///
/// `current()` is the view as of creation or the last [`changed()`](Self::changed);
/// `latest()` always reads through to the live table.
pub struct SnapshotStream<T: Clone + Send + Sync + 'static> {
    current: Snapshot<T>,
    receiver: watch::Receiver<Snapshot<T>>,
}

impl<T: Clone + Send + Sync + 'static> SnapshotStream<T> {
    pub(crate) fn new(receiver: watch::Receiver<Snapshot<T>>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    pub fn current(&self) -> &Snapshot<T> {
        &self.current
    }

    pub fn latest(&self) -> Snapshot<T> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next mutation. `None` once the registry is gone.
    pub async fn changed(&mut self) -> Option<Snapshot<T>> {
        self.receiver.changed().await.ok()?;
        self.current = self.receiver.borrow_and_update().clone();
        Some(Arc::clone(&self.current))
    }

    /// Wait until some record satisfies `pred`, checking the latest view first.
    ///
    /// Returns the matching record, or `None` if the registry is dropped first.
    pub async fn wait_for<F>(&mut self, mut pred: F) -> Option<Arc<T>>
    where
        F: FnMut(&T) -> bool,
    {
        self.current = self.receiver.borrow_and_update().clone();
        loop {
            if let Some(found) = self.current.iter().find(|r| pred(r)) {
                return Some(Arc::clone(found));
            }
            self.changed().await?;
        }
    }

    pub fn into_stream(self) -> SnapshotWatchStream<T> {
        SnapshotWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` of registry snapshots, one per mutation.
pub struct SnapshotWatchStream<T: Clone + Send + Sync + 'static> {
    inner: WatchStream<Snapshot<T>>,
}

impl<T: Clone + Send + Sync + 'static> Stream for SnapshotWatchStream<T> {
    type Item = Snapshot<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
