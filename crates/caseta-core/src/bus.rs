//! In-process event bus.
//!
//! Stands in for the host platform's bus: events fan out to every live
//! subscriber over a `broadcast` channel, in publish order. Publishing
//! never blocks; a subscriber that falls more than `capacity` events
//! behind skips ahead and the gap is logged.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::{Stream, StreamExt};
use serde::Serialize;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tracing::{debug, warn};

use crate::model::ButtonActivity;

/// Event type fired for every keypad button action.
pub const BUTTON_EVENT: &str = "lutron_caseta_button_event";

/// Default number of events buffered per subscriber.
pub const DEFAULT_CAPACITY: usize = 256;

/// One event as delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BusEvent {
    pub event_type: String,
    pub data: ButtonActivity,
    pub time_fired: DateTime<Utc>,
}

/// Cheap-clone handle to the bus; clones share one channel.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<Arc<BusEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Fire a button event. Returns how many subscribers it reached.
    pub fn publish_button_activity(&self, data: ButtonActivity) -> usize {
        self.publish(BusEvent {
            event_type: BUTTON_EVENT.into(),
            data,
            time_fired: Utc::now(),
        })
    }

    /// Publish a fully-formed event. With no subscribers the event is discarded.
    pub fn publish(&self, event: BusEvent) -> usize {
        debug!(
            event_type = %event.event_type,
            button_id = %event.data.button_id,
            action = %event.data.action,
            "firing bus event"
        );
        self.tx.send(Arc::new(event)).unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn subscribe(&self) -> EventBusReceiver {
        EventBusReceiver {
            rx: self.tx.subscribe(),
        }
    }

    /// Subscribe as a `Stream`, skipping over lag gaps.
    pub fn stream(&self) -> impl Stream<Item = Arc<BusEvent>> + Send + 'static {
        BroadcastStream::new(self.tx.subscribe()).filter_map(|item| async move {
            match item {
                Ok(event) => Some(event),
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    warn!(skipped, "bus subscriber lagged");
                    None
                }
            }
        })
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiver for every event published after it was created.
pub struct EventBusReceiver {
    rx: broadcast::Receiver<Arc<BusEvent>>,
}

impl EventBusReceiver {
    /// Wait for the next event. Returns `None` once every bus handle is gone.
    pub async fn recv(&mut self) -> Option<Arc<BusEvent>> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "bus subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Take the next event if one is already queued.
    pub fn try_recv(&mut self) -> Option<Arc<BusEvent>> {
        loop {
            match self.rx.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "bus subscriber lagged");
                }
                Err(_) => return None,
            }
        }
    }
}
