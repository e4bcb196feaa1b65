//! Background task feeding a router from a transport channel
//!
//! Transport adapters push `RawEvent`s into an `EventFeed`; the pump task
//! checks them against the event vocabulary and emits them on the router.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{Result, RouterError};
use crate::event::{EventSource, MythEvent, RawEvent};
use crate::router::EventRouter;

/// Sending half handed to a transport adapter
#[derive(Debug, Clone)]
pub struct EventFeed {
    source: EventSource,
    tx: mpsc::UnboundedSender<RawEvent>,
}

impl EventFeed {
    pub fn source(&self) -> EventSource {
        self.source
    }

    /// Queue an event for routing
    pub fn send(&self, event: RawEvent) -> Result<()> {
        self.tx.send(event).map_err(|_| RouterError::ChannelClosed)
    }
}

/// Create a feed for `source` and spawn the task that drains it into `router`
///
/// The task ends when every `EventFeed` clone has been dropped.
pub fn spawn_event_pump(router: Arc<EventRouter>, source: EventSource) -> (EventFeed, JoinHandle<()>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(run_event_pump(router, source, rx));
    (EventFeed { source, tx }, handle)
}

async fn run_event_pump(
    router: Arc<EventRouter>,
    source: EventSource,
    mut rx: mpsc::UnboundedReceiver<RawEvent>,
) {
    tracing::info!(%source, "event pump started");

    while let Some(raw) = rx.recv().await {
        match MythEvent::try_from(raw) {
            Ok(event) => {
                router.emit(source, event);
            }
            Err(e) => {
                tracing::debug!(%source, "ignoring event: {}", e);
            }
        }
    }

    tracing::info!(%source, "event stream ended, pump stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventKind, EventMessage};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_pump_routes_known_events_and_skips_unknown() {
        let router = Arc::new(EventRouter::new());
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        router.on(EventSource::Backend, EventKind::SchedulerRan, move |_, _| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        let (feed, handle) = spawn_event_pump(Arc::clone(&router), EventSource::Backend);
        assert_eq!(feed.source(), EventSource::Backend);
        for name in ["SCHEDULER_RAN", "MASTER_UPDATE_PROG_INFO", "SCHEDULER_RAN"] {
            feed.send(RawEvent {
                name: name.into(),
                message: EventMessage::new(),
            })
            .unwrap();
        }
        drop(feed);
        handle.await.unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_send_after_pump_stops_fails() {
        let router = Arc::new(EventRouter::new());
        let (feed, handle) = spawn_event_pump(router, EventSource::Frontend);
        handle.abort();
        let _ = handle.await;
        let err = feed
            .send(RawEvent {
                name: "PLAY_STARTED".into(),
                message: EventMessage::new(),
            })
            .unwrap_err();
        assert_eq!(err, RouterError::ChannelClosed);
    }
}
