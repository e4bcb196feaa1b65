//! Await-with-timeout on state changes
//!
//! A directive handler that needs to report the *resulting* device state
//! registers a watch before (or concurrently with) issuing the device
//! command, then awaits it:
//!
//! ```rust,ignore
//! let watch = monitor.watch(Namespace::PlaybackState, Some(("playbackState", json!("PAUSED"))));
//! frontend.send_action("PAUSE").await?;
//! let slice = watch.wait().await?;
//! ```
//!
//! The watch is registered when `watch` is called, not when `wait` is first
//! polled, and the timeout runs from registration. A write expecting a
//! different value does not resolve the watch and does not extend its
//! deadline.

use std::time::Duration;

use alexa_types::{DirectiveError, Namespace, StateSlice};
use serde_json::Value;
use tokio::sync::oneshot;
use tokio::time::Instant;

use crate::store::{EndpointStateStore, Registration, WatchId};

/// Default time a watch waits for its state change
pub const DEFAULT_MONITOR_TIMEOUT: Duration = Duration::from_millis(3000);

/// Factory for state-change watches on one endpoint's store
#[derive(Debug, Clone)]
pub struct StateMonitor {
    store: EndpointStateStore,
    timeout: Duration,
}

impl StateMonitor {
    pub fn new(store: EndpointStateStore) -> Self {
        Self::with_timeout(store, DEFAULT_MONITOR_TIMEOUT)
    }

    pub fn with_timeout(store: EndpointStateStore, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Start watching a namespace
    ///
    /// With `expected`, only a write of exactly that field/value resolves the
    /// watch, and a store already holding it resolves immediately with no
    /// slice. Without `expected`, the first write to the namespace resolves.
    pub fn watch(&self, namespace: Namespace, expected: Option<(&str, Value)>) -> StateWatch {
        let expected = expected.map(|(field, value)| (field.to_string(), value));
        let pending = match self.store.register_watch(namespace, expected) {
            Registration::Satisfied => {
                tracing::debug!(%namespace, "state already satisfied");
                None
            }
            Registration::Pending { id, receiver } => Some((id, receiver)),
        };

        StateWatch {
            namespace,
            store: self.store.clone(),
            deadline: Instant::now() + self.timeout,
            pending,
        }
    }
}

/// A registered, not yet resolved state-change wait
///
/// Dropping the watch without waiting deregisters it.
#[must_use = "a watch does nothing unless waited on"]
pub struct StateWatch {
    namespace: Namespace,
    store: EndpointStateStore,
    deadline: Instant,
    pending: Option<(WatchId, oneshot::Receiver<StateSlice>)>,
}

impl StateWatch {
    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    /// Whether the expectation was already met at registration
    pub fn is_satisfied(&self) -> bool {
        self.pending.is_none()
    }

    /// Wait for the change
    ///
    /// Returns `Ok(None)` when already satisfied at registration,
    /// `Ok(Some(slice))` with the observed field on a match, or an
    /// `EndpointBusy` error naming the namespace on timeout.
    pub async fn wait(mut self) -> Result<Option<StateSlice>, DirectiveError> {
        let Some((id, receiver)) = self.pending.take() else {
            return Ok(None);
        };

        match tokio::time::timeout_at(self.deadline, receiver).await {
            Ok(Ok(slice)) => Ok(Some(slice)),
            Ok(Err(_)) => {
                self.store.cancel_watch(self.namespace, id);
                Err(self.timeout_error())
            }
            Err(_) => {
                self.store.cancel_watch(self.namespace, id);
                tracing::debug!(namespace = %self.namespace, "state watch timed out");
                Err(self.timeout_error())
            }
        }
    }

    fn timeout_error(&self) -> DirectiveError {
        DirectiveError::endpoint_busy(format!("State Timeout {}", self.namespace))
    }
}

impl Drop for StateWatch {
    fn drop(&mut self) {
        if let Some((id, _)) = self.pending.take() {
            self.store.cancel_watch(self.namespace, id);
        }
    }
}

impl std::fmt::Debug for StateWatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateWatch")
            .field("namespace", &self.namespace)
            .field("pending", &self.pending.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alexa_types::ErrorKind;
    use serde_json::json;

    fn monitor() -> (EndpointStateStore, StateMonitor) {
        let store = EndpointStateStore::new();
        let monitor = StateMonitor::new(store.clone());
        (store, monitor)
    }

    #[tokio::test(start_paused = true)]
    async fn test_immediate_satisfaction_registers_nothing() {
        let (store, monitor) = monitor();
        store.set(Namespace::PlaybackState, "playbackState", json!("PLAYING"));

        let watch = monitor.watch(
            Namespace::PlaybackState,
            Some(("playbackState", json!("PLAYING"))),
        );
        assert!(watch.is_satisfied());
        assert_eq!(store.watcher_count(Namespace::PlaybackState), 0);
        assert_eq!(watch.wait().await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unconditional_watch_resolves_with_changed_field() {
        let (store, monitor) = monitor();
        let watch = monitor.watch(Namespace::Channel, None);

        store.set(Namespace::Channel, "channel", json!({ "number": "110" }));

        let slice = watch.wait().await.unwrap().unwrap();
        assert_eq!(
            slice.get(Namespace::Channel, "channel"),
            Some(&json!({ "number": "110" }))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_endpoint_busy_with_namespace() {
        let (store, monitor) = monitor();
        let watch = monitor.watch(Namespace::Channel, Some(("channel", json!({ "number": "1" }))));

        let err = watch.wait().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::EndpointBusy);
        assert_eq!(err.message, "State Timeout Alexa.ChannelController");
        assert_eq!(store.watcher_count(Namespace::Channel), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_matching_write_does_not_extend_deadline() {
        let (store, monitor) = monitor();
        let watch = monitor.watch(
            Namespace::PlaybackState,
            Some(("playbackState", json!("STOPPED"))),
        );

        let writer = {
            let store = store.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(2500)).await;
                store.set(Namespace::PlaybackState, "playbackState", json!("PAUSED"));
                tokio::time::sleep(Duration::from_millis(1000)).await;
                store.set(Namespace::PlaybackState, "playbackState", json!("STOPPED"));
            })
        };

        let started = Instant::now();
        let err = watch.wait().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::EndpointBusy);
        let elapsed = started.elapsed();
        assert!(elapsed >= DEFAULT_MONITOR_TIMEOUT);
        assert!(elapsed < Duration::from_millis(3500));
        writer.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_match_after_non_matching_write_within_deadline() {
        let (store, monitor) = monitor();
        let watch = monitor.watch(
            Namespace::PlaybackState,
            Some(("playbackState", json!("STOPPED"))),
        );

        store.set(Namespace::PlaybackState, "playbackState", json!("PAUSED"));
        store.set(Namespace::PlaybackState, "playbackState", json!("STOPPED"));

        let slice = watch.wait().await.unwrap().unwrap();
        assert_eq!(
            slice.get(Namespace::PlaybackState, "playbackState"),
            Some(&json!("STOPPED"))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_runs_from_registration() {
        let store = EndpointStateStore::new();
        let monitor = StateMonitor::with_timeout(store.clone(), Duration::from_millis(100));
        let watch = monitor.watch(Namespace::Record, None);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(watch.wait().await.is_err());
    }

    #[tokio::test]
    async fn test_dropped_watch_deregisters() {
        let (store, monitor) = monitor();
        let watch = monitor.watch(Namespace::Seek, None);
        assert_eq!(store.watcher_count(Namespace::Seek), 1);
        drop(watch);
        assert_eq!(store.watcher_count(Namespace::Seek), 0);
    }
}
