//! Delta Coordinator
//!
//! Tracks the asynchronous work spawned under each `DeltaId` so a refresh or
//! event can be declared complete once everything it started has drained.

use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;

use alexa_types::DeltaId;
use parking_lot::Mutex;
use tokio::task::JoinHandle;

/// Tracks in-flight work per delta id
#[derive(Debug, Default)]
pub struct DeltaCoordinator {
    pending: Mutex<HashMap<DeltaId, Vec<JoinHandle<()>>>>,
}

impl DeltaCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh delta id
    pub fn new_delta_id(&self) -> DeltaId {
        DeltaId::next()
    }

    /// Spawn `work` and track it under `delta`
    ///
    /// A failure is logged here and does not affect `settle`.
    pub fn track<F, E>(&self, delta: DeltaId, work: F)
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            if let Err(e) = work.await {
                tracing::warn!(%delta, "tracked update failed: {}", e);
            }
        });
        self.pending.lock().entry(delta).or_default().push(handle);
    }

    /// Number of tracked operations not yet collected by `settle`
    pub fn pending(&self, delta: DeltaId) -> usize {
        self.pending
            .lock()
            .get(&delta)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Wait until every operation tracked under `delta` has finished
    ///
    /// Work tracked while settling is waited on as well. Never fails: a
    /// panicking operation is logged like a failed one.
    pub async fn settle(&self, delta: DeltaId) {
        loop {
            let handles = match self.pending.lock().remove(&delta) {
                Some(handles) if !handles.is_empty() => handles,
                _ => break,
            };
            for handle in handles {
                if let Err(e) = handle.await {
                    tracing::warn!(%delta, "tracked update aborted: {}", e);
                }
            }
        }
    }
}
