//! Frontend activity tracking
//!
//! Keeps the connected / watching / watching-live-TV flags of a frontend
//! current from its event stream, so handlers can answer "is something
//! playing" without a status round trip.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use event_router::{EventKind, EventRouter, EventSource, MythEvent};

use crate::model::FrontendStatus;

#[derive(Debug, Default)]
struct Flags {
    connected: AtomicBool,
    watching: AtomicBool,
    watching_tv: AtomicBool,
}

/// Event-derived view of what a frontend is doing
#[derive(Debug, Clone, Default)]
pub struct FrontendActivity {
    flags: Arc<Flags>,
}

impl FrontendActivity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialize from a status snapshot; `None` means unreachable
    pub fn seed(&self, status: Option<&FrontendStatus>) {
        let flags = &self.flags;
        flags.connected.store(status.is_some(), Ordering::SeqCst);
        flags
            .watching
            .store(status.is_some_and(FrontendStatus::is_watching), Ordering::SeqCst);
        flags.watching_tv.store(
            status.is_some_and(FrontendStatus::is_watching_live_tv),
            Ordering::SeqCst,
        );
    }

    pub fn is_connected(&self) -> bool {
        self.flags.connected.load(Ordering::SeqCst)
    }

    pub fn is_watching(&self) -> bool {
        self.flags.watching.load(Ordering::SeqCst)
    }

    pub fn is_watching_tv(&self) -> bool {
        self.flags.watching_tv.load(Ordering::SeqCst)
    }

    /// Apply one frontend event
    pub fn apply(&self, event: &MythEvent) {
        let flags = &self.flags;
        match event.kind {
            EventKind::ClientConnected => flags.connected.store(true, Ordering::SeqCst),
            EventKind::ClientDisconnected => {
                flags.connected.store(false, Ordering::SeqCst);
                flags.watching.store(false, Ordering::SeqCst);
                flags.watching_tv.store(false, Ordering::SeqCst);
            }
            EventKind::PlayStarted
            | EventKind::PlayChanged
            | EventKind::PlayUnpaused
            | EventKind::PlayPaused => flags.watching.store(true, Ordering::SeqCst),
            EventKind::LiveTvStarted => {
                flags.watching.store(true, Ordering::SeqCst);
                flags.watching_tv.store(true, Ordering::SeqCst);
            }
            EventKind::LiveTvEnded => flags.watching_tv.store(false, Ordering::SeqCst),
            EventKind::PlayStopped => {
                flags.watching.store(false, Ordering::SeqCst);
                flags.watching_tv.store(false, Ordering::SeqCst);
            }
            EventKind::RecStarted | EventKind::SchedulerRan => {}
        }
    }

    /// Follow the frontend event stream of `router`
    ///
    /// Subscribe before any capability handler so handlers observe the
    /// updated flags.
    pub fn subscribe(&self, router: &EventRouter) {
        for kind in [
            EventKind::ClientConnected,
            EventKind::ClientDisconnected,
            EventKind::PlayStarted,
            EventKind::PlayChanged,
            EventKind::PlayUnpaused,
            EventKind::PlayPaused,
            EventKind::PlayStopped,
            EventKind::LiveTvStarted,
            EventKind::LiveTvEnded,
        ] {
            let activity = self.clone();
            router.on(EventSource::Frontend, kind, move |event, _| activity.apply(event));
        }
    }
}
