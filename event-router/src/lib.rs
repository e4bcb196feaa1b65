//! # MythTV Event Router
//!
//! Delivers MythTV frontend and backend events to the capability handlers of
//! one endpoint.
//!
//! ## Key Features
//!
//! - **Closed Vocabulary**: events are typed `EventKind`s; unknown names are dropped at the edge
//! - **Two Sources**: frontend-local and master-backend streams are routed independently
//! - **Ordered Delivery**: each handler sees events strictly in emission order
//! - **Delta Correlation**: every emission carries one fresh `DeltaId` to all its handlers
//! - **Post Hooks**: run after all handlers so the emission's delta can be completed
//!
//! ## Usage
//!
//! ```rust,ignore
//! use event_router::{EventKind, EventRouter, EventSource};
//!
//! let router = Arc::new(EventRouter::new());
//! router.on(EventSource::Frontend, EventKind::PlayStopped, |event, delta| {
//!     tracing::info!("stopped ({delta})");
//! });
//!
//! let (feed, _task) = event_router::spawn_event_pump(router.clone(), EventSource::Frontend);
//! feed.send(RawEvent { name: "PLAY_STOPPED".into(), message: Default::default() })?;
//! ```

pub mod error;
pub mod event;
pub mod pump;
pub mod router;

pub use error::{Result, RouterError};
pub use event::{EventKind, EventMessage, EventSource, MythEvent, RawEvent};
pub use pump::{spawn_event_pump, EventFeed};
pub use router::{EventHandler, EventRouter, PostHandler, SubscriptionId};
