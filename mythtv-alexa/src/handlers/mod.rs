//! Capability handlers, one per namespace

mod channel;
mod health;
mod info;
mod keypad;
mod launcher;
mod playback;
mod playback_state;
mod power;
mod record;
mod seek;
mod video_player;
mod wol;

pub use channel::ChannelHandler;
pub use health::HealthHandler;
pub use info::InfoHandler;
pub use keypad::KeypadHandler;
pub use launcher::LauncherHandler;
pub use playback::PlaybackHandler;
pub use playback_state::PlaybackStateHandler;
pub use power::PowerHandler;
pub use record::RecordHandler;
pub use seek::SeekHandler;
pub use video_player::VideoPlayerHandler;
pub use wol::WakeOnLanHandler;

use std::sync::Arc;

use alexa_types::Namespace;

use crate::endpoint::Endpoint;
use crate::handler::CapabilityHandler;
use crate::mac::MacResolver;

/// Every capability handler of an endpoint, in `Namespace::ALL` order
pub fn build_handlers(
    endpoint: &Arc<Endpoint>,
    mac_resolver: &Arc<dyn MacResolver>,
) -> Vec<Arc<dyn CapabilityHandler>> {
    Namespace::ALL
        .iter()
        .map(|&namespace| build_handler(namespace, endpoint, mac_resolver))
        .collect()
}

fn build_handler(
    namespace: Namespace,
    endpoint: &Arc<Endpoint>,
    mac_resolver: &Arc<dyn MacResolver>,
) -> Arc<dyn CapabilityHandler> {
    let endpoint = Arc::clone(endpoint);
    match namespace {
        Namespace::Channel => Arc::new(ChannelHandler::new(endpoint)),
        Namespace::Playback => Arc::new(PlaybackHandler::new(endpoint)),
        Namespace::PlaybackState => Arc::new(PlaybackStateHandler::new(endpoint)),
        Namespace::Power => Arc::new(PowerHandler::new(endpoint)),
        Namespace::Record => Arc::new(RecordHandler::new(endpoint)),
        Namespace::Seek => Arc::new(SeekHandler::new(endpoint)),
        Namespace::Health => Arc::new(HealthHandler::new(endpoint)),
        Namespace::Info => Arc::new(InfoHandler::new(endpoint)),
        Namespace::Keypad => Arc::new(KeypadHandler::new(endpoint)),
        Namespace::Launcher => Arc::new(LauncherHandler::new(endpoint)),
        Namespace::VideoPlayer => Arc::new(VideoPlayerHandler::new(endpoint)),
        Namespace::WakeOnLan => Arc::new(WakeOnLanHandler::new(endpoint, Arc::clone(mac_resolver))),
    }
}
