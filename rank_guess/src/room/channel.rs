//! Outbound delivery of room events to connected players.
//!
//! Rooms never own a player's connection. They hold an [`Outbound`] handle,
//! check that it is still open and push events without waiting.

use std::{fmt, sync::Arc};
use tokio::sync::mpsc;

use super::messages::RoomEvent;

/// A player's outbound message sink, owned by the transport layer.
pub trait OutboundChannel: fmt::Debug + Send + Sync {
    /// Fire-and-forget delivery. Must never block the room.
    fn send(&self, event: RoomEvent);

    /// Whether the other end is still listening.
    fn is_open(&self) -> bool;
}

/// Shared handle to an outbound channel
pub type Outbound = Arc<dyn OutboundChannel>;

impl OutboundChannel for mpsc::Sender<RoomEvent> {
    fn send(&self, event: RoomEvent) {
        match self.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                log::warn!("Outbound channel full, dropping room event");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                log::debug!("Outbound channel closed, dropping room event");
            }
        }
    }

    fn is_open(&self) -> bool {
        !self.is_closed()
    }
}

impl OutboundChannel for mpsc::UnboundedSender<RoomEvent> {
    fn send(&self, event: RoomEvent) {
        if mpsc::UnboundedSender::send(self, event).is_err() {
            log::debug!("Outbound channel closed, dropping room event");
        }
    }

    fn is_open(&self) -> bool {
        !self.is_closed()
    }
}

/// Sends `event` if the channel is still open.
pub(crate) fn deliver(channel: &Outbound, event: RoomEvent) {
    if channel.is_open() {
        channel.send(event);
    }
}
