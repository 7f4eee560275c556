//! Inbound control-channel events.
//!
//! Transports translate their own connection callbacks into
//! [`ChannelEvent`]s and hand them to
//! [`RailService::handle`](super::service::RailService::handle) one at a
//! time.

/// Transport-assigned peer number, stable for the life of a connection.
pub type PeerId = u8;

/// Longest text frame accepted from a peer, in bytes.
pub const MAX_MESSAGE_LEN: usize = 64;

/// Message payload, bounded so a peer cannot grow the controller's memory.
pub type Payload = heapless::Vec<u8, MAX_MESSAGE_LEN>;

/// Lifecycle and data events of the bidirectional control channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    Connected { peer: PeerId },
    Disconnected { peer: PeerId },
    Message { peer: PeerId, payload: Payload },
}

impl ChannelEvent {
    /// Build a `Message` event, or `None` if `bytes` exceeds
    /// [`MAX_MESSAGE_LEN`].
    pub fn message(peer: PeerId, bytes: &[u8]) -> Option<Self> {
        Payload::from_slice(bytes)
            .ok()
            .map(|payload| Self::Message { peer, payload })
    }
}
