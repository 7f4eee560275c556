//! Status messages sent to channel peers.
//!
//! ```text
//! {"ssid":"microrail01","version":"MicroRail R v0.5.0",
//!  "direction":0,"speed":0,"batRate":100,"batVoltage":4.2}
//! ```
//!
//! `speed` is the *actual* speed, not the target: peers see the ramp
//! move, one tick at a time.

use log::{debug, warn};
use serde::Serialize;

use crate::control::ramp::VehicleState;
use crate::sensors::battery::PowerState;

use super::events::PeerId;
use super::ports::PeerChannel;

/// Immutable view of the vehicle, built per message and then dropped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSnapshot<'a> {
    pub ssid: &'a str,
    pub version: &'a str,
    /// 0 = forward, 1 = backward.
    pub direction: u8,
    /// Actual speed, not the target.
    pub speed: u8,
    #[serde(rename = "batRate")]
    pub battery_percent: u8,
    #[serde(rename = "batVoltage")]
    pub battery_voltage: f32,
}

impl StatusSnapshot<'_> {
    /// JSON text of the snapshot.  `None` only if serialization fails.
    pub fn to_json(&self) -> Option<String> {
        match serde_json::to_string(self) {
            Ok(text) => Some(text),
            Err(e) => {
                warn!("Status serialization failed: {}", e);
                None
            }
        }
    }
}

/// Builds snapshots and pushes them to the channel.
pub struct StatusBroadcaster {
    ssid: String,
    version: String,
}

impl StatusBroadcaster {
    pub fn new(ssid: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            ssid: ssid.into(),
            version: version.into(),
        }
    }

    pub fn snapshot(&self, vehicle: &VehicleState, power: &PowerState) -> StatusSnapshot<'_> {
        StatusSnapshot {
            ssid: &self.ssid,
            version: &self.version,
            direction: vehicle.direction.code(),
            speed: vehicle.actual_speed,
            battery_percent: power.percent,
            battery_voltage: power.voltage,
        }
    }

    /// Send `snapshot` to every connected peer.
    pub fn broadcast_all(&self, snapshot: &StatusSnapshot<'_>, channel: &mut impl PeerChannel) {
        if let Some(text) = snapshot.to_json() {
            debug!("Broadcast: {}", text);
            channel.broadcast(&text);
        }
    }

    /// Send `snapshot` to a single peer.
    pub fn send_to(
        &self,
        peer: PeerId,
        snapshot: &StatusSnapshot<'_>,
        channel: &mut impl PeerChannel,
    ) {
        if let Some(text) = snapshot.to_json() {
            debug!("Unicast to peer {}: {}", peer, text);
            channel.send_to(peer, &text);
        }
    }
}
