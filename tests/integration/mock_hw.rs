//! Mock adapters for integration tests.
//!
//! Records every motor call, channel send and I2C frame so tests can
//! assert on the full history without real hardware.

use std::collections::VecDeque;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};
use microrail::app::events::PeerId;
use microrail::app::ports::{AnalogPort, MotorChannel, MotorPort, PeerChannel};
use microrail::control::ramp::Direction;

// ── Motor + ADC ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum MotorCall {
    Duty { channel: MotorChannel, percent: f32 },
    Direction { channel: MotorChannel, direction: Direction },
}

pub struct MockHardware {
    pub calls: Vec<MotorCall>,
    pub raw: u16,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            raw: 1023,
        }
    }

    pub fn with_battery_raw(raw: u16) -> Self {
        Self {
            calls: Vec::new(),
            raw,
        }
    }

    pub fn duties(&self) -> Vec<f32> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                MotorCall::Duty { percent, .. } => Some(*percent),
                MotorCall::Direction { .. } => None,
            })
            .collect()
    }

    pub fn directions(&self) -> Vec<Direction> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                MotorCall::Direction { direction, .. } => Some(*direction),
                MotorCall::Duty { .. } => None,
            })
            .collect()
    }
}

impl MotorPort for MockHardware {
    fn set_duty(&mut self, channel: MotorChannel, percent: f32) {
        self.calls.push(MotorCall::Duty { channel, percent });
    }

    fn set_direction(&mut self, channel: MotorChannel, direction: Direction) {
        self.calls.push(MotorCall::Direction { channel, direction });
    }
}

impl AnalogPort for MockHardware {
    fn read_raw(&mut self) -> u16 {
        self.raw
    }
}

// ── Control channel ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Unicast { peer: PeerId, text: String },
    Broadcast { text: String },
}

pub struct MockChannel {
    pub sent: Vec<Sent>,
}

#[allow(dead_code)]
impl MockChannel {
    pub fn new() -> Self {
        Self { sent: Vec::new() }
    }

    pub fn broadcasts(&self) -> Vec<serde_json::Value> {
        self.sent
            .iter()
            .filter_map(|s| match s {
                Sent::Broadcast { text } => Some(serde_json::from_str(text).unwrap()),
                Sent::Unicast { .. } => None,
            })
            .collect()
    }

    pub fn unicasts(&self) -> Vec<(PeerId, serde_json::Value)> {
        self.sent
            .iter()
            .filter_map(|s| match s {
                Sent::Unicast { peer, text } => Some((*peer, serde_json::from_str(text).unwrap())),
                Sent::Broadcast { .. } => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.sent.clear();
    }
}

impl PeerChannel for MockChannel {
    fn send_to(&mut self, peer: PeerId, text: &str) {
        self.sent.push(Sent::Unicast {
            peer,
            text: text.to_owned(),
        });
    }

    fn broadcast(&mut self, text: &str) {
        self.sent.push(Sent::Broadcast {
            text: text.to_owned(),
        });
    }
}

// ── I2C bus ───────────────────────────────────────────────────

/// Scripted I2C bus: records writes, answers reads from a queue.
pub struct MockI2c {
    pub writes: Vec<(u8, Vec<u8>)>,
    pub replies: VecDeque<Result<[u8; 2], ErrorKind>>,
    pub fail_writes: bool,
}

#[allow(dead_code)]
impl MockI2c {
    pub fn new() -> Self {
        Self {
            writes: Vec::new(),
            replies: VecDeque::new(),
            fail_writes: false,
        }
    }

    pub fn reply(mut self, r: Result<[u8; 2], ErrorKind>) -> Self {
        self.replies.push_back(r);
        self
    }
}

impl ErrorType for MockI2c {
    type Error = ErrorKind;
}

impl I2c for MockI2c {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        for op in operations {
            match op {
                Operation::Write(bytes) => {
                    if self.fail_writes {
                        return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
                    }
                    self.writes.push((address, bytes.to_vec()));
                }
                Operation::Read(buf) => {
                    let reply = self
                        .replies
                        .pop_front()
                        .unwrap_or(Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)))?;
                    buf.copy_from_slice(&reply[..buf.len()]);
                }
            }
        }
        Ok(())
    }
}

/// Delay that returns immediately and counts `delay_ms` calls.
pub struct NoDelay {
    pub calls: u32,
}

#[allow(dead_code)]
impl NoDelay {
    pub fn new() -> Self {
        Self { calls: 0 }
    }
}

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}

    fn delay_ms(&mut self, _ms: u32) {
        self.calls += 1;
    }
}
