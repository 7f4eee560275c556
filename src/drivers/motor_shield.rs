//! WEMOS/LOLIN I2C motor shield driver (v2.0.0, HR8833 / AT8870).
//!
//! The shield runs its own MCU; the host talks to it with short command
//! frames on I2C address `0x30`:
//!
//! ```text
//!   GET_SLAVE_STATUS  [0x01]                     → [product_id, version]
//!   CHANGE_STATUS     [0x04, channel, status]
//!   CHANGE_FREQ       [0x05, channel, hz u32 LE]
//!   CHANGE_DUTY       [0x06, channel, duty×100 u16 LE]
//! ```
//!
//! The shield MCU boots slower than the ESP, so start-up polls
//! [`info`](LolinMotorShield::info) until the product id answers.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{Error as _, I2c};
use log::{debug, info, warn};

use crate::app::ports::MotorChannel;
use crate::error::MotorError;

/// Default 7-bit address of the shield.
pub const DEFAULT_ADDRESS: u8 = 0x30;

/// Product id the shield reports for a motor controller.
pub const PRODUCT_ID_MOTOR: u8 = 0x02;

const CMD_GET_SLAVE_STATUS: u8 = 0x01;
const CMD_CHANGE_STATUS: u8 = 0x04;
const CMD_CHANGE_FREQ: u8 = 0x05;
const CMD_CHANGE_DUTY: u8 = 0x06;

/// Delay between start-up probes.
const PROBE_INTERVAL_MS: u32 = 100;

/// H-bridge state of one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MotorStatus {
    Stop = 0,
    /// Counter-clockwise (backward on the rail).
    Ccw = 1,
    /// Clockwise (forward on the rail).
    Cw = 2,
    ShortBrake = 3,
    Standby = 4,
}

/// What the shield reports about itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShieldInfo {
    pub product_id: u8,
    pub version: u8,
}

const fn channel_code(channel: MotorChannel) -> u8 {
    match channel {
        MotorChannel::A => 0,
        MotorChannel::B => 1,
        MotorChannel::Both => 2,
    }
}

pub struct LolinMotorShield<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> LolinMotorShield<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self::with_address(i2c, DEFAULT_ADDRESS)
    }

    pub fn with_address(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Give the bus back.
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Query product id and firmware version.
    pub fn info(&mut self) -> Result<ShieldInfo, MotorError> {
        let mut reply = [0u8; 2];
        self.i2c
            .write_read(self.address, &[CMD_GET_SLAVE_STATUS], &mut reply)
            .map_err(|e| MotorError::Bus(e.kind()))?;
        Ok(ShieldInfo {
            product_id: reply[0],
            version: reply[1],
        })
    }

    /// Block until the shield answers with the motor product id.
    ///
    /// Bus errors during the wait are expected while the shield boots and
    /// are retried.  A *different* product id answering is not retried.
    /// Returns the firmware version.
    pub fn wait_until_ready(
        &mut self,
        attempts: u32,
        delay: &mut impl DelayNs,
    ) -> Result<u8, MotorError> {
        for attempt in 1..=attempts {
            match self.info() {
                Ok(ShieldInfo {
                    product_id: PRODUCT_ID_MOTOR,
                    version,
                }) => {
                    info!("Motor shield ready (fw v{}, attempt {})", version, attempt);
                    return Ok(version);
                }
                Ok(ShieldInfo { product_id, .. }) if product_id != 0 => {
                    warn!("Device at 0x{:02x} is not a motor shield", self.address);
                    return Err(MotorError::WrongProduct(product_id));
                }
                Ok(_) => debug!("Motor shield not up yet (attempt {})", attempt),
                Err(e) => debug!("Motor shield probe {} failed: {}", attempt, e),
            }
            delay.delay_ms(PROBE_INTERVAL_MS);
        }
        Err(MotorError::NotReady)
    }

    pub fn set_frequency(&mut self, channel: MotorChannel, hz: u32) -> Result<(), MotorError> {
        let hz = hz.to_le_bytes();
        self.send(&[
            CMD_CHANGE_FREQ,
            channel_code(channel),
            hz[0],
            hz[1],
            hz[2],
            hz[3],
        ])
    }

    /// Set PWM duty in percent; the shield resolves hundredths.
    pub fn set_duty(&mut self, channel: MotorChannel, percent: f32) -> Result<(), MotorError> {
        let duty = (percent.clamp(0.0, 100.0) * 100.0) as u16;
        let duty = duty.to_le_bytes();
        self.send(&[CMD_CHANGE_DUTY, channel_code(channel), duty[0], duty[1]])
    }

    pub fn set_status(
        &mut self,
        channel: MotorChannel,
        status: MotorStatus,
    ) -> Result<(), MotorError> {
        self.send(&[CMD_CHANGE_STATUS, channel_code(channel), status as u8])
    }

    fn send(&mut self, frame: &[u8]) -> Result<(), MotorError> {
        self.i2c
            .write(self.address, frame)
            .map_err(|e| MotorError::Bus(e.kind()))
    }
}
