//! Hardware adapter: bridges the motor shield to the [`MotorPort`].
//!
//! The domain treats motor writes as fire-and-forget.  Bus errors are
//! logged and counted here; the next ramp tick writes the duty again, so
//! a dropped frame heals itself.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::{info, warn};

use crate::app::ports::{MotorChannel, MotorPort};
use crate::control::ramp::Direction;
use crate::drivers::motor_shield::{LolinMotorShield, MotorStatus};
use crate::error::MotorError;

/// Probes before giving up on the shield (100 ms apart).
pub const READY_ATTEMPTS: u32 = 50;

pub struct MotorShieldAdapter<I2C> {
    shield: LolinMotorShield<I2C>,
    bus_errors: u32,
}

impl<I2C: I2c> MotorShieldAdapter<I2C> {
    pub fn new(shield: LolinMotorShield<I2C>) -> Self {
        Self {
            shield,
            bus_errors: 0,
        }
    }

    /// Wait for the shield and set the PWM frequency on both channels.
    ///
    /// Must succeed before the service starts taking events.
    pub fn init(&mut self, frequency_hz: u32, delay: &mut impl DelayNs) -> Result<(), MotorError> {
        let version = self.shield.wait_until_ready(READY_ATTEMPTS, delay)?;
        self.shield.set_frequency(MotorChannel::Both, frequency_hz)?;
        info!("Motor shield v{} at {} Hz", version, frequency_hz);
        Ok(())
    }

    /// Failed writes since construction.
    pub fn bus_errors(&self) -> u32 {
        self.bus_errors
    }

    pub fn into_inner(self) -> LolinMotorShield<I2C> {
        self.shield
    }

    fn record(&mut self, what: &str, result: Result<(), MotorError>) {
        if let Err(e) = result {
            self.bus_errors = self.bus_errors.saturating_add(1);
            warn!("Motor {} failed: {} ({} errors)", what, e, self.bus_errors);
        }
    }
}

impl<I2C: I2c> MotorPort for MotorShieldAdapter<I2C> {
    fn set_duty(&mut self, channel: MotorChannel, percent: f32) {
        let result = self.shield.set_duty(channel, percent);
        self.record("duty", result);
    }

    fn set_direction(&mut self, channel: MotorChannel, direction: Direction) {
        let status = match direction {
            Direction::Forward => MotorStatus::Cw,
            Direction::Backward => MotorStatus::Ccw,
        };
        let result = self.shield.set_status(channel, status);
        self.record("direction", result);
    }
}
