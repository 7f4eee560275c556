//! Time-based speed ramp for the drive motors.
//!
//! Commands only move the *target* speed.  The *actual* speed follows it
//! one fixed step per tick, so the vehicle never jumps from standstill to
//! full duty.  There is no speed feedback: the ramp is purely open-loop.
//!
//! Steps are always whole.  A target that is not a step multiple away is
//! never hit exactly; the speed then alternates around it, one step wide:
//!
//! ```text
//!   step 7, target 10:  0 → 7 → 14 → 7 → 14 → …
//! ```
//!
//! ## Safety contract
//!
//! Direction may only change while the motor is at standstill
//! (`actual_speed == 0`).  Reversing under load stresses the gearbox, so
//! requests at speed are dropped, not queued.

use log::{debug, info};

use crate::app::ports::{MotorChannel, MotorPort};
use crate::config::RailConfig;

/// Highest speed, in percent.
pub const MAX_SPEED: u8 = 100;

/// Direction of travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

impl Direction {
    /// Wire code used in status messages (0 = forward, 1 = backward).
    pub const fn code(self) -> u8 {
        match self {
            Self::Forward => 0,
            Self::Backward => 1,
        }
    }
}

/// Vehicle motion state.  Only [`MotionRamp`] writes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VehicleState {
    pub direction: Direction,
    /// Speed currently applied to the motors (0–100 %).
    pub actual_speed: u8,
    /// Speed the ramp is heading for (0–100 %).
    pub target_speed: u8,
}

/// Result of a ramp tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RampOutcome {
    Unchanged,
    Changed,
}

pub struct MotionRamp {
    state: VehicleState,
    step: u8,
    max_speed_fraction: f32,
}

impl MotionRamp {
    pub fn new(step: u8, max_speed_fraction: f32) -> Self {
        Self {
            state: VehicleState::default(),
            step: step.max(1),
            max_speed_fraction,
        }
    }

    pub fn from_config(config: &RailConfig) -> Self {
        Self::new(config.speed_step, config.max_speed_fraction)
    }

    pub fn state(&self) -> VehicleState {
        self.state
    }

    /// Configured step magnitude (percent per command / per tick).
    pub fn step(&self) -> u8 {
        self.step
    }

    /// Set an absolute target, clamped to `0..=100`.  The motors are not
    /// touched until the next [`tick`](Self::tick).
    pub fn set_target(&mut self, speed: i32) {
        self.state.target_speed = speed.clamp(0, MAX_SPEED as i32) as u8;
    }

    /// Move the target by `delta`, saturating at the bounds.
    pub fn adjust_target(&mut self, delta: i32) {
        self.set_target((self.state.target_speed as i32).saturating_add(delta));
    }

    /// Change direction if the motor is at standstill.
    ///
    /// Returns `true` if the direction changed and the motor was commanded.
    /// At speed, or when `direction` is already in effect, nothing happens.
    pub fn set_direction(&mut self, direction: Direction, motor: &mut impl MotorPort) -> bool {
        if self.state.actual_speed != 0 || self.state.direction == direction {
            return false;
        }
        self.state.direction = direction;
        motor.set_direction(MotorChannel::Both, direction);
        info!("Direction set to {:?}", direction);
        true
    }

    /// Advance the actual speed one full step toward the target.
    ///
    /// Only the `0..=100` bounds limit the step, not the target itself.
    /// Ticks report [`RampOutcome::Unchanged`] once the speed sits exactly
    /// on the target.
    pub fn tick(&mut self, motor: &mut impl MotorPort) -> RampOutcome {
        let actual = self.state.actual_speed as i32;
        let target = self.state.target_speed as i32;
        if actual == target {
            return RampOutcome::Unchanged;
        }

        let step = self.step as i32;
        let next = if actual < target {
            actual + step
        } else {
            actual - step
        };
        self.state.actual_speed = next.clamp(0, MAX_SPEED as i32) as u8;

        let duty = self.duty_percent();
        motor.set_duty(MotorChannel::Both, duty);
        debug!(
            "Ramp: speed {} -> {} (target {}, duty {:.1}%)",
            actual, self.state.actual_speed, target, duty
        );
        RampOutcome::Changed
    }

    /// Duty applied for the current actual speed.
    pub fn duty_percent(&self) -> f32 {
        self.state.actual_speed as f32 * self.max_speed_fraction
    }
}
