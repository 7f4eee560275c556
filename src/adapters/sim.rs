//! In-memory hardware for the host binary and tests.
//!
//! Records the last duty and direction per motor channel and returns a
//! settable raw ADC value.

use crate::app::ports::{AnalogPort, MotorChannel, MotorPort};
use crate::control::ramp::Direction;

pub struct SimHardware {
    duty: [f32; 2],
    direction: [Direction; 2],
    raw: u16,
    motor_writes: u32,
}

impl SimHardware {
    /// Motors idle, ADC reading `battery_raw`.
    pub fn new(battery_raw: u16) -> Self {
        Self {
            duty: [0.0; 2],
            direction: [Direction::Forward; 2],
            raw: battery_raw,
            motor_writes: 0,
        }
    }

    pub fn set_battery_raw(&mut self, raw: u16) {
        self.raw = raw;
    }

    /// Duty of channel A or B.  `Both` reads channel A.
    pub fn duty(&self, channel: MotorChannel) -> f32 {
        self.duty[Self::index(channel)]
    }

    pub fn direction(&self, channel: MotorChannel) -> Direction {
        self.direction[Self::index(channel)]
    }

    /// Number of duty and direction writes so far.
    pub fn motor_writes(&self) -> u32 {
        self.motor_writes
    }

    fn index(channel: MotorChannel) -> usize {
        match channel {
            MotorChannel::A | MotorChannel::Both => 0,
            MotorChannel::B => 1,
        }
    }

    fn targets(channel: MotorChannel) -> &'static [usize] {
        match channel {
            MotorChannel::A => &[0],
            MotorChannel::B => &[1],
            MotorChannel::Both => &[0, 1],
        }
    }
}

impl Default for SimHardware {
    fn default() -> Self {
        Self::new(1023)
    }
}

impl MotorPort for SimHardware {
    fn set_duty(&mut self, channel: MotorChannel, percent: f32) {
        for &i in Self::targets(channel) {
            self.duty[i] = percent;
        }
        self.motor_writes += 1;
    }

    fn set_direction(&mut self, channel: MotorChannel, direction: Direction) {
        for &i in Self::targets(channel) {
            self.direction[i] = direction;
        }
        self.motor_writes += 1;
    }
}

impl AnalogPort for SimHardware {
    fn read_raw(&mut self) -> u16 {
        self.raw
    }
}
