//! Peripheral drivers.

pub mod motor_shield;
