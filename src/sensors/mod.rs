//! Sensor subsystem.
//!
//! Only the battery divider is sampled; [`median`] holds the smoothing
//! window it runs its readings through.

pub mod battery;
pub mod median;
