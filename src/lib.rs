//! MicroRail controller library.
//!
//! Drives a small rail vehicle: a time-based speed ramp on a two-channel
//! motor shield, a text command protocol over a multi-peer control
//! channel, and periodic battery telemetry.  The domain core (`app`,
//! `control`, `sensors`, `scheduler`) is pure logic behind port traits;
//! `adapters` and `drivers` connect it to real or simulated hardware.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod control;
pub mod drivers;
pub mod error;
pub mod scheduler;
pub mod sensors;
