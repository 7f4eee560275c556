//! Application core: pure domain logic, zero I/O.
//!
//! Command parsing, status serialization and the event dispatcher live
//! here.  All interaction with motors, the ADC and the control channel
//! happens through the **port traits** defined in [`ports`], keeping this
//! layer fully testable without real peripherals or sockets.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
pub mod status;
