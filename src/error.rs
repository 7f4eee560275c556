//! Unified error types for the MicroRail controller.
//!
//! The control core itself has no failure modes; these types cover the
//! edges of the system (motor shield bus, control channel transport,
//! configuration) so the top-level loop can report them uniformly.
//! All variants are `Copy` so they can be passed around without allocation.

use core::fmt;

use crate::app::ports::ConfigError;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation outside the control core funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The motor shield could not be driven.
    Motor(MotorError),
    /// The control channel transport failed.
    Channel(ChannelError),
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
    /// Peripheral initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Motor(e) => write!(f, "motor: {e}"),
            Self::Channel(e) => write!(f, "channel: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Motor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorError {
    /// The I2C transaction failed.
    Bus(embedded_hal::i2c::ErrorKind),
    /// Something answered at the shield address, but not a motor shield.
    WrongProduct(u8),
    /// The shield never answered during start-up.
    NotReady,
}

impl fmt::Display for MotorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus(kind) => write!(f, "I2C bus error: {kind}"),
            Self::WrongProduct(id) => write!(f, "unexpected product id 0x{id:02x}"),
            Self::NotReady => write!(f, "motor shield not ready"),
        }
    }
}

impl core::error::Error for MotorError {}

impl From<MotorError> for Error {
    fn from(e: MotorError) -> Self {
        Self::Motor(e)
    }
}

// ---------------------------------------------------------------------------
// Channel errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelError {
    /// The listening socket could not be bound.
    Bind(std::io::ErrorKind),
    /// Socket I/O failed on an established peer or the listener.
    Io(std::io::ErrorKind),
}

impl fmt::Display for ChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bind(kind) => write!(f, "bind failed: {kind}"),
            Self::Io(kind) => write!(f, "socket I/O error: {kind}"),
        }
    }
}

impl core::error::Error for ChannelError {}

impl From<ChannelError> for Error {
    fn from(e: ChannelError) -> Self {
        Self::Channel(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}
