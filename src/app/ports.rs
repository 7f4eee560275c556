//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ RailService (domain)
//! ```
//!
//! Driven adapters (motor shield, ADC, control channel, config file)
//! implement these traits.  The [`RailService`](super::service::RailService)
//! consumes them via generics, so the domain core never touches hardware
//! or sockets directly.
//!
//! Motor and channel ports are fire-and-forget: the core has no error path
//! for them, so adapters log failures and carry on.

use crate::config::RailConfig;
use crate::control::ramp::Direction;

use super::events::PeerId;

// ───────────────────────────────────────────────────────────────
// Motor port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Which H-bridge channel(s) a motor command addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorChannel {
    A,
    B,
    Both,
}

/// Write-side port: the domain calls this to command the drive motors.
pub trait MotorPort {
    /// Set PWM duty in percent (0.0–100.0).
    fn set_duty(&mut self, channel: MotorChannel, percent: f32);

    /// Set the rotation direction.
    fn set_direction(&mut self, channel: MotorChannel, direction: Direction);
}

// ───────────────────────────────────────────────────────────────
// Analog port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port for the battery divider ADC.
pub trait AnalogPort {
    /// One raw conversion (0 ..= full scale).
    fn read_raw(&mut self) -> u16;
}

// ───────────────────────────────────────────────────────────────
// Peer channel port (driven adapter: domain → connected clients)
// ───────────────────────────────────────────────────────────────

/// Outbound half of the control channel.
pub trait PeerChannel {
    /// Send a text message to exactly one peer.
    fn send_to(&mut self, peer: PeerId, text: &str);

    /// Send a text message to every connected peer.
    fn broadcast(&mut self, text: &str);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ← persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads the controller configuration.
///
/// Implementations MUST validate before returning: invalid ranges are
/// rejected with [`ConfigError::ValidationFailed`], not silently clamped.
pub trait ConfigPort {
    fn load(&self) -> Result<RailConfig, ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Scheduler delegate (decouples scheduler from the dispatcher)
// ───────────────────────────────────────────────────────────────

/// Identifies one of the periodic tasks the scheduler drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskId {
    /// Advance the motion ramp by one step.
    RampTick,
    /// Sample the battery and broadcast telemetry.
    TelemetryTick,
}

/// Callback trait that the scheduler invokes when a task is due.
///
/// The [`Scheduler`](crate::scheduler::Scheduler) knows nothing about
/// ramps, batteries or peers; whoever implements this decides what a
/// fire means.
pub trait SchedulerDelegate {
    fn on_task_due(&mut self, task: TaskId);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No config found (first boot, or no file given).
    NotFound,
    /// Stored config could not be parsed.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::error::Error for ConfigError {}
