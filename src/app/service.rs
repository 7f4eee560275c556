//! Rail service: the event dispatcher at the hexagonal core.
//!
//! [`RailService`] owns the motion ramp, the battery monitor, the status
//! broadcaster and the two periodic timers.  It exposes a
//! hardware-agnostic API; every port is injected at the call site, so the
//! whole service runs against mock adapters in tests.
//!
//! ```text
//!  ChannelEvent ──▶ ┌──────────────────────────┐ ──▶ PeerChannel
//!                   │       RailService        │
//!   AnalogPort ──▶  │ Ramp · Battery · Status  │ ──▶ MotorPort
//!     now_ms   ──▶  │        Scheduler         │
//!                   └──────────────────────────┘
//! ```
//!
//! Broadcast rules:
//!
//! | Trigger                         | Message                   |
//! |---------------------------------|---------------------------|
//! | peer connects                   | unicast to that peer only |
//! | recognized command (even no-op) | broadcast                 |
//! | ramp tick that moved speed      | broadcast                 |
//! | telemetry tick                  | broadcast, always         |

use log::{debug, info, trace};

use crate::config::RailConfig;
use crate::control::ramp::{Direction, MotionRamp, RampOutcome, VehicleState};
use crate::scheduler::Scheduler;
use crate::sensors::battery::{BatteryMonitor, PowerState};

use super::commands::{self, Command};
use super::events::{ChannelEvent, PeerId};
use super::ports::{AnalogPort, MotorChannel, MotorPort, PeerChannel, SchedulerDelegate, TaskId};
use super::status::{StatusBroadcaster, StatusSnapshot};

// ───────────────────────────────────────────────────────────────
// RailService
// ───────────────────────────────────────────────────────────────

pub struct RailService {
    config: RailConfig,
    ramp: MotionRamp,
    battery: BatteryMonitor,
    status: StatusBroadcaster,
    scheduler: Scheduler,
    started: bool,
    commands_applied: u64,
    messages_dropped: u64,
}

impl RailService {
    /// Construct the service from configuration.
    ///
    /// Timers are not armed until [`start`](Self::start).
    pub fn new(config: RailConfig) -> Self {
        Self {
            ramp: MotionRamp::from_config(&config),
            battery: BatteryMonitor::from_config(&config),
            status: StatusBroadcaster::new(config.ssid.clone(), config.version.clone()),
            scheduler: Scheduler::new(),
            config,
            started: false,
            commands_applied: 0,
            messages_dropped: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Put the motors into a known state and arm both timers.
    ///
    /// Call once, after the motor hardware answered.  Calling again
    /// re-arms the timers from `now_ms`.
    pub fn start(&mut self, now_ms: u64, motor: &mut impl MotorPort) {
        motor.set_duty(MotorChannel::Both, 0.0);
        motor.set_direction(MotorChannel::Both, self.ramp.state().direction);

        self.scheduler
            .add(TaskId::RampTick, self.config.ramp_period_ms, now_ms);
        self.scheduler
            .add(TaskId::TelemetryTick, self.config.telemetry_period_ms, now_ms);
        self.started = true;

        info!(
            "RailService started: ssid={} version={} step={} ramp={}ms telemetry={}ms",
            self.config.ssid,
            self.config.version,
            self.ramp.step(),
            self.config.ramp_period_ms,
            self.config.telemetry_period_ms
        );
    }

    // ── Channel events ────────────────────────────────────────

    /// Dispatch one control-channel event.
    pub fn handle(
        &mut self,
        event: ChannelEvent,
        motor: &mut impl MotorPort,
        channel: &mut impl PeerChannel,
    ) {
        match event {
            ChannelEvent::Connected { peer } => {
                info!("Peer {} connected", peer);
                self.send_status_to(peer, channel);
            }
            ChannelEvent::Disconnected { peer } => {
                info!("Peer {} disconnected", peer);
            }
            ChannelEvent::Message { peer, payload } => {
                self.on_message(peer, &payload, motor, channel);
            }
        }
    }

    fn on_message(
        &mut self,
        peer: PeerId,
        payload: &[u8],
        motor: &mut impl MotorPort,
        channel: &mut impl PeerChannel,
    ) {
        debug!("Peer {} sent {:?}", peer, String::from_utf8_lossy(payload));

        if !commands::is_command_frame(payload) {
            self.messages_dropped += 1;
            return;
        }
        let Some(command) = commands::interpret(payload) else {
            debug!("Peer {}: unknown command dropped", peer);
            self.messages_dropped += 1;
            return;
        };

        self.apply(command, motor);
        self.broadcast_status(channel);
    }

    /// Apply a command to the ramp.  Does not broadcast.
    pub fn apply(&mut self, command: Command, motor: &mut impl MotorPort) {
        let step = self.ramp.step() as i32;
        match command {
            Command::Stop => self.ramp.set_target(0),
            Command::SlowDown => self.ramp.adjust_target(-step),
            Command::SpeedUp => self.ramp.adjust_target(step),
            Command::ReverseToBackward => {
                self.ramp.set_direction(Direction::Backward, motor);
            }
            Command::ReverseToForward => {
                self.ramp.set_direction(Direction::Forward, motor);
            }
        }
        self.commands_applied += 1;

        let state = self.ramp.state();
        info!(
            "Command {:?}: target={} actual={} dir={:?}",
            command, state.target_speed, state.actual_speed, state.direction
        );
    }

    // ── Timers ────────────────────────────────────────────────

    /// Run every timer task that is due at `now_ms`.
    ///
    /// The `hw` parameter satisfies **both** [`MotorPort`] and
    /// [`AnalogPort`]; the ramp tick needs one, the telemetry tick the
    /// other.
    pub fn poll_timers(
        &mut self,
        now_ms: u64,
        hw: &mut (impl MotorPort + AnalogPort),
        channel: &mut impl PeerChannel,
    ) {
        let mut due = DueTasks::default();
        self.scheduler.tick(now_ms, &mut due);

        for task in due.tasks {
            match task {
                TaskId::RampTick => self.on_ramp_tick(hw, channel),
                TaskId::TelemetryTick => self.on_telemetry_tick(hw, channel),
            }
        }
    }

    /// Advance the ramp one step; broadcast only if the speed moved.
    pub fn on_ramp_tick(&mut self, motor: &mut impl MotorPort, channel: &mut impl PeerChannel) {
        if self.ramp.tick(motor) == RampOutcome::Changed {
            self.broadcast_status(channel);
        }
    }

    /// Sample the battery and broadcast, changed or not.
    pub fn on_telemetry_tick(
        &mut self,
        adc: &mut impl AnalogPort,
        channel: &mut impl PeerChannel,
    ) {
        self.battery.sample(adc);
        self.broadcast_status(channel);
    }

    /// Stop or resume one of the timers.
    pub fn set_timer_enabled(&mut self, task: TaskId, enabled: bool) -> bool {
        self.scheduler.set_enabled(task, enabled)
    }

    /// Earliest pending timer deadline, for the caller's sleep.
    pub fn next_deadline(&self) -> Option<u64> {
        self.scheduler.next_deadline()
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn snapshot(&self) -> StatusSnapshot<'_> {
        self.status
            .snapshot(&self.ramp.state(), &self.battery.state())
    }

    pub fn vehicle(&self) -> VehicleState {
        self.ramp.state()
    }

    pub fn power(&self) -> PowerState {
        self.battery.state()
    }

    pub fn config(&self) -> &RailConfig {
        &self.config
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn commands_applied(&self) -> u64 {
        self.commands_applied
    }

    pub fn messages_dropped(&self) -> u64 {
        self.messages_dropped
    }

    // ── Internal ──────────────────────────────────────────────

    fn broadcast_status(&self, channel: &mut impl PeerChannel) {
        let snapshot = self.snapshot();
        self.status.broadcast_all(&snapshot, channel);
    }

    fn send_status_to(&self, peer: PeerId, channel: &mut impl PeerChannel) {
        let snapshot = self.snapshot();
        self.status.send_to(peer, &snapshot, channel);
    }
}

/// Collects due tasks so they run after the scheduler borrow ends.
#[derive(Default)]
struct DueTasks {
    tasks: heapless::Vec<TaskId, 4>,
}

impl SchedulerDelegate for DueTasks {
    fn on_task_due(&mut self, task: TaskId) {
        trace!("Timer {:?} due", task);
        // Capacity equals the scheduler's slot count.
        let _ = self.tasks.push(task);
    }
}
