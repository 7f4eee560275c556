//! Periodic timer engine.
//!
//! Replaces free-running hardware timers with deadlines checked from the
//! caller's polling loop.  The scheduler notifies a [`SchedulerDelegate`]
//! when a task is due; it knows nothing about ramps or batteries.
//!
//! ```text
//!   poll loop ──now_ms──▶ Scheduler::tick ──▶ SchedulerDelegate
//!                          │  RampTick      (every ramp_period_ms)
//!                          │  TelemetryTick (every telemetry_period_ms)
//!                          ▼
//!                    next_deadline() ──▶ loop sleeps until then
//! ```
//!
//! A task that is late fires **once** and is re-armed one period after
//! the tick that served it.  Missed periods are not replayed.

use crate::app::ports::{SchedulerDelegate, TaskId};
use log::{info, trace};

// ═══════════════════════════════════════════════════════════════
//  Task types
// ═══════════════════════════════════════════════════════════════

/// A single periodic task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodicTask {
    pub id: TaskId,
    pub period_ms: u32,
    /// Absolute time (ms) of the next fire.
    pub next_due_ms: u64,
    pub enabled: bool,
}

impl PeriodicTask {
    fn is_due(&self, now_ms: u64) -> bool {
        self.enabled && now_ms >= self.next_due_ms
    }
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler engine
// ═══════════════════════════════════════════════════════════════

/// Maximum number of concurrent tasks (stack-allocated).
const MAX_TASKS: usize = 4;

pub struct Scheduler {
    tasks: [Option<PeriodicTask>; MAX_TASKS],
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            tasks: [None; MAX_TASKS],
        }
    }

    /// Arm `id` to fire every `period_ms`, first at `now_ms + period_ms`.
    ///
    /// Re-adding an existing id replaces its period and deadline.  Returns
    /// `false` if every slot is taken.
    pub fn add(&mut self, id: TaskId, period_ms: u32, now_ms: u64) -> bool {
        let task = PeriodicTask {
            id,
            period_ms: period_ms.max(1),
            next_due_ms: now_ms + period_ms.max(1) as u64,
            enabled: true,
        };

        let slot = match self.position(id) {
            Some(i) => Some(i),
            None => self.tasks.iter().position(Option::is_none),
        };
        match slot {
            Some(i) => {
                info!("Scheduler: {:?} every {} ms (slot {})", id, task.period_ms, i);
                self.tasks[i] = Some(task);
                true
            }
            None => false,
        }
    }

    /// Stop or resume a task without forgetting its period.
    ///
    /// Returns `false` if `id` was never added.
    pub fn set_enabled(&mut self, id: TaskId, enabled: bool) -> bool {
        match self.find_mut(id) {
            Some(task) => {
                task.enabled = enabled;
                info!(
                    "Scheduler: {:?} {}",
                    id,
                    if enabled { "enabled" } else { "disabled" }
                );
                true
            }
            None => false,
        }
    }

    /// Fire every task whose deadline has passed.
    ///
    /// Tasks fire in the order they were added.
    pub fn tick(&mut self, now_ms: u64, delegate: &mut dyn SchedulerDelegate) {
        for task in self.tasks.iter_mut().flatten() {
            if !task.is_due(now_ms) {
                continue;
            }
            let late_ms = now_ms - task.next_due_ms;
            trace!("Scheduler: {:?} due (late {} ms)", task.id, late_ms);
            task.next_due_ms = now_ms + task.period_ms as u64;
            delegate.on_task_due(task.id);
        }
    }

    /// Earliest deadline among enabled tasks, or `None` if nothing is armed.
    pub fn next_deadline(&self) -> Option<u64> {
        self.tasks
            .iter()
            .flatten()
            .filter(|t| t.enabled)
            .map(|t| t.next_due_ms)
            .min()
    }

    /// Number of enabled tasks.
    pub fn active_count(&self) -> usize {
        self.tasks.iter().flatten().filter(|t| t.enabled).count()
    }

    fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks
            .iter()
            .position(|slot| slot.is_some_and(|t| t.id == id))
    }

    fn find_mut(&mut self, id: TaskId) -> Option<&mut PeriodicTask> {
        self.tasks.iter_mut().flatten().find(|t| t.id == id)
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
