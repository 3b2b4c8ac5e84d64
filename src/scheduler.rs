// src/scheduler.rs

//! # Tick Scheduler
//!
//! Derives several fixed-rate tasks from one periodic hardware tick. Each
//! task has a decimation counter and a one-bit ready latch. The tick handler
//! raises latches; the main loop clears a latch after servicing its task.
//! A task that falls behind loses triggers rather than queueing them, so at
//! most one unit of work is ever pending per task.

use core::sync::atomic::{AtomicBool, AtomicU16, Ordering};

/// Number of tasks in the rig's task table.
pub const TASK_COUNT: usize = 4;

/// Tasks in the rig's task table, highest rate first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Task {
    /// Sensor read, both controllers, duty output.
    Control,
    /// Input polling, setpoint steps, flight supervisor.
    Supervisory,
    /// Display refresh.
    Display,
    /// Telemetry output.
    Telemetry,
}

impl Task {
    /// All tasks in table order.
    pub const ALL: [Task; TASK_COUNT] = [
        Task::Control,
        Task::Supervisory,
        Task::Display,
        Task::Telemetry,
    ];

    /// Slot of this task in the table.
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Fixed table of decimated tasks.
pub struct TickScheduler<const N: usize> {
    periods: [u16; N],
    counters: [AtomicU16; N],
    ready: [AtomicBool; N],
}

impl<const N: usize> TickScheduler<N> {
    /// Creates a scheduler with one task per period, in ticks.
    ///
    /// A period of zero behaves like a period of one.
    pub const fn new(periods: [u16; N]) -> Self {
        #[allow(clippy::declare_interior_mutable_const)]
        const IDLE: AtomicU16 = AtomicU16::new(0);
        #[allow(clippy::declare_interior_mutable_const)]
        const CLEAR: AtomicBool = AtomicBool::new(false);
        Self {
            periods,
            counters: [IDLE; N],
            ready: [CLEAR; N],
        }
    }

    /// Advances every counter by one hardware tick.
    ///
    /// Called from the tick interrupt only.
    pub fn tick(&self) {
        for ((period, counter), ready) in self
            .periods
            .iter()
            .zip(self.counters.iter())
            .zip(self.ready.iter())
        {
            let count = counter.load(Ordering::Relaxed).saturating_add(1);
            if count >= *period {
                counter.store(0, Ordering::Relaxed);
                ready.store(true, Ordering::Release);
            } else {
                counter.store(count, Ordering::Relaxed);
            }
        }
    }

    /// Whether the task in `slot` has a pending period.
    pub fn is_ready(&self, slot: usize) -> bool {
        self.ready
            .get(slot)
            .map_or(false, |ready| ready.load(Ordering::Acquire))
    }

    /// Clears the latch for `slot` after its task has been serviced.
    pub fn clear(&self, slot: usize) {
        if let Some(ready) = self.ready.get(slot) {
            ready.store(false, Ordering::Release);
        }
    }

    /// Period of the task in `slot`, in ticks.
    pub fn period(&self, slot: usize) -> Option<u16> {
        self.periods.get(slot).copied()
    }
}
