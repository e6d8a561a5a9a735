//! Cooperative scheduler for the ring and matrix tasks.
//!
//! Both tasks run on one execution context and take turns on the shared
//! bus. A task step is never interrupted, so bus transactions of the two
//! devices cannot interleave and no lock is needed.
//!
//! [`Scheduler::tick`] is portable: it runs whatever is due and tells the
//! caller how long to sleep. [`Scheduler::run`] wraps it in an
//! `embassy-time` loop.

use core::convert::Infallible;

use embassy_time::{Duration, Instant, Timer};

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::bus::Bus;
use crate::error::{BusError, Result};
use crate::task::AnimationTask;

/// Result of a scheduler tick.
#[derive(Debug, Clone, Copy)]
pub struct SchedulerTick {
    /// The earliest deadline of any task.
    pub next_deadline: Instant,
    /// How long to wait until then (zero if a task is already due).
    pub sleep_duration: Duration,
}

/// A task with its next deadline
struct Scheduled<T> {
    task: T,
    next: Instant,
}

impl<T: AnimationTask> Scheduled<T> {
    const fn new(task: T) -> Self {
        Self {
            task,
            next: Instant::from_ticks(0),
        }
    }

    fn is_due(&self, now: Instant) -> bool {
        now >= self.next
    }

    fn run<B: Bus + ?Sized>(&mut self, bus: &mut B, now: Instant) -> Result<()> {
        let delay = self.task.poll(bus)?;
        self.next = next_deadline(self.next, now, delay);
        Ok(())
    }
}

/// Deadline following `previous` for a task that asked to wait `delay`.
///
/// Periodic tasks keep a fixed cadence measured from their previous
/// deadline. A task that has fallen more than two periods behind is
/// re-anchored to `now` instead of bursting to catch up; a smaller lag
/// leaves the deadline in the past so the task runs again right away. A
/// zero delay is a plain yield.
fn next_deadline(previous: Instant, now: Instant, delay: Duration) -> Instant {
    if delay.as_ticks() == 0 {
        return now;
    }
    let max_drift = Duration::from_ticks(delay.as_ticks().saturating_mul(2));
    let base = if now > previous + max_drift { now } else { previous };
    base + delay
}

/// Runs the ring animator and the matrix marquee side by side.
///
/// When both tasks are due in the same tick the ring goes first.
///
/// # Usage
///
/// ```ignore
/// let mut scheduler = Scheduler::new(bus, ring, marquee);
///
/// loop {
///     let tick = scheduler.tick(Instant::now())?;
///     sleep(tick.sleep_duration);
/// }
/// ```
pub struct Scheduler<B, R, D> {
    bus: B,
    ring: Scheduled<R>,
    display: Scheduled<D>,
}

impl<B, R, D> Scheduler<B, R, D>
where
    B: Bus,
    R: AnimationTask,
    D: AnimationTask,
{
    /// Create a scheduler owning the bus and both tasks.
    ///
    /// Both tasks are due on the first tick.
    pub const fn new(bus: B, ring: R, display: D) -> Self {
        Self {
            bus,
            ring: Scheduled::new(ring),
            display: Scheduled::new(display),
        }
    }

    /// Run every task that is due at `now`.
    ///
    /// A bus failure stops the tick and is returned as is; the scheduler
    /// must not be ticked again after that.
    pub fn tick(&mut self, now: Instant) -> Result<SchedulerTick> {
        if self.ring.is_due(now) {
            self.ring.run(&mut self.bus, now)?;
        }
        if self.display.is_due(now) {
            self.display.run(&mut self.bus, now)?;
        }

        let next_deadline = self.ring.next.min(self.display.next);
        let sleep_duration = next_deadline
            .checked_duration_since(now)
            .unwrap_or(Duration::from_ticks(0));

        Ok(SchedulerTick {
            next_deadline,
            sleep_duration,
        })
    }

    /// Drive both tasks forever.
    ///
    /// Only returns when the bus fails.
    pub async fn run(mut self) -> Result<Infallible> {
        loop {
            let tick = self.tick(Instant::now()).inspect_err(log_failure)?;
            Timer::at(tick.next_deadline).await;
        }
    }

    /// Deadline of the ring task
    pub const fn ring_deadline(&self) -> Instant {
        self.ring.next
    }

    /// Deadline of the matrix task
    pub const fn display_deadline(&self) -> Instant {
        self.display.next
    }

    /// Get a reference to the ring task.
    pub const fn ring(&self) -> &R {
        &self.ring.task
    }

    /// Get a reference to the matrix task.
    pub const fn display(&self) -> &D {
        &self.display.task
    }

    /// Get a reference to the bus.
    pub const fn bus(&self) -> &B {
        &self.bus
    }

    /// Get a mutable reference to the bus.
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Split back into bus, ring task and matrix task
    pub fn into_parts(self) -> (B, R, D) {
        (self.bus, self.ring.task, self.display.task)
    }
}

#[cfg_attr(not(feature = "esp32-log"), allow(unused_variables))]
fn log_failure(error: &BusError) {
    #[cfg(feature = "esp32-log")]
    println!("[Scheduler.run] stopping on bus failure: {}", error);
}
