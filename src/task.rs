//! Cooperative animation tasks

use embassy_time::Duration;

use crate::bus::Bus;
use crate::error::Result;

/// A cooperatively scheduled animation.
///
/// Each call to [`poll`](AnimationTask::poll) is one suspension-free step:
/// every bus transaction it starts is finished before it returns. The
/// return value is how long the task wants to be left alone; zero means
/// "yield once and call me again".
pub trait AnimationTask {
    /// Run one step on `bus`
    fn poll<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Result<Duration>;
}
