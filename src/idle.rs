//! Idle pictogram sequence
//!
//! Runs between two scroll passes. An episode goes through
//!
//! 1. **Entering**: a short pause so the last banner frame can breathe;
//! 2. **Pre-rendering**: panel suspended, both frames cleared, every
//!    pictogram drawn into alternating frames, panel resumed;
//! 3. **Alternating**: the frames are flipped at a slow fixed cadence a
//!    bounded number of times;
//! 4. **Finished**: control goes back to the scrolling banner.
//!
//! Each call to [`IdleEpisode::step`] performs one of these transitions and
//! reports how long to wait before the next one.

use embassy_time::Duration;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::MatrixDriver;
use crate::bus::Bus;
use crate::composer::DEFAULT_PIXEL_BRIGHTNESS;
use crate::error::Result;
use crate::frame::{DoubleBuffer, FrameSlot};

/// Pause before the pictograms are drawn
pub const DEFAULT_ENTER_PAUSE: Duration = Duration::from_millis(500);

/// Time each pictogram stays on screen
pub const DEFAULT_FLIP_INTERVAL: Duration = Duration::from_secs(1);

/// Flips per pictogram in one episode
pub const DEFAULT_CYCLES_PER_PICTOGRAM: u16 = 4;

/// Static picture given as the coordinates of its lit pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pictogram<'a> {
    points: &'a [(u8, u8)],
}

impl<'a> Pictogram<'a> {
    /// Pictogram lighting every `(x, y)` in `points`
    pub const fn new(points: &'a [(u8, u8)]) -> Self {
        Self { points }
    }

    /// Lit pixel coordinates
    pub const fn points(&self) -> &'a [(u8, u8)] {
        self.points
    }
}

/// Idle episode configuration
#[derive(Debug, Clone, Copy)]
pub struct IdleConfig<'a> {
    /// Pictograms in display order
    pub pictograms: &'a [Pictogram<'a>],
    /// Flips per pictogram
    pub cycles_per_pictogram: u16,
    /// Pause before pre-rendering
    pub enter_pause: Duration,
    /// Delay after each flip
    pub flip_interval: Duration,
    /// Brightness of lit pictogram pixels
    pub brightness: u8,
}

impl Default for IdleConfig<'_> {
    fn default() -> Self {
        Self {
            pictograms: &[],
            cycles_per_pictogram: DEFAULT_CYCLES_PER_PICTOGRAM,
            enter_pause: DEFAULT_ENTER_PAUSE,
            flip_interval: DEFAULT_FLIP_INTERVAL,
            brightness: DEFAULT_PIXEL_BRIGHTNESS,
        }
    }
}

impl IdleConfig<'_> {
    /// Flips performed by one episode
    pub fn total_flips(&self) -> u32 {
        #[allow(clippy::cast_possible_truncation)]
        let count = self.pictograms.len() as u32;
        count.saturating_mul(u32::from(self.cycles_per_pictogram))
    }
}

/// Where an episode stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdlePhase {
    /// Waiting out the entry pause
    Entering,
    /// Pictograms not drawn yet
    PreRendering,
    /// Flipping between the pre-rendered frames
    Alternating {
        /// Flips left in this episode
        remaining: u32,
    },
    /// Episode over
    Finished,
}

/// What the caller should do after an episode step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleStep {
    /// Call again after this delay
    Wait(Duration),
    /// The episode has ended
    Done,
}

/// One idle episode, from entry to exit
#[derive(Debug, Clone)]
pub struct IdleEpisode {
    phase: IdlePhase,
}

impl IdleEpisode {
    /// Start a new episode
    pub const fn new() -> Self {
        Self {
            phase: IdlePhase::Entering,
        }
    }

    /// Current phase
    pub const fn phase(&self) -> IdlePhase {
        self.phase
    }

    /// Whether the episode has ended
    pub const fn is_finished(&self) -> bool {
        matches!(self.phase, IdlePhase::Finished)
    }

    /// Advance the episode by one transition
    pub fn step<M, B>(
        &mut self,
        config: &IdleConfig<'_>,
        frames: &mut DoubleBuffer<M>,
        bus: &mut B,
    ) -> Result<IdleStep>
    where
        M: MatrixDriver,
        B: Bus + ?Sized,
    {
        match self.phase {
            IdlePhase::Entering => {
                #[cfg(feature = "esp32-log")]
                println!("[IdleEpisode.step] entering idle");
                self.phase = IdlePhase::PreRendering;
                Ok(IdleStep::Wait(config.enter_pause))
            }
            IdlePhase::PreRendering => {
                prerender(config, frames, bus)?;
                self.phase = IdlePhase::Alternating {
                    remaining: config.total_flips(),
                };
                Ok(IdleStep::Wait(Duration::from_ticks(0)))
            }
            IdlePhase::Alternating { remaining: 0 } => {
                #[cfg(feature = "esp32-log")]
                println!("[IdleEpisode.step] leaving idle");
                self.phase = IdlePhase::Finished;
                Ok(IdleStep::Done)
            }
            IdlePhase::Alternating { remaining } => {
                frames.flip(bus)?;
                self.phase = IdlePhase::Alternating {
                    remaining: remaining - 1,
                };
                Ok(IdleStep::Wait(config.flip_interval))
            }
            IdlePhase::Finished => Ok(IdleStep::Done),
        }
    }
}

impl Default for IdleEpisode {
    fn default() -> Self {
        Self::new()
    }
}

/// Draw all pictograms while the panel is suspended.
///
/// Pictogram `n` goes into frame `n % 2`; with more than two pictograms
/// the later ones are overlaid on the earlier ones. The second frame is
/// made visible before resuming, so the first flip always reveals the
/// first pictogram no matter which frame the banner left on screen.
fn prerender<M, B>(config: &IdleConfig<'_>, frames: &mut DoubleBuffer<M>, bus: &mut B) -> Result<()>
where
    M: MatrixDriver,
    B: Bus + ?Sized,
{
    let brightness = config.brightness;
    frames.hold(bus, |held| {
        held.clear(FrameSlot::First)?;
        held.clear(FrameSlot::Second)?;

        for (n, pictogram) in config.pictograms.iter().enumerate() {
            let slot = FrameSlot::alternating(n);
            for &(x, y) in pictogram.points() {
                held.set_pixel(slot, x, y, brightness)?;
            }
        }

        held.present(FrameSlot::Second)
    })
}
