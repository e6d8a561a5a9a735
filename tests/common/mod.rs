#![allow(dead_code)]

use myrtio_marquee::raster::{PixelBuffer, TextRasterizer};
use myrtio_marquee::{Bus, BusError, FrameSlot, MatrixDriver, PowerState, Result, Rgb, RingDriver};

pub const WIDTH: usize = 16;
pub const HEIGHT: usize = 9;

pub const RING_ADDRESS: u8 = 0x36;
pub const MATRIX_ADDRESS: u8 = 0x74;

/// Bus that records every write and can be told to start failing
#[derive(Debug, Default)]
pub struct RecordingBus {
    pub writes: Vec<(u8, Vec<u8>)>,
    pub fail_after: Option<usize>,
}

impl RecordingBus {
    pub fn failing_after(writes: usize) -> Self {
        Self {
            writes: Vec::new(),
            fail_after: Some(writes),
        }
    }

    pub fn addresses(&self) -> Vec<u8> {
        self.writes.iter().map(|(address, _)| *address).collect()
    }
}

impl Bus for RecordingBus {
    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<()> {
        if self.fail_after.is_some_and(|limit| self.writes.len() >= limit) {
            return Err(BusError::NoAcknowledge);
        }
        self.writes.push((address, bytes.to_vec()));
        Ok(())
    }
}

/// Operation seen by [`MockMatrix`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixOp {
    Select(FrameSlot),
    Clear(FrameSlot),
    Pixel(FrameSlot, u8, u8, u8),
    Show(FrameSlot),
    Power(PowerState),
}

/// Bus tags written by [`MockMatrix`] so transactions show up on the bus log
pub const TAG_SELECT: u8 = b'F';
pub const TAG_CLEAR: u8 = b'C';
pub const TAG_PIXEL: u8 = b'P';
pub const TAG_SHOW: u8 = b'S';
pub const TAG_POWER: u8 = b'W';

/// Matrix panel model that tracks what a viewer would see
#[derive(Debug)]
pub struct MockMatrix {
    pub ops: Vec<MatrixOp>,
    pub visible: FrameSlot,
    pub powered: bool,
    /// Writes that landed on the frame being shown while the panel was lit
    pub torn_writes: usize,
}

impl Default for MockMatrix {
    fn default() -> Self {
        Self {
            ops: Vec::new(),
            visible: FrameSlot::First,
            powered: true,
            torn_writes: 0,
        }
    }
}

impl MockMatrix {
    fn observe_write(&mut self, slot: FrameSlot) {
        if self.powered && slot == self.visible {
            self.torn_writes += 1;
        }
    }

    /// Frames switched while the panel was lit
    pub fn visible_flips(&self) -> usize {
        let mut powered = true;
        let mut flips = 0;
        for op in &self.ops {
            match op {
                MatrixOp::Power(state) => powered = *state == PowerState::On,
                MatrixOp::Show(_) if powered => flips += 1,
                _ => {}
            }
        }
        flips
    }

    /// Operations issued while the panel was suspended, one group per hold
    pub fn held_groups(&self) -> Vec<Vec<MatrixOp>> {
        let mut groups = Vec::new();
        let mut current: Option<Vec<MatrixOp>> = None;
        for op in &self.ops {
            match op {
                MatrixOp::Power(PowerState::Off) => current = Some(Vec::new()),
                MatrixOp::Power(PowerState::On) => {
                    if let Some(group) = current.take() {
                        groups.push(group);
                    }
                }
                other => {
                    if let Some(group) = current.as_mut() {
                        group.push(*other);
                    }
                }
            }
        }
        groups
    }
}

impl MatrixDriver for MockMatrix {
    fn select_frame<B: Bus + ?Sized>(&mut self, bus: &mut B, slot: FrameSlot) -> Result<()> {
        bus.write(MATRIX_ADDRESS, &[TAG_SELECT, slot.index()])?;
        self.ops.push(MatrixOp::Select(slot));
        Ok(())
    }

    fn clear<B: Bus + ?Sized>(&mut self, bus: &mut B, slot: FrameSlot) -> Result<()> {
        bus.write(MATRIX_ADDRESS, &[TAG_CLEAR, slot.index()])?;
        self.observe_write(slot);
        self.ops.push(MatrixOp::Clear(slot));
        Ok(())
    }

    fn set_pixel<B: Bus + ?Sized>(
        &mut self,
        bus: &mut B,
        slot: FrameSlot,
        x: u8,
        y: u8,
        brightness: u8,
    ) -> Result<()> {
        bus.write(MATRIX_ADDRESS, &[TAG_PIXEL, slot.index(), x, y, brightness])?;
        self.observe_write(slot);
        self.ops.push(MatrixOp::Pixel(slot, x, y, brightness));
        Ok(())
    }

    fn show<B: Bus + ?Sized>(&mut self, bus: &mut B, slot: FrameSlot) -> Result<()> {
        bus.write(MATRIX_ADDRESS, &[TAG_SHOW, slot.index()])?;
        self.visible = slot;
        self.ops.push(MatrixOp::Show(slot));
        Ok(())
    }

    fn set_power_state<B: Bus + ?Sized>(&mut self, bus: &mut B, state: PowerState) -> Result<()> {
        bus.write(MATRIX_ADDRESS, &[TAG_POWER, u8::from(state == PowerState::On)])?;
        self.powered = state == PowerState::On;
        self.ops.push(MatrixOp::Power(state));
        Ok(())
    }
}

/// Ring model keeping every committed frame
#[derive(Debug)]
pub struct MockRing {
    pub buffer: Vec<Rgb>,
    pub commits: Vec<Vec<Rgb>>,
}

impl MockRing {
    pub fn new(len: usize) -> Self {
        Self {
            buffer: vec![Rgb::default(); len],
            commits: Vec::new(),
        }
    }
}

impl RingDriver for MockRing {
    fn set(&mut self, index: usize, color: Rgb) {
        if let Some(slot) = self.buffer.get_mut(index) {
            *slot = color;
        }
    }

    fn commit<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Result<()> {
        let bytes: Vec<u8> = self.buffer.iter().flat_map(|c| [c.r, c.g, c.b]).collect();
        bus.write(RING_ADDRESS, &bytes)?;
        self.commits.push(self.buffer.clone());
        Ok(())
    }
}

/// Rasterizer lighting a single pixel at the banner's left edge
#[derive(Debug, Default)]
pub struct StubRasterizer {
    pub offsets: Vec<i32>,
}

impl TextRasterizer<WIDTH, HEIGHT> for StubRasterizer {
    fn rasterize(&mut self, _text: &str, x_offset: i32) -> PixelBuffer<WIDTH, HEIGHT> {
        self.offsets.push(x_offset);
        let mut buffer = PixelBuffer::new();
        if let Ok(x) = usize::try_from(x_offset) {
            buffer.set(x, 0, true);
        }
        buffer
    }
}

/// Rasterizer returning the same bitmap every step
#[derive(Debug, Clone, Copy)]
pub struct FixedRasterizer(pub PixelBuffer<WIDTH, HEIGHT>);

impl TextRasterizer<WIDTH, HEIGHT> for FixedRasterizer {
    fn rasterize(&mut self, _text: &str, _x_offset: i32) -> PixelBuffer<WIDTH, HEIGHT> {
        self.0
    }
}
