//! Desktop preview app for the myrtio marquee
//!
//! Runs the real scheduler, drivers and rasterizer against a simulated
//! bus that decodes the ring and matrix register writes, and paints what
//! the hardware would show.

use std::time::Instant as StdInstant;

use eframe::egui::{self};
use embedded_graphics::mono_font::ascii::FONT_5X8;
use myrtio_marquee::drivers::{
    IS31FL3731_ADDRESS, Is31fl3731, MATRIX_HEIGHT, MATRIX_WIDTH, PIXEL_RING_ADDRESS, PixelRing,
};
use myrtio_marquee::idle::{IdleConfig, IdlePhase, Pictogram};
use myrtio_marquee::{
    Bus, BusError, DisplayMode, Duration, Instant, MarqueeConfig, MarqueeTask,
    MonoTextRasterizer, Result, RingAnimator, RingConfig, Scheduler, Traversal,
};

/// Number of LEDs on the simulated ring
const RING_LEDS: usize = 22;

/// Size of each matrix pixel in points
const PIXEL_SIZE: f32 = 18.0;

/// Gap between matrix pixels
const PIXEL_GAP: f32 = 3.0;

/// Radius of each ring LED in points
const RING_LED_RADIUS: f32 = 9.0;

/// Upper bound on scheduler ticks per UI frame
const MAX_TICKS_PER_FRAME: usize = 10_000;

const DEFAULT_TEXT: &str = "Now Playing";

const HEART: &[(u8, u8)] = &[
    (5, 2), (6, 1), (7, 2), (8, 2), (9, 1), (10, 2),
    (5, 3), (10, 3), (6, 4), (9, 4), (7, 5), (8, 5),
];
const NOTE: &[(u8, u8)] = &[
    (9, 1), (10, 1), (11, 2), (9, 2), (9, 3), (9, 4), (9, 5),
    (7, 5), (8, 5), (7, 6), (8, 6),
];
const PICTOGRAMS: &[Pictogram<'static>] = &[Pictogram::new(HEART), Pictogram::new(NOTE)];

const FUNCTION_BANK: u8 = 0x0B;
const BANK_REGISTER: u8 = 0xFD;
const FRAME_REGISTER: u8 = 0x01;
const SHUTDOWN_REGISTER: u8 = 0x0A;
const PWM_OFFSET: usize = 0x24;
const PWM_BYTES: usize = MATRIX_WIDTH * MATRIX_HEIGHT;

/// Bus that decodes writes into the state of the simulated devices
#[derive(Debug)]
struct SimulatedBus {
    ring: [[u8; 3]; RING_LEDS],
    ring_brightness: u8,
    bank: u8,
    pwm: [[u8; PWM_BYTES]; 2],
    frame: usize,
    powered: bool,
    writes: u64,
}

impl SimulatedBus {
    fn new() -> Self {
        Self {
            ring: [[0; 3]; RING_LEDS],
            ring_brightness: 0x1F,
            bank: 0,
            pwm: [[0; PWM_BYTES]; 2],
            frame: 0,
            powered: false,
            writes: 0,
        }
    }

    fn write_ring(&mut self, bytes: &[u8]) {
        for (led, chunk) in self.ring.iter_mut().zip(bytes.chunks_exact(4)) {
            *led = [chunk[0], chunk[1], chunk[2]];
            self.ring_brightness = chunk[3] & 0x1F;
        }
    }

    fn write_matrix(&mut self, bytes: &[u8]) -> Result<()> {
        let [register, values @ ..] = bytes else {
            return Err(BusError::Other);
        };
        if *register == BANK_REGISTER {
            self.bank = values.first().copied().ok_or(BusError::Other)?;
            return Ok(());
        }
        if self.bank == FUNCTION_BANK {
            let value = values.first().copied().unwrap_or(0);
            match *register {
                FRAME_REGISTER => self.frame = usize::from(value & 0x07),
                SHUTDOWN_REGISTER => self.powered = value & 0x01 != 0,
                _ => {}
            }
            return Ok(());
        }
        let Some(pwm) = self.pwm.get_mut(usize::from(self.bank)) else {
            return Ok(());
        };
        for (offset, value) in values.iter().enumerate() {
            let register = usize::from(*register) + offset;
            if let Some(slot) = register.checked_sub(PWM_OFFSET).and_then(|i| pwm.get_mut(i)) {
                *slot = *value;
            }
        }
        Ok(())
    }

    /// Brightness of matrix pixel `(x, y)` as a viewer would see it
    fn visible_pixel(&self, x: usize, y: usize) -> u8 {
        if !self.powered {
            return 0;
        }
        self.pwm
            .get(self.frame)
            .and_then(|frame| frame.get(x + y * MATRIX_WIDTH))
            .copied()
            .unwrap_or(0)
    }

    /// Ring LED colour with global brightness applied
    fn ring_color(&self, index: usize) -> egui::Color32 {
        let [r, g, b] = self.ring[index];
        let scale = |c: u8| {
            #[allow(clippy::cast_possible_truncation)]
            let scaled = (u16::from(c) * u16::from(self.ring_brightness) / 0x1F) as u8;
            scaled
        };
        egui::Color32::from_rgb(scale(r), scale(g), scale(b))
    }
}

impl Bus for SimulatedBus {
    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<()> {
        self.writes += 1;
        match address {
            PIXEL_RING_ADDRESS => {
                self.write_ring(bytes);
                Ok(())
            }
            IS31FL3731_ADDRESS => self.write_matrix(bytes),
            _ => Err(BusError::NoAcknowledge),
        }
    }
}

type Marquee = MarqueeTask<'static, Is31fl3731, MonoTextRasterizer<'static>, MATRIX_WIDTH, MATRIX_HEIGHT>;
type PreviewScheduler = Scheduler<SimulatedBus, RingAnimator<PixelRing<RING_LEDS>, RING_LEDS>, Marquee>;

/// Settings the scheduler is rebuilt from
#[derive(Debug, Clone, Copy, PartialEq)]
struct Settings {
    text: &'static str,
    step_delay_ms: u64,
    ring_period_ms: u64,
    mirrored: bool,
    cycles: u16,
}

fn build_scheduler(settings: Settings) -> (PreviewScheduler, Option<BusError>) {
    let mut bus = SimulatedBus::new();
    let mut matrix = Is31fl3731::new();
    let failure = matrix.init(&mut bus).err();

    let ring = RingAnimator::new(
        PixelRing::new(),
        &RingConfig {
            period: Duration::from_millis(settings.ring_period_ms),
            ..RingConfig::default()
        },
    );

    let mut config = MarqueeConfig::new(settings.text);
    config.step_delay = Duration::from_millis(settings.step_delay_ms);
    config.traversal = if settings.mirrored {
        Traversal::Mirrored
    } else {
        Traversal::Forward
    };
    config.idle = IdleConfig {
        pictograms: PICTOGRAMS,
        cycles_per_pictogram: settings.cycles,
        ..IdleConfig::default()
    };
    let marquee = MarqueeTask::new(matrix, MonoTextRasterizer::new(&FONT_5X8), &config);

    (Scheduler::new(bus, ring, marquee), failure)
}

fn main() -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([720.0, 560.0])
            .with_title("Marquee Preview"),
        ..Default::default()
    };

    eframe::run_native(
        "myrtio-marquee-preview",
        options,
        Box::new(|_cc| Ok(Box::new(PreviewApp::new()))),
    )
}

struct PreviewApp {
    /// Scheduler driving the simulated devices
    scheduler: PreviewScheduler,
    /// Settings the scheduler was built from
    settings: Settings,
    /// Text being edited
    text_input: String,
    /// Bus failure that stopped the scheduler
    failure: Option<BusError>,
    /// Synthetic time in milliseconds
    t_ms: u64,
    /// Earliest scheduler deadline, in synthetic time
    next_deadline: Instant,
    /// Wall-clock reference for delta time
    last_frame: StdInstant,
    /// Whether animation is playing
    playing: bool,
    /// Time scale multiplier (1.0 = realtime)
    time_scale: f32,
}

impl PreviewApp {
    fn new() -> Self {
        let settings = Settings {
            text: DEFAULT_TEXT,
            step_delay_ms: 60,
            ring_period_ms: 10,
            mirrored: false,
            cycles: 4,
        };
        let (scheduler, failure) = build_scheduler(settings);
        Self {
            scheduler,
            settings,
            text_input: DEFAULT_TEXT.to_owned(),
            failure,
            t_ms: 0,
            next_deadline: Instant::from_millis(0),
            last_frame: StdInstant::now(),
            playing: true,
            time_scale: 1.0,
        }
    }

    /// Rebuild the scheduler and restart time
    fn restart(&mut self) {
        let (scheduler, failure) = build_scheduler(self.settings);
        self.scheduler = scheduler;
        self.failure = failure;
        self.reset_time();
    }

    /// Reset time to zero
    fn reset_time(&mut self) {
        self.t_ms = 0;
        self.next_deadline = Instant::from_millis(0);
        self.last_frame = StdInstant::now();
    }

    /// Toggle playing state
    fn toggle_playing(&mut self) {
        self.playing = !self.playing;
    }

    /// Update synthetic time based on wall clock and time scale
    fn update_time(&mut self) {
        let now = StdInstant::now();
        let delta = now.duration_since(self.last_frame);
        self.last_frame = now;

        if self.playing {
            let delta_ms_f64 = delta.as_secs_f64() * 1000.0 * f64::from(self.time_scale);
            let delta_ms_f64 = if delta_ms_f64.is_finite() {
                #[allow(clippy::cast_precision_loss)]
                delta_ms_f64.clamp(0.0, u64::MAX as f64)
            } else {
                0.0
            };
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let delta_ms = delta_ms_f64 as u64;
            self.t_ms = self.t_ms.wrapping_add(delta_ms);
        }
    }

    /// Run every scheduler tick due up to the current synthetic time
    fn catch_up(&mut self) {
        if self.failure.is_some() {
            return;
        }
        let now = Instant::from_millis(self.t_ms);
        for _ in 0..MAX_TICKS_PER_FRAME {
            if self.next_deadline > now {
                break;
            }
            match self.scheduler.tick(self.next_deadline) {
                Ok(tick) => self.next_deadline = tick.next_deadline.max(self.next_deadline),
                Err(error) => {
                    self.failure = Some(error);
                    break;
                }
            }
        }
    }

    fn status(&self) -> String {
        let marquee = self.scheduler.display();
        let mode = match marquee.mode() {
            DisplayMode::Scrolling => format!(
                "scrolling {}/{}",
                marquee.cursor().position(),
                marquee.cursor().pass_len()
            ),
            DisplayMode::Idle(episode) => match episode.phase() {
                IdlePhase::Entering => "idle: entering".to_owned(),
                IdlePhase::PreRendering => "idle: pre-rendering".to_owned(),
                IdlePhase::Alternating { remaining } => format!("idle: {remaining} flips left"),
                IdlePhase::Finished => "idle: finished".to_owned(),
            },
        };
        format!(
            "{mode} | passes {} | ring phase {} | bus writes {}",
            marquee.passes(),
            self.scheduler.ring().state().phase(),
            self.scheduler.bus().writes
        )
    }
}

impl eframe::App for PreviewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_time();
        self.catch_up();

        ctx.request_repaint();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                // <PlaybackControls>
                ui.vertical(|ui| {
                    ui.horizontal(|ui| {
                        if ui.button("⏮ Reset").clicked() {
                            self.restart();
                        }
                        if ui
                            .button(if self.playing { "⏸ Pause" } else { "▶ Play" })
                            .clicked()
                        {
                            self.toggle_playing();
                        }
                    });

                    ui.add_space(4.0);

                    let secs = self.t_ms / 1000;
                    let ms = self.t_ms % 1000;
                    ui.label(format!("Time: {secs}.{ms:03}s"));

                    ui.add_space(4.0);

                    ui.horizontal(|ui| {
                        ui.label("Speed:");
                        ui.add(egui::Slider::new(&mut self.time_scale, 0.1..=5.0).logarithmic(true));
                    });
                });
                // </PlaybackControls>
                ui.add_space(16.0);
                // <MarqueeControls>
                ui.vertical(|ui| {
                    let mut settings = self.settings;

                    ui.horizontal(|ui| {
                        ui.label("Text:");
                        ui.text_edit_singleline(&mut self.text_input);
                        if ui.button("Apply").clicked() && self.text_input != settings.text {
                            settings.text = Box::leak(self.text_input.clone().into_boxed_str());
                        }
                    });
                    ui.horizontal(|ui| {
                        ui.label("Step delay (ms):");
                        ui.add(egui::Slider::new(&mut settings.step_delay_ms, 1..=500));
                    });
                    ui.horizontal(|ui| {
                        ui.label("Ring period (ms):");
                        ui.add(egui::Slider::new(&mut settings.ring_period_ms, 1..=100));
                    });
                    ui.horizontal(|ui| {
                        ui.label("Cycles per pictogram:");
                        ui.add(egui::Slider::new(&mut settings.cycles, 0..=8));
                        ui.checkbox(&mut settings.mirrored, "Mirrored");
                    });

                    if settings != self.settings {
                        self.settings = settings;
                        self.restart();
                    }
                });
                // </MarqueeControls>
            });

            ui.add_space(8.0);
            ui.label(self.status());
            if let Some(error) = self.failure {
                ui.colored_label(egui::Color32::RED, format!("Stopped: {error}"));
            }
            ui.add_space(16.0);

            // === Devices ===
            let bus = self.scheduler.bus();
            let pitch = PIXEL_SIZE + PIXEL_GAP;
            #[allow(clippy::cast_precision_loss)]
            let matrix_size = egui::vec2(MATRIX_WIDTH as f32 * pitch, MATRIX_HEIGHT as f32 * pitch);
            let ring_diameter = matrix_size.x + 8.0 * RING_LED_RADIUS;

            let (response, painter) = ui.allocate_painter(
                egui::vec2(ring_diameter, ring_diameter),
                egui::Sense::hover(),
            );
            let center = response.rect.center();
            let ring_radius = ring_diameter / 2.0 - RING_LED_RADIUS;

            #[allow(clippy::cast_precision_loss)]
            for index in 0..RING_LEDS {
                let angle = std::f32::consts::TAU * index as f32 / RING_LEDS as f32;
                let position = center + egui::vec2(angle.sin(), -angle.cos()) * ring_radius;
                painter.circle_filled(position, RING_LED_RADIUS, bus.ring_color(index));
            }

            let origin = center - matrix_size / 2.0;
            #[allow(clippy::cast_precision_loss)]
            for y in 0..MATRIX_HEIGHT {
                for x in 0..MATRIX_WIDTH {
                    let level = bus.visible_pixel(x, y);
                    let rect = egui::Rect::from_min_size(
                        origin + egui::vec2(x as f32 * pitch, y as f32 * pitch),
                        egui::vec2(PIXEL_SIZE, PIXEL_SIZE),
                    );
                    let color = egui::Color32::from_rgb(level.saturating_add(24), level / 2 + 16, 16);
                    painter.rect_filled(rect, 3.0, color);
                }
            }
        });
    }
}
