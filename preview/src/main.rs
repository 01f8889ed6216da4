//! Desktop preview app for myrtio-frame-mapper.
//!
//! Plays a generated video through the mapping pipeline and draws the frame
//! next to the LEDs as the simulated hardware shows them. All runtime changes
//! go through the control channel, the same way an embedded host sends them.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration as StdDuration, Instant as StdInstant};
use std::{env, f32::consts::TAU, fmt, fs, process};

use eframe::egui;
use myrtio_frame_mapper::{
    ControlChannel, ControlCommand, DeviceError, DeviceProvider, Display, DisplayConfig,
    FrameScheduler, FrameSource, HardwareDescriptor, Instant, LedDevice, LogLevel, Logger,
    RenderLease, Rgb,
};

/// Largest frame the preview can allocate.
const MAX_PIXELS: usize = 64 * 64;

/// Largest chain of a single hardware unit.
const MAX_LEDS: usize = 512;

const CONTROL_CHANNEL_SIZE: usize = 16;

/// Setup used when no file is given on the command line.
const DEMO_SETUP: &[u8] = include_bytes!("../setups/demo.json");

/// Size of each drawn pixel / LED in points.
const CELL_SIZE: f32 = 14.0;

const CELL_GAP: f32 = 2.0;

/// Static control channel between the UI and the pipeline.
static CONTROLS: ControlChannel<CONTROL_CHANNEL_SIZE> = ControlChannel::new();

type Latched = Rc<RefCell<Vec<Rgb>>>;

type PreviewScheduler =
    FrameScheduler<PatternSource, PreviewDevice, StderrLogger, MAX_PIXELS, MAX_LEDS>;

/// Simulated controller, shows a chain once it is latched.
struct PreviewDevice {
    pending: Vec<Rgb>,
    latched: Latched,
}

impl LedDevice for PreviewDevice {
    fn send_chain(&mut self, chain: &[Rgb]) -> Result<(), DeviceError> {
        self.pending.clear();
        self.pending.extend_from_slice(chain);
        Ok(())
    }

    fn latch(&mut self) -> Result<(), DeviceError> {
        self.latched.borrow_mut().clone_from(&self.pending);
        Ok(())
    }
}

/// Opens preview devices and keeps their latched output for drawing.
#[derive(Default)]
struct PreviewProvider {
    outputs: Vec<Latched>,
}

impl DeviceProvider for PreviewProvider {
    type Device = PreviewDevice;

    fn connect(
        &mut self,
        _unit: usize,
        hardware: &HardwareDescriptor,
    ) -> Result<PreviewDevice, DeviceError> {
        let leds = hardware.led_count();
        let latched = Rc::new(RefCell::new(vec![Rgb::default(); leds]));
        self.outputs.push(Rc::clone(&latched));
        Ok(PreviewDevice {
            pending: Vec::with_capacity(leds),
            latched,
        })
    }
}

/// Prints pipeline records to stderr.
struct StderrLogger;

impl Logger for StderrLogger {
    fn log(&mut self, level: LogLevel, args: fmt::Arguments<'_>) {
        eprintln!("[{}] {}", level.as_str(), args);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pattern {
    Plasma,
    Gradient,
    Scanline,
}

impl Pattern {
    const ALL: [Self; 3] = [Self::Plasma, Self::Gradient, Self::Scanline];

    const fn as_str(self) -> &'static str {
        match self {
            Self::Plasma => "plasma",
            Self::Gradient => "gradient",
            Self::Scanline => "scanline",
        }
    }
}

/// Generated video.
struct PatternSource {
    pattern: Pattern,
}

impl FrameSource for PatternSource {
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn render<const N: usize>(&mut self, now: Instant, frame: &mut RenderLease<'_, N>) {
        let t = now.as_millis() as f32 / 1000.0;
        let (width, height) = (frame.width(), frame.height());
        let scan = (t * 8.0) as u32 % u32::from(width.max(1));

        for y in 0..height {
            for x in 0..width {
                let (fx, fy) = (f32::from(x), f32::from(y));
                let color = match self.pattern {
                    Pattern::Plasma => {
                        let v = (fx * 0.4 + t).sin()
                            + (fy * 0.3 - t * 1.3).sin()
                            + ((fx + fy) * 0.25 + t * 0.7).sin();
                        hue(v / 6.0 + 0.5)
                    }
                    Pattern::Gradient => Rgb::new(
                        channel(fx / f32::from(width)),
                        channel(fy / f32::from(height)),
                        channel(t.sin() * 0.5 + 0.5),
                    ),
                    Pattern::Scanline if u32::from(x) == scan => Rgb::new(255, 255, 255),
                    Pattern::Scanline => Rgb::default(),
                };
                frame.set_pixel(x, y, color);
            }
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn channel(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn hue(h: f32) -> Rgb {
    let wave = |offset: f32| channel(((h + offset) * TAU).sin() * 0.5 + 0.5);
    Rgb::new(wave(0.0), wave(1.0 / 3.0), wave(2.0 / 3.0))
}

/// Queue a command for the next frame.
fn send(command: ControlCommand) {
    if let Err(rejected) = CONTROLS.try_send(command) {
        eprintln!("control queue full, dropped {:?}", rejected.0);
    }
}

/// What the pipeline shows, copied out for drawing.
#[derive(Default)]
struct Snapshot {
    width: u16,
    height: u16,
    pixels: Vec<Rgb>,
    /// LED position in frame coordinates and its latched color.
    leds: Vec<(i32, i32, Rgb)>,
}

impl Snapshot {
    fn capture(scheduler: &PreviewScheduler, outputs: &[Latched]) -> Self {
        let display = scheduler.display();
        let mut snapshot = Self::default();
        if let Some(frame) = display.frame() {
            snapshot.width = frame.width();
            snapshot.height = frame.height();
            snapshot.pixels = frame.pixels().to_vec();
        }

        let Some(setup) = display.setup() else {
            return snapshot;
        };
        for (hardware, output) in setup.hardware().iter().zip(outputs) {
            let latched = output.borrow();
            let positions = hardware.tiles().iter().flat_map(|tile| {
                tile.leds()
                    .map(move |(x, y)| {
                        (
                            tile.x.saturating_add(i32::from(x)),
                            tile.y.saturating_add(i32::from(y)),
                        )
                    })
            });
            for (slot, (x, y)) in positions.enumerate() {
                let color = latched.get(slot).copied().unwrap_or_default();
                snapshot.leds.push((x, y, color));
            }
        }
        snapshot
    }
}

struct PreviewApp {
    scheduler: Option<PreviewScheduler>,
    /// Latched chains per unit, in setup order.
    outputs: Vec<Latched>,
    /// Hardware ids, in setup order.
    units: Vec<String>,
    error: Option<String>,

    /// Synthetic time in milliseconds.
    t_ms: u64,
    /// Wall-clock reference for delta time.
    last_frame: StdInstant,
    next_deadline: Instant,
    playing: bool,

    width: i32,
    height: i32,
    gains: Vec<f32>,
    verbosity: LogLevel,
    cell_size: f32,
}

impl PreviewApp {
    fn new(source: &[u8]) -> Self {
        let config = DisplayConfig {
            verbosity: LogLevel::Debug,
            ..DisplayConfig::default()
        };
        let mut display = Display::new(config, StderrLogger);
        let mut provider = PreviewProvider::default();

        let mut app = Self {
            scheduler: None,
            outputs: Vec::new(),
            units: Vec::new(),
            error: None,
            t_ms: 0,
            last_frame: StdInstant::now(),
            next_deadline: Instant::from_millis(0),
            playing: true,
            width: config.width,
            height: config.height,
            gains: Vec::new(),
            verbosity: config.verbosity,
            cell_size: CELL_SIZE,
        };

        match display
            .open(source, &mut provider)
            .and_then(|()| display.pool())
        {
            Ok(_) => {
                if let Some(setup) = display.setup() {
                    for hardware in setup.hardware() {
                        app.units.push(hardware.id().to_string());
                        app.gains.push(hardware.gain().unwrap_or(1.0));
                    }
                }
                app.outputs = provider.outputs;
                app.scheduler = Some(FrameScheduler::new(
                    display,
                    PatternSource {
                        pattern: Pattern::Plasma,
                    },
                ));
            }
            Err(e) => app.error = Some(e.to_string()),
        }
        app
    }

    fn reset_time(&mut self) {
        self.t_ms = 0;
        self.next_deadline = Instant::from_millis(0);
        self.last_frame = StdInstant::now();
        if let Some(scheduler) = self.scheduler.as_mut() {
            scheduler.reset(self.next_deadline);
        }
    }

    /// Advance synthetic time by the wall-clock delta.
    #[allow(clippy::cast_possible_truncation)]
    fn update_time(&mut self) {
        let now = StdInstant::now();
        let delta = now.duration_since(self.last_frame);
        self.last_frame = now;
        if self.playing {
            self.t_ms = self.t_ms.wrapping_add(delta.as_millis() as u64);
        }
    }

    /// Apply queued commands and show a frame if one is due.
    fn step(&mut self) -> StdDuration {
        let idle = StdDuration::from_millis(16);
        let Some(scheduler) = self.scheduler.as_mut() else {
            return idle;
        };
        scheduler.display_mut().process_control(&CONTROLS.receiver());

        let now = Instant::from_millis(self.t_ms);
        if !self.playing || now < self.next_deadline {
            return idle;
        }
        match scheduler.tick(now) {
            Ok(result) => {
                self.next_deadline = result.next_deadline;
                StdDuration::from_micros(result.sleep_duration.as_micros())
            }
            Err(e) => {
                self.error = Some(e.to_string());
                idle
            }
        }
    }

    fn controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("⏮ Reset").clicked() {
                self.reset_time();
            }
            if ui
                .button(if self.playing { "⏸ Pause" } else { "▶ Play" })
                .clicked()
            {
                self.playing = !self.playing;
            }
            let secs = self.t_ms / 1000;
            let ms = self.t_ms % 1000;
            ui.label(format!("Time: {secs}.{ms:03}s"));

            ui.add_space(16.0);
            ui.label("Pattern:");
            if let Some(scheduler) = self.scheduler.as_mut() {
                let source = scheduler.source_mut();
                egui::ComboBox::from_id_salt("pattern_selector")
                    .selected_text(source.pattern.as_str())
                    .show_ui(ui, |ui| {
                        for pattern in Pattern::ALL {
                            ui.selectable_value(&mut source.pattern, pattern, pattern.as_str());
                        }
                    });
            }
        });

        ui.add_space(4.0);

        ui.horizontal(|ui| {
            ui.label("Frame (0 = setup):");
            let old_size = (self.width, self.height);
            ui.add(egui::DragValue::new(&mut self.width).range(0..=64));
            ui.label("x");
            ui.add(egui::DragValue::new(&mut self.height).range(0..=64));
            if (self.width, self.height) != old_size {
                send(ControlCommand::Resize {
                    width: self.width,
                    height: self.height,
                });
            }

            ui.add_space(16.0);
            ui.label("Log:");
            let old_verbosity = self.verbosity;
            egui::ComboBox::from_id_salt("verbosity_selector")
                .selected_text(self.verbosity.as_str())
                .show_ui(ui, |ui| {
                    for level in (0..=7).filter_map(LogLevel::from_raw) {
                        ui.selectable_value(&mut self.verbosity, level, level.as_str());
                    }
                });
            if self.verbosity != old_verbosity {
                send(ControlCommand::SetVerbosity(self.verbosity));
            }

            ui.add_space(16.0);
            ui.label("Cell:");
            ui.add(egui::Slider::new(&mut self.cell_size, 4.0..=32.0));
        });

        ui.add_space(4.0);

        for (unit, (id, gain)) in self.units.iter().zip(self.gains.iter_mut()).enumerate() {
            ui.horizontal(|ui| {
                ui.label(format!("Gain {id}:"));
                if ui.add(egui::Slider::new(gain, 0.0..=4.0)).changed() {
                    send(ControlCommand::SetGain { unit, gain: *gain });
                }
            });
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn draw_frame(&self, ui: &mut egui::Ui, snapshot: &Snapshot) {
        let pitch = self.cell_size + CELL_GAP;
        let size = egui::vec2(
            f32::from(snapshot.width) * pitch,
            f32::from(snapshot.height) * pitch,
        );
        let (response, painter) = ui.allocate_painter(size, egui::Sense::hover());
        let origin = response.rect.min;
        let width = usize::from(snapshot.width.max(1));

        for (i, pixel) in snapshot.pixels.iter().enumerate() {
            let x = origin.x + (i % width) as f32 * pitch;
            let y = origin.y + (i / width) as f32 * pitch;
            let rect = egui::Rect::from_min_size(
                egui::pos2(x, y),
                egui::vec2(self.cell_size, self.cell_size),
            );
            painter.rect_filled(rect, 0.0, color32(*pixel));
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn draw_leds(&self, ui: &mut egui::Ui, snapshot: &Snapshot) {
        let pitch = self.cell_size + CELL_GAP;
        let (columns, rows) = snapshot.leds.iter().fold(
            (i32::from(snapshot.width), i32::from(snapshot.height)),
            |(w, h), &(x, y, _)| (w.max(x + 1), h.max(y + 1)),
        );
        let size = egui::vec2(columns.max(0) as f32 * pitch, rows.max(0) as f32 * pitch);
        let (response, painter) = ui.allocate_painter(size, egui::Sense::hover());
        let origin = response.rect.min;
        let radius = self.cell_size / 2.0;

        for &(x, y, color) in &snapshot.leds {
            // LEDs placed at negative offsets are not drawn
            if x < 0 || y < 0 {
                continue;
            }
            let center = egui::pos2(
                origin.x + x as f32 * pitch + radius,
                origin.y + y as f32 * pitch + radius,
            );
            painter.circle_filled(center, radius, color32(color));
        }
    }
}

const fn color32(pixel: Rgb) -> egui::Color32 {
    egui::Color32::from_rgb(pixel.r, pixel.g, pixel.b)
}

impl eframe::App for PreviewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_time();
        let sleep = self.step();
        ctx.request_repaint_after(sleep);

        let snapshot = self
            .scheduler
            .as_ref()
            .map(|scheduler| Snapshot::capture(scheduler, &self.outputs))
            .unwrap_or_default();

        egui::CentralPanel::default().show(ctx, |ui| {
            self.controls(ui);

            if let Some(error) = &self.error {
                ui.add_space(8.0);
                ui.colored_label(egui::Color32::RED, error);
            }

            ui.add_space(16.0);

            ui.horizontal_top(|ui| {
                ui.vertical(|ui| {
                    ui.label(format!("Frame {}x{}", snapshot.width, snapshot.height));
                    self.draw_frame(ui, &snapshot);
                });
                ui.add_space(24.0);
                ui.vertical(|ui| {
                    ui.label(format!("LEDs ({})", snapshot.leds.len()));
                    self.draw_leds(ui, &snapshot);
                });
            });
        });
    }
}

impl Drop for PreviewApp {
    fn drop(&mut self) {
        if let Some(scheduler) = self.scheduler.as_mut() {
            scheduler.display_mut().close();
        }
    }
}

fn main() -> eframe::Result<()> {
    let source = match env::args().nth(1) {
        Some(path) => match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                eprintln!("failed to read setup {path}: {e}");
                process::exit(1);
            }
        },
        None => DEMO_SETUP.to_vec(),
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 600.0])
            .with_title("Frame Mapper Preview"),
        ..Default::default()
    };

    eframe::run_native(
        "myrtio-frame-mapper-preview",
        options,
        Box::new(move |_cc| Ok(Box::new(PreviewApp::new(&source)))),
    )
}
