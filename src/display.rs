//! Display lifecycle.
//!
//! [`Display`] is what a video host talks to. It follows the host's output
//! callbacks: `open` loads the setup and opens the devices, `pool` allocates
//! the frame and builds the mapping, then every frame is leased, published,
//! prepared (fill + transmit) and displayed (latch). `close` releases
//! everything.

use crate::control::{ControlCommand, ControlReceiver};
use crate::engine::Engine;
use crate::error::Error;
use crate::frame::{Frame, FrameToken, PixelFormat, RenderLease};
use crate::hardware::{DeviceProvider, LedDevice};
use crate::logging::{Log, LogLevel, Logger};
use crate::setup::{Dimensions, Setup};

/// Session state of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Uninitialized,
    SetupLoaded,
    MappingReady,
    Streaming,
    Closed,
}

impl PipelineState {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::SetupLoaded => "setup-loaded",
            Self::MappingReady => "mapping-ready",
            Self::Streaming => "streaming",
            Self::Closed => "closed",
        }
    }

    /// Check if frames can be leased and prepared.
    pub const fn accepts_frames(self) -> bool {
        matches!(self, Self::MappingReady | Self::Streaming)
    }
}

/// Host overrides.
#[derive(Debug, Clone, Copy)]
pub struct DisplayConfig {
    /// Fixed frame width, `<= 0` uses the setup width.
    pub width: i32,
    /// Fixed frame height, `<= 0` uses the setup height.
    pub height: i32,
    /// Log verbosity.
    pub verbosity: LogLevel,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            verbosity: LogLevel::Info,
        }
    }
}

/// Proof that a frame was prepared and may be displayed.
#[must_use = "a prepared frame must be displayed"]
#[derive(Debug, PartialEq, Eq)]
pub struct DisplayToken {
    sequence: u32,
}

impl DisplayToken {
    pub const fn sequence(&self) -> u32 {
        self.sequence
    }
}

/// LED video output.
pub struct Display<D, L, const MAX_PIXELS: usize, const MAX_LEDS: usize> {
    config: DisplayConfig,
    log: Log<L>,
    state: PipelineState,
    dimensions: Dimensions,
    setup: Option<Setup>,
    engine: Option<Engine<D, MAX_LEDS>>,
    frame: Option<Frame<MAX_PIXELS>>,
}

impl<D, L, const MAX_PIXELS: usize, const MAX_LEDS: usize> Display<D, L, MAX_PIXELS, MAX_LEDS>
where
    D: LedDevice,
    L: Logger,
{
    pub fn new(config: DisplayConfig, logger: L) -> Self {
        Self {
            config,
            log: Log::new(logger, config.verbosity),
            state: PipelineState::Uninitialized,
            dimensions: Dimensions::default(),
            setup: None,
            engine: None,
            frame: None,
        }
    }

    pub const fn state(&self) -> PipelineState {
        self.state
    }

    /// Frame size, known once the setup is loaded.
    pub const fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub const fn config(&self) -> &DisplayConfig {
        &self.config
    }

    pub const fn setup(&self) -> Option<&Setup> {
        self.setup.as_ref()
    }

    pub const fn engine(&self) -> Option<&Engine<D, MAX_LEDS>> {
        self.engine.as_ref()
    }

    pub fn engine_mut(&mut self) -> Option<&mut Engine<D, MAX_LEDS>> {
        self.engine.as_mut()
    }

    pub const fn frame(&self) -> Option<&Frame<MAX_PIXELS>> {
        self.frame.as_ref()
    }

    pub const fn log(&self) -> &Log<L> {
        &self.log
    }

    /// Load the setup and open its devices.
    pub fn open<P>(&mut self, source: &[u8], provider: &mut P) -> Result<(), Error>
    where
        P: DeviceProvider<Device = D>,
    {
        self.expect_state(PipelineState::Uninitialized)?;
        self.log.info(format_args!("initializing LED output..."));

        let setup = match Setup::load(source) {
            Ok(setup) => setup,
            Err(e) => return Err(self.fail(e)),
        };
        let engine = match Engine::connect(&setup, provider, &mut self.log) {
            Ok(engine) => engine,
            Err(e) => return Err(self.fail(e)),
        };

        self.dimensions = setup.resolve_dimensions(self.config.width, self.config.height);
        self.log.info(format_args!(
            "initialized {}x{} pixel LED setup",
            self.dimensions.width, self.dimensions.height
        ));

        self.setup = Some(setup);
        self.engine = Some(engine);
        self.state = PipelineState::SetupLoaded;
        Ok(())
    }

    /// Allocate the frame and build mapping and gain tables.
    ///
    /// Calling it again once the frame exists does nothing.
    pub fn pool(&mut self) -> Result<Dimensions, Error> {
        if self.state.accepts_frames() {
            return Ok(self.dimensions);
        }
        self.expect_state(PipelineState::SetupLoaded)?;

        match self.build_frame(self.dimensions) {
            Ok(frame) => {
                self.frame = Some(frame);
                self.state = PipelineState::MappingReady;
                Ok(self.dimensions)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Lease the frame to the host renderer.
    pub fn lease(&mut self) -> Result<RenderLease<'_, MAX_PIXELS>, Error> {
        if !self.state.accepts_frames() {
            return Err(Error::InvalidState(self.state));
        }
        self.frame
            .as_mut()
            .map(Frame::lease)
            .ok_or(Error::InvalidState(self.state))
    }

    /// Fill the chains from a published frame and send them.
    pub fn prepare(&mut self, token: FrameToken) -> Result<DisplayToken, Error> {
        if !self.state.accepts_frames() {
            return Err(Error::InvalidState(self.state));
        }
        let (Some(frame), Some(engine)) = (self.frame.as_mut(), self.engine.as_mut()) else {
            return Err(Error::InvalidState(self.state));
        };

        frame.redeem(token)?;
        engine.fill_from_frame(frame, &mut self.log);
        engine.transmit(&mut self.log);

        self.state = PipelineState::Streaming;
        Ok(DisplayToken {
            sequence: frame.sequence(),
        })
    }

    /// Latch the prepared frame on every unit.
    ///
    /// Returns the number of latched units.
    pub fn display(&mut self, token: DisplayToken) -> Result<usize, Error> {
        self.expect_state(PipelineState::Streaming)?;
        let (Some(frame), Some(engine)) = (self.frame.as_ref(), self.engine.as_mut()) else {
            return Err(Error::InvalidState(self.state));
        };
        if token.sequence != frame.sequence() {
            return Err(Error::StaleFrame);
        }
        Ok(engine.show(&mut self.log))
    }

    /// Apply a control command.
    pub fn control(&mut self, command: ControlCommand) -> Result<(), Error> {
        match command {
            ControlCommand::SetVerbosity(level) => {
                self.config.verbosity = level;
                self.log.set_verbosity(level);
                Ok(())
            }
            ControlCommand::SetGain { unit, gain } => {
                let (Some(setup), Some(engine)) = (self.setup.as_ref(), self.engine.as_mut())
                else {
                    return Err(Error::InvalidState(self.state));
                };
                // Rejected gains fall back to neutral and are only logged
                engine.set_gain(setup, unit, gain, &mut self.log);
                Ok(())
            }
            ControlCommand::Resize { width, height } => self.resize(width, height),
        }
    }

    /// Apply every queued command.
    ///
    /// Returns the number of commands applied successfully.
    pub fn process_control<const SIZE: usize>(
        &mut self,
        receiver: &ControlReceiver<'_, SIZE>,
    ) -> usize {
        let mut applied = 0;
        while let Some(command) = receiver.try_receive() {
            match self.control(command) {
                Ok(()) => applied += 1,
                Err(e) => self.log.warn(format_args!("control {:?} failed: {}", command, e)),
            }
        }
        applied
    }

    /// Release frame, devices and setup.
    pub fn close(&mut self) {
        if self.state == PipelineState::Closed {
            return;
        }
        self.log.info(format_args!("deinitializing LED output..."));
        self.frame = None;
        self.engine = None;
        self.setup = None;
        self.state = PipelineState::Closed;
    }

    fn resize(&mut self, width: i32, height: i32) -> Result<(), Error> {
        let Some(setup) = self.setup.as_ref() else {
            return Err(Error::InvalidState(self.state));
        };
        let dimensions = setup.resolve_dimensions(width, height);

        if self.state == PipelineState::SetupLoaded {
            self.config.width = width;
            self.config.height = height;
            self.dimensions = dimensions;
            return Ok(());
        }
        if !self.state.accepts_frames() {
            return Err(Error::InvalidState(self.state));
        }
        if dimensions == self.dimensions {
            return Ok(());
        }

        // The current frame and mapping stay in place until the new ones are built
        let mut frame = match self.build_frame(dimensions) {
            Ok(frame) => frame,
            Err(e) => {
                self.log.error(format_args!(
                    "failed to resize to {}x{}: {}",
                    dimensions.width, dimensions.height, e
                ));
                // Only a failed remap touched the units, allocation fails before it
                if matches!(e, Error::NothingMapped) {
                    self.restore_mapping();
                }
                return Err(e);
            }
        };
        if let Some(previous) = self.frame.as_ref() {
            frame.resume_after(previous.sequence());
        }

        self.log.info(format_args!(
            "resized LED output to {}x{}",
            dimensions.width, dimensions.height
        ));
        self.config.width = width;
        self.config.height = height;
        self.dimensions = dimensions;
        self.frame = Some(frame);
        self.state = PipelineState::MappingReady;
        Ok(())
    }

    /// Allocate a frame and map every unit onto it.
    fn build_frame(&mut self, dimensions: Dimensions) -> Result<Frame<MAX_PIXELS>, Error> {
        let (Some(setup), Some(engine)) = (self.setup.as_ref(), self.engine.as_mut()) else {
            return Err(Error::InvalidState(self.state));
        };

        let frame =
            Frame::allocate(dimensions.width, dimensions.height, PixelFormat::Rgb8)?;
        self.log.debug(format_args!(
            "frame {}x{} \"{}\", {} bytes",
            frame.width(),
            frame.height(),
            frame.format().as_str(),
            frame.byte_len()
        ));
        for hardware in setup.hardware() {
            self.log.debug(format_args!(
                "hardware \"{}\": {} tiles, {} LEDs, gain {:?}",
                hardware.id(),
                hardware.tiles().len(),
                hardware.led_count(),
                hardware.gain()
            ));
        }

        if !engine.refresh_mapping(setup, &frame, &mut self.log) {
            self.log.error(format_args!("no LED maps into the frame"));
            return Err(Error::NothingMapped);
        }
        engine.refresh_gain(setup, &mut self.log);
        Ok(frame)
    }

    /// Map the units back onto the current frame after a failed rebuild.
    fn restore_mapping(&mut self) {
        if let (Some(setup), Some(engine), Some(frame)) =
            (self.setup.as_ref(), self.engine.as_mut(), self.frame.as_ref())
        {
            engine.refresh_mapping(setup, frame, &mut self.log);
        }
    }

    fn expect_state(&self, expected: PipelineState) -> Result<(), Error> {
        if self.state == expected {
            Ok(())
        } else {
            Err(Error::InvalidState(self.state))
        }
    }

    /// Tear down after a fatal error.
    fn fail(&mut self, error: Error) -> Error {
        match &error {
            Error::Empty => self.log.warn(format_args!("no LED hardware found in setup")),
            e => self.log.error(format_args!("failed to start LED output: {}", e)),
        }
        self.frame = None;
        self.engine = None;
        self.setup = None;
        self.state = PipelineState::Closed;
        error
    }
}
