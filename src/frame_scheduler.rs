//! Frame scheduling and timing utilities.
//!
//! Drives a [`Display`] from a [`FrameSource`] at a fixed rate for hosts that
//! have no clock of their own (previews, test patterns, standalone players).
//! Provides portable frame pacing without async/await or platform-specific
//! timers. The caller is responsible for sleeping between frames.

use embassy_time::{Duration, Instant};

use crate::display::Display;
use crate::error::Error;
use crate::frame::RenderLease;
use crate::hardware::LedDevice;
use crate::logging::Logger;

/// Default target frame rate (30 FPS).
pub const DEFAULT_FPS: u32 = 30;

/// Default frame duration based on target FPS.
pub const DEFAULT_FRAME_DURATION: Duration = Duration::from_millis(1000 / DEFAULT_FPS as u64);

/// Produces the pixels of each frame.
pub trait FrameSource {
    /// Write the frame shown at `now` into the leased buffer.
    fn render<const MAX_PIXELS: usize>(
        &mut self,
        now: Instant,
        frame: &mut RenderLease<'_, MAX_PIXELS>,
    );
}

/// Result of a frame tick operation.
#[derive(Debug, Clone, Copy)]
pub struct FrameResult {
    /// The deadline for the next frame.
    pub next_deadline: Instant,
    /// How long to wait until the next frame (may be zero if behind schedule).
    pub sleep_duration: Duration,
    /// Number of hardware units that latched the frame.
    pub latched_units: usize,
}

/// Fixed-rate driver for a pooled [`Display`].
///
/// Each tick leases the frame, lets the source draw into it and pushes it
/// through prepare and display. The caller sleeps for the returned duration:
///
/// ```ignore
/// let mut scheduler = FrameScheduler::new(display, source);
/// loop {
///     let result = scheduler.tick(Instant::now())?;
///     sleep(result.sleep_duration);
/// }
/// ```
pub struct FrameScheduler<S, D, L, const MAX_PIXELS: usize, const MAX_LEDS: usize> {
    source: S,
    display: Display<D, L, MAX_PIXELS, MAX_LEDS>,
    next_frame: Instant,
    frame_duration: Duration,
}

impl<S, D, L, const MAX_PIXELS: usize, const MAX_LEDS: usize>
    FrameScheduler<S, D, L, MAX_PIXELS, MAX_LEDS>
where
    S: FrameSource,
    D: LedDevice,
    L: Logger,
{
    /// Create a scheduler running at [`DEFAULT_FPS`].
    pub fn new(display: Display<D, L, MAX_PIXELS, MAX_LEDS>, source: S) -> Self {
        Self::with_frame_duration(display, source, DEFAULT_FRAME_DURATION)
    }

    /// Create a scheduler with a custom frame period.
    pub fn with_frame_duration(
        display: Display<D, L, MAX_PIXELS, MAX_LEDS>,
        source: S,
        frame_duration: Duration,
    ) -> Self {
        Self {
            source,
            display,
            next_frame: Instant::from_millis(0),
            frame_duration,
        }
    }

    /// Show one frame and compute the next deadline.
    ///
    /// More than two periods behind, the schedule restarts at `now` instead
    /// of rendering the backlog. The display must be pooled, see
    /// [`Display::pool`].
    pub fn tick(&mut self, now: Instant) -> Result<FrameResult, Error> {
        let max_drift = self.frame_duration * 2;
        if now > self.next_frame + max_drift {
            self.next_frame = now;
        }

        let mut lease = self.display.lease()?;
        self.source.render(now, &mut lease);
        let token = lease.publish();
        let prepared = self.display.prepare(token)?;
        let latched_units = self.display.display(prepared)?;

        self.next_frame += self.frame_duration;

        let sleep_duration = if self.next_frame > now {
            self.next_frame - now
        } else {
            Duration::from_millis(0)
        };

        Ok(FrameResult {
            next_deadline: self.next_frame,
            sleep_duration,
            latched_units,
        })
    }

    /// Restart the schedule at `now`, e.g. after the host clock jumped back.
    pub fn reset(&mut self, now: Instant) {
        self.next_frame = now;
    }

    pub const fn frame_duration(&self) -> Duration {
        self.frame_duration
    }

    pub const fn display(&self) -> &Display<D, L, MAX_PIXELS, MAX_LEDS> {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut Display<D, L, MAX_PIXELS, MAX_LEDS> {
        &mut self.display
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}
