//! Frame buffer.
//!
//! The frame is the single pixel buffer shared between the video host and
//! the mapping engine. The host never holds a plain pointer to it: it gets a
//! [`RenderLease`] with exclusive write access for one render step, and
//! publishing the lease yields a one-shot [`FrameToken`]. The engine reads the
//! pixels only after redeeming that token, so every frame has exactly one
//! writer followed by exactly one reader.

use core::ops::{Deref, DerefMut};

use heapless::Vec;

use crate::color::{BLACK, Rgb};
use crate::error::{AllocationError, Error};
use crate::setup::Dimensions;

const FORMAT_NAME_RGB8: &str = "RGB u8";
const FORMAT_NAME_RGBA8: &str = "RGBA u8";
const FORMAT_NAME_BGR8: &str = "BGR u8";

/// Pixel layout of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 8-bit red, green, blue (24 bpp).
    Rgb8,
    /// 8-bit red, green, blue, alpha (32 bpp).
    Rgba8,
    /// 8-bit blue, green, red (24 bpp).
    Bgr8,
}

impl PixelFormat {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rgb8 => FORMAT_NAME_RGB8,
            Self::Rgba8 => FORMAT_NAME_RGBA8,
            Self::Bgr8 => FORMAT_NAME_BGR8,
        }
    }

    pub fn parse_from_str(s: &str) -> Option<Self> {
        match s {
            FORMAT_NAME_RGB8 => Some(Self::Rgb8),
            FORMAT_NAME_RGBA8 => Some(Self::Rgba8),
            FORMAT_NAME_BGR8 => Some(Self::Bgr8),
            _ => None,
        }
    }

    /// Number of components per pixel.
    pub const fn components(self) -> usize {
        match self {
            Self::Rgb8 | Self::Bgr8 => 3,
            Self::Rgba8 => 4,
        }
    }
}

/// Proof that a frame was written and published.
///
/// Tokens cannot be cloned; redeeming one consumes it.
#[must_use = "a published frame must be handed to the pipeline"]
#[derive(Debug, PartialEq, Eq)]
pub struct FrameToken {
    sequence: u32,
}

impl FrameToken {
    pub const fn sequence(&self) -> u32 {
        self.sequence
    }
}

/// Canonical RGB pixel buffer.
#[derive(Debug)]
pub struct Frame<const MAX_PIXELS: usize> {
    dimensions: Dimensions,
    format: PixelFormat,
    pixels: Vec<Rgb, MAX_PIXELS>,
    /// Sequence of the last published frame.
    sequence: u32,
    /// Whether the last published frame is still waiting for the engine.
    pending: bool,
}

impl<const MAX_PIXELS: usize> Frame<MAX_PIXELS> {
    /// Allocate a black frame.
    pub fn allocate(width: u16, height: u16, format: PixelFormat) -> Result<Self, AllocationError> {
        let dimensions = Dimensions::new(width, height);
        if dimensions.is_empty() {
            return Err(AllocationError::ZeroDimension);
        }
        if format != PixelFormat::Rgb8 {
            return Err(AllocationError::UnsupportedFormat(format));
        }
        let pixels = dimensions.pixels();
        let too_large = AllocationError::FrameTooLarge {
            pixels,
            capacity: MAX_PIXELS,
        };
        let mut buffer = Vec::new();
        buffer.resize(pixels, BLACK).map_err(|()| too_large)?;

        Ok(Self {
            dimensions,
            format,
            pixels: buffer,
            sequence: 0,
            pending: false,
        })
    }

    pub const fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub const fn width(&self) -> u16 {
        self.dimensions.width
    }

    pub const fn height(&self) -> u16 {
        self.dimensions.height
    }

    pub const fn format(&self) -> PixelFormat {
        self.format
    }

    /// Sequence number of the last published frame.
    pub const fn sequence(&self) -> u32 {
        self.sequence
    }

    /// Pixel index of `(x, y)` in row-major order.
    pub const fn index_of(&self, x: u16, y: u16) -> usize {
        y as usize * self.dimensions.width as usize + x as usize
    }

    /// Size of the pixel buffer in bytes.
    pub fn byte_len(&self) -> usize {
        self.pixels.len() * self.format.components()
    }

    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    pub fn pixel(&self, x: u16, y: u16) -> Option<Rgb> {
        if x >= self.dimensions.width || y >= self.dimensions.height {
            return None;
        }
        self.pixels.get(self.index_of(x, y)).copied()
    }

    /// Lease the pixels to the host for one render step.
    pub fn lease(&mut self) -> RenderLease<'_, MAX_PIXELS> {
        RenderLease { frame: self }
    }

    /// Accept a token for reading.
    ///
    /// Fails if the token belongs to an older frame or was already redeemed.
    pub fn redeem(&mut self, token: FrameToken) -> Result<(), Error> {
        if !self.pending || token.sequence != self.sequence {
            return Err(Error::StaleFrame);
        }
        self.pending = false;
        Ok(())
    }

    /// Continue numbering after a frame this one replaces.
    pub(crate) fn resume_after(&mut self, sequence: u32) {
        self.sequence = sequence;
    }
}

/// Exclusive write access to a [`Frame`] for one render step.
#[derive(Debug)]
pub struct RenderLease<'a, const MAX_PIXELS: usize> {
    frame: &'a mut Frame<MAX_PIXELS>,
}

impl<const MAX_PIXELS: usize> RenderLease<'_, MAX_PIXELS> {
    pub const fn width(&self) -> u16 {
        self.frame.dimensions.width
    }

    pub const fn height(&self) -> u16 {
        self.frame.dimensions.height
    }

    /// Set one pixel, returns `false` if it is out of bounds.
    pub fn set_pixel(&mut self, x: u16, y: u16, color: Rgb) -> bool {
        if x >= self.width() || y >= self.height() {
            return false;
        }
        let index = self.frame.index_of(x, y);
        self.frame.pixels[index] = color;
        true
    }

    pub fn row_mut(&mut self, y: u16) -> Option<&mut [Rgb]> {
        if y >= self.height() {
            return None;
        }
        let width = self.width() as usize;
        let start = y as usize * width;
        Some(&mut self.frame.pixels[start..start + width])
    }

    /// Copy packed 24-bit RGB rows, `pitch` bytes apart.
    ///
    /// Returns the number of rows copied. Rows missing from `source` are left
    /// untouched.
    pub fn copy_from_rgb24(&mut self, source: &[u8], pitch: usize) -> usize {
        let width = self.width() as usize;
        let row_bytes = width * 3;
        if pitch < row_bytes {
            return 0;
        }

        let mut copied = 0;
        for (y, row) in source.chunks(pitch).take(self.height() as usize).enumerate() {
            let Some(row) = row.get(..row_bytes) else {
                break;
            };
            let start = y * width;
            for (pixel, bytes) in self.frame.pixels[start..start + width]
                .iter_mut()
                .zip(row.chunks_exact(3))
            {
                *pixel = Rgb::new(bytes[0], bytes[1], bytes[2]);
            }
            copied += 1;
        }
        copied
    }

    /// Finish writing and hand the frame over.
    pub fn publish(self) -> FrameToken {
        self.frame.sequence = self.frame.sequence.wrapping_add(1);
        self.frame.pending = true;
        FrameToken {
            sequence: self.frame.sequence,
        }
    }
}

impl<const MAX_PIXELS: usize> Deref for RenderLease<'_, MAX_PIXELS> {
    type Target = [Rgb];

    fn deref(&self) -> &Self::Target {
        &self.frame.pixels
    }
}

impl<const MAX_PIXELS: usize> DerefMut for RenderLease<'_, MAX_PIXELS> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.frame.pixels
    }
}
