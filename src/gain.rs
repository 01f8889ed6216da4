//! Calibration gain.
//!
//! Every hardware unit scales its channel values by one scalar gain. The
//! scaling is precomputed into a lookup table when the gain changes, so
//! filling a chain costs one table read per channel.

use crate::color::Rgb;

/// Gain that leaves values untouched.
pub const NEUTRAL_GAIN: f32 = 1.0;

/// Largest accepted gain.
pub const MAX_GAIN: f32 = 4.0;

/// Precomputed per-channel scaling for one gain value.
#[derive(Debug, Clone)]
pub struct GainTable {
    gain: f32,
    lut: [u8; 256],
}

impl GainTable {
    /// Identity table.
    #[allow(clippy::cast_possible_truncation)]
    pub const fn neutral() -> Self {
        let mut lut = [0u8; 256];
        let mut i = 0;
        while i < lut.len() {
            lut[i] = i as u8;
            i += 1;
        }
        Self {
            gain: NEUTRAL_GAIN,
            lut,
        }
    }

    /// Build the table for `gain`.
    ///
    /// Returns `None` if the gain is negative, not finite or above [`MAX_GAIN`].
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn new(gain: f32) -> Option<Self> {
        if !Self::is_valid(gain) {
            return None;
        }
        let mut lut = [0u8; 256];
        for (value, scaled) in lut.iter_mut().enumerate() {
            *scaled = libm::roundf(value as f32 * gain).min(255.0) as u8;
        }
        Some(Self { gain, lut })
    }

    pub fn is_valid(gain: f32) -> bool {
        gain.is_finite() && (0.0..=MAX_GAIN).contains(&gain)
    }

    pub const fn gain(&self) -> f32 {
        self.gain
    }

    /// Check if the table changes any value.
    #[allow(clippy::float_cmp)]
    pub fn is_active(&self) -> bool {
        self.gain != NEUTRAL_GAIN
    }

    /// Scale a single channel value.
    #[inline]
    pub const fn scale(&self, value: u8) -> u8 {
        self.lut[value as usize]
    }

    /// Scale every channel of a pixel.
    #[inline]
    pub const fn apply(&self, pixel: Rgb) -> Rgb {
        Rgb {
            r: self.scale(pixel.r),
            g: self.scale(pixel.g),
            b: self.scale(pixel.b),
        }
    }
}

impl Default for GainTable {
    fn default() -> Self {
        Self::neutral()
    }
}
