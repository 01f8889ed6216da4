//! Static pixel to LED mapping.
//!
//! For one hardware unit, the mapping records which frame pixel feeds each
//! slot of its chain. It is computed once for a frame size and only read
//! afterwards; a new frame size means a new mapping.

use heapless::Vec;

use crate::error::AllocationError;
use crate::setup::{Dimensions, HardwareDescriptor};

/// Components per frame pixel.
pub const PIXEL_COMPONENTS: usize = 3;

/// Chain slot to frame pixel table of one hardware unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping<const MAX_LEDS: usize> {
    /// Source pixel index per chain slot, `None` for unmapped slots.
    sources: Vec<Option<u32>, MAX_LEDS>,
    frame: Dimensions,
    mapped: usize,
}

impl<const MAX_LEDS: usize> Mapping<MAX_LEDS> {
    /// Map every LED of `hardware` onto a frame of the given size.
    ///
    /// Units are walked tile by tile, LEDs in wiring order, so the slot index
    /// grows across tiles. LEDs falling outside the frame stay unmapped.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn build(
        unit: usize,
        hardware: &HardwareDescriptor,
        frame: Dimensions,
    ) -> Result<Self, AllocationError> {
        let leds = hardware.led_count();
        if leds > MAX_LEDS {
            return Err(AllocationError::ChainTooLong {
                unit,
                leds,
                capacity: MAX_LEDS,
            });
        }

        let frame_w = i32::from(frame.width);
        let frame_h = i32::from(frame.height);
        let mut sources = Vec::new();
        let mut mapped = 0;

        for tile in hardware.tiles() {
            for (local_x, local_y) in tile.leds() {
                // LEDs past the i32 range can never be inside the frame
                let x = tile.x.checked_add(i32::from(local_x));
                let y = tile.y.checked_add(i32::from(local_y));
                let source = match (x, y) {
                    (Some(x), Some(y))
                        if (0..frame_w).contains(&x) && (0..frame_h).contains(&y) =>
                    {
                        mapped += 1;
                        Some(y as u32 * u32::from(frame.width) + x as u32)
                    }
                    _ => None,
                };
                // Length checked above
                let _ = sources.push(source);
            }
        }

        Ok(Self {
            sources,
            frame,
            mapped,
        })
    }

    /// Number of chain slots.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Number of slots with a source pixel.
    pub const fn mapped(&self) -> usize {
        self.mapped
    }

    /// Frame size the mapping was built for.
    pub const fn frame(&self) -> Dimensions {
        self.frame
    }

    /// Source pixel index of a chain slot.
    pub fn source(&self, slot: usize) -> Option<usize> {
        self.sources.get(slot).copied().flatten().map(|p| p as usize)
    }

    /// Mapped `(slot, pixel index)` pairs in slot order.
    pub fn entries(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.sources
            .iter()
            .enumerate()
            .filter_map(|(slot, source)| source.map(|p| (slot, p as usize)))
    }

    /// Byte offset of a pixel index in a packed 24-bit frame.
    pub const fn byte_offset(pixel: usize) -> usize {
        pixel * PIXEL_COMPONENTS
    }
}
