//! Tile geometry.
//!
//! A tile is a rectangle of LEDs placed in the frame. LEDs are chained in a
//! wiring order that is defined on the unrotated tile; the rotation then turns
//! the wired rectangle clockwise into its placed orientation.

use core::iter::FusedIterator;

const WIRING_NAME_ROW_MAJOR: &str = "row_major";
const WIRING_NAME_COLUMN_MAJOR: &str = "column_major";
const WIRING_NAME_SERPENTINE: &str = "serpentine";

/// Clockwise rotation of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    None,
    Cw90,
    Cw180,
    Cw270,
}

impl Rotation {
    pub const fn from_degrees(degrees: u16) -> Option<Self> {
        Some(match degrees {
            0 => Self::None,
            90 => Self::Cw90,
            180 => Self::Cw180,
            270 => Self::Cw270,
            _ => return None,
        })
    }

    pub const fn degrees(self) -> u16 {
        match self {
            Self::None => 0,
            Self::Cw90 => 90,
            Self::Cw180 => 180,
            Self::Cw270 => 270,
        }
    }

    /// Check if the rotation swaps the tile axes.
    pub const fn is_transposed(self) -> bool {
        matches!(self, Self::Cw90 | Self::Cw270)
    }
}

/// Order in which LEDs are chained inside a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Wiring {
    /// Left to right, then top to bottom.
    #[default]
    RowMajor,
    /// Top to bottom, then left to right.
    ColumnMajor,
    /// Row major with every odd row running right to left.
    Serpentine,
}

impl Wiring {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RowMajor => WIRING_NAME_ROW_MAJOR,
            Self::ColumnMajor => WIRING_NAME_COLUMN_MAJOR,
            Self::Serpentine => WIRING_NAME_SERPENTINE,
        }
    }

    pub fn parse_from_str(s: &str) -> Option<Self> {
        match s {
            WIRING_NAME_ROW_MAJOR => Some(Self::RowMajor),
            WIRING_NAME_COLUMN_MAJOR => Some(Self::ColumnMajor),
            WIRING_NAME_SERPENTINE => Some(Self::Serpentine),
            _ => None,
        }
    }
}

/// Rectangular placement of LEDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    /// Horizontal offset in frame pixels.
    pub x: i32,
    /// Vertical offset in frame pixels.
    pub y: i32,
    /// Placed width (after rotation).
    pub width: u16,
    /// Placed height (after rotation).
    pub height: u16,
    pub rotation: Rotation,
    pub wiring: Wiring,
}

impl Tile {
    /// Create an unrotated, row major tile.
    pub const fn new(x: i32, y: i32, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
            rotation: Rotation::None,
            wiring: Wiring::RowMajor,
        }
    }

    #[must_use]
    pub const fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    #[must_use]
    pub const fn with_wiring(mut self, wiring: Wiring) -> Self {
        self.wiring = wiring;
        self
    }

    /// Number of LEDs on the tile.
    pub const fn led_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Right edge (exclusive) in frame coordinates, saturating at `i32::MAX`.
    pub const fn right(&self) -> i32 {
        self.x.saturating_add(self.width as i32)
    }

    /// Bottom edge (exclusive) in frame coordinates, saturating at `i32::MAX`.
    pub const fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height as i32)
    }

    /// Dimensions of the tile before rotation, as the LEDs are wired.
    const fn wired_size(&self) -> (u16, u16) {
        if self.rotation.is_transposed() {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        }
    }

    /// Placed position of the LED at `index` in wiring order.
    ///
    /// Returns tile-local coordinates, `None` if the index is past the last LED.
    #[allow(clippy::cast_possible_truncation)]
    pub fn led_position(&self, index: usize) -> Option<(u16, u16)> {
        if index >= self.led_count() {
            return None;
        }
        let (wired_w, wired_h) = self.wired_size();
        let (wired_w, wired_h) = (wired_w as usize, wired_h as usize);

        let (u, v) = match self.wiring {
            Wiring::RowMajor => (index % wired_w, index / wired_w),
            Wiring::ColumnMajor => (index / wired_h, index % wired_h),
            Wiring::Serpentine => {
                let row = index / wired_w;
                let col = index % wired_w;
                if row % 2 == 1 {
                    (wired_w - 1 - col, row)
                } else {
                    (col, row)
                }
            }
        };

        let (x, y) = match self.rotation {
            Rotation::None => (u, v),
            Rotation::Cw90 => (wired_h - 1 - v, u),
            Rotation::Cw180 => (wired_w - 1 - u, wired_h - 1 - v),
            Rotation::Cw270 => (v, wired_w - 1 - u),
        };
        Some((x as u16, y as u16))
    }

    /// Iterate over placed LED positions in wiring order.
    pub fn leds(&self) -> TileLeds {
        TileLeds {
            tile: *self,
            index: 0,
        }
    }
}

/// Iterator over the tile-local LED positions of a [`Tile`].
#[derive(Debug, Clone)]
pub struct TileLeds {
    tile: Tile,
    index: usize,
}

impl Iterator for TileLeds {
    type Item = (u16, u16);

    fn next(&mut self) -> Option<Self::Item> {
        let position = self.tile.led_position(self.index)?;
        self.index += 1;
        Some(position)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.tile.led_count().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TileLeds {}

impl FusedIterator for TileLeds {}
