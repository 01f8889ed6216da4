//! LED setup model.
//!
//! Parses the declarative description of the physical hardware: an ordered
//! list of hardware units, each owning one or more tiles placed in frame
//! coordinates.

mod tile;

use heapless::{String, Vec};
use serde::Deserialize;

pub use tile::{Rotation, Tile, TileLeds, Wiring};

use crate::error::{Error, ParseError};

/// Maximum number of hardware units in a setup.
pub const MAX_HARDWARE: usize = 16;

/// Maximum number of tiles per hardware unit.
pub const MAX_TILES: usize = 16;

/// Maximum length of a hardware identifier.
pub const MAX_ID_LEN: usize = 32;

/// Hardware identifier.
pub type HardwareId = String<MAX_ID_LEN>;

#[derive(Debug, Deserialize)]
struct SetupDocument {
    #[serde(default)]
    hardware: Vec<HardwareEntry, MAX_HARDWARE>,
}

#[derive(Debug, Deserialize)]
struct HardwareEntry {
    id: HardwareId,
    #[serde(default)]
    gain: Option<f32>,
    #[serde(default)]
    tiles: Vec<TileEntry, MAX_TILES>,
}

#[derive(Debug, Deserialize)]
struct TileEntry {
    #[serde(default)]
    x: i32,
    #[serde(default)]
    y: i32,
    width: u16,
    height: u16,
    #[serde(default)]
    rotation: u16,
    #[serde(default)]
    wiring: Option<String<16>>,
}

impl TileEntry {
    fn to_tile(&self, unit: usize, tile: usize) -> Result<Tile, ParseError> {
        if self.width == 0 || self.height == 0 {
            return Err(ParseError::EmptyTile { unit, tile });
        }
        let rotation =
            Rotation::from_degrees(self.rotation).ok_or(ParseError::InvalidRotation {
                unit,
                tile,
                degrees: self.rotation,
            })?;
        let wiring = match &self.wiring {
            Some(name) => {
                Wiring::parse_from_str(name).ok_or(ParseError::UnknownWiring { unit, tile })?
            }
            None => Wiring::default(),
        };

        Ok(Tile::new(self.x, self.y, self.width, self.height)
            .with_rotation(rotation)
            .with_wiring(wiring))
    }
}

/// Frame dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dimensions {
    pub width: u16,
    pub height: u16,
}

impl Dimensions {
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// Number of pixels.
    pub const fn pixels(self) -> usize {
        self.width as usize * self.height as usize
    }

    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// One physical LED driver endpoint as described by the setup.
#[derive(Debug, Clone)]
pub struct HardwareDescriptor {
    id: HardwareId,
    gain: Option<f32>,
    tiles: Vec<Tile, MAX_TILES>,
}

impl HardwareDescriptor {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Calibration gain, if the setup provides one.
    pub const fn gain(&self) -> Option<f32> {
        self.gain
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Total number of LEDs over all tiles, i.e. the chain length.
    pub fn led_count(&self) -> usize {
        self.tiles.iter().map(Tile::led_count).sum()
    }
}

/// Parsed LED setup.
#[derive(Debug, Clone)]
pub struct Setup {
    hardware: Vec<HardwareDescriptor, MAX_HARDWARE>,
}

impl Setup {
    /// Parse a setup description.
    ///
    /// ```json
    /// { "hardware": [ { "id": "panel", "gain": 0.8,
    ///     "tiles": [ { "x": 0, "y": 0, "width": 8, "height": 8,
    ///                  "rotation": 90, "wiring": "serpentine" } ] } ] }
    /// ```
    pub fn load(source: &[u8]) -> Result<Self, Error> {
        let (document, _) = serde_json_core::from_slice::<SetupDocument>(source)
            .map_err(|e| Error::Parse(ParseError::Syntax(e)))?;

        if document.hardware.is_empty() {
            return Err(Error::Empty);
        }

        let mut hardware = Vec::new();
        for (unit, entry) in document.hardware.into_iter().enumerate() {
            if entry.tiles.is_empty() {
                return Err(ParseError::NoTiles { unit }.into());
            }
            let mut tiles = Vec::new();
            for (index, tile) in entry.tiles.iter().enumerate() {
                // Capacities of document and descriptor are identical
                let _ = tiles.push(tile.to_tile(unit, index)?);
            }
            let _ = hardware.push(HardwareDescriptor {
                id: entry.id,
                gain: entry.gain,
                tiles,
            });
        }

        Ok(Self { hardware })
    }

    /// Hardware units in setup order.
    pub fn hardware(&self) -> &[HardwareDescriptor] {
        &self.hardware
    }

    /// Smallest frame that contains every tile.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn bounds(&self) -> Dimensions {
        let mut right = 0;
        let mut bottom = 0;
        for tile in self.hardware.iter().flat_map(|hw| hw.tiles.iter()) {
            right = right.max(tile.right());
            bottom = bottom.max(tile.bottom());
        }

        Dimensions {
            width: right.clamp(0, i32::from(u16::MAX)) as u16,
            height: bottom.clamp(0, i32::from(u16::MAX)) as u16,
        }
    }

    /// Frame dimensions from host overrides.
    ///
    /// An override greater than zero wins, otherwise the setup bounds are used.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn resolve_dimensions(&self, width: i32, height: i32) -> Dimensions {
        let bounds = self.bounds();
        let resolve = |value: i32, fallback: u16| {
            if value > 0 {
                value.min(i32::from(u16::MAX)) as u16
            } else {
                fallback
            }
        };

        Dimensions {
            width: resolve(width, bounds.width),
            height: resolve(height, bounds.height),
        }
    }
}
