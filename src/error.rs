//! Error types of the frame mapping pipeline.

use core::fmt;

use crate::display::PipelineState;
use crate::frame::PixelFormat;

/// Failure reported by an LED device while sending or latching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceError {
    /// Device is not connected or did not answer.
    Unreachable,
    /// Device refused the data (e.g. wrong chain length).
    Rejected,
    /// Low-level bus write failed.
    Io,
}

/// Malformed setup description.
#[derive(Debug)]
pub enum ParseError {
    /// Input is not a valid setup document.
    Syntax(serde_json_core::de::Error),
    /// Unit without any tile.
    NoTiles { unit: usize },
    /// Tile with zero width or height.
    EmptyTile { unit: usize, tile: usize },
    /// Rotation is not one of 0, 90, 180 or 270 degrees.
    InvalidRotation { unit: usize, tile: usize, degrees: u16 },
    /// Unknown wiring order.
    UnknownWiring { unit: usize, tile: usize },
}

/// Buffer sizing failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationError {
    /// Width or height is zero.
    ZeroDimension,
    /// Only 8-bit RGB frames can be allocated.
    UnsupportedFormat(PixelFormat),
    /// Frame does not fit into the pixel capacity.
    FrameTooLarge { pixels: usize, capacity: usize },
    /// Unit chain does not fit into the LED capacity.
    ChainTooLong { unit: usize, leds: usize, capacity: usize },
}

/// Pipeline error.
#[derive(Debug)]
pub enum Error {
    /// Malformed configuration.
    Parse(ParseError),
    /// No usable hardware found.
    Empty,
    /// Frame or chain sizing failed.
    Allocation(AllocationError),
    /// No valid mapping could be built for a unit.
    Mapping { unit: usize },
    /// No unit has a single LED inside the frame.
    NothingMapped,
    /// Invalid calibration value, neutral gain is used instead.
    Gain { unit: usize },
    /// Sending the chain to the device failed.
    Transmit { unit: usize, source: DeviceError },
    /// Latching the device failed.
    Latch { unit: usize, source: DeviceError },
    /// Token does not belong to the latest published frame.
    StaleFrame,
    /// Operation is not allowed in the current pipeline state.
    InvalidState(PipelineState),
}

impl Error {
    /// Check if the error stops the pipeline from streaming.
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Parse(_) | Self::Empty | Self::Allocation(_) | Self::NothingMapped
        )
    }
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::Unreachable => write!(f, "device unreachable"),
            DeviceError::Rejected => write!(f, "device rejected data"),
            DeviceError::Io => write!(f, "device I/O error"),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Syntax(e) => write!(f, "invalid setup: {:?}", e),
            ParseError::NoTiles { unit } => write!(f, "hardware #{} has no tiles", unit),
            ParseError::EmptyTile { unit, tile } => {
                write!(f, "tile #{} of hardware #{} has zero extent", tile, unit)
            }
            ParseError::InvalidRotation {
                unit,
                tile,
                degrees,
            } => write!(
                f,
                "tile #{} of hardware #{} has invalid rotation {}",
                tile, unit, degrees
            ),
            ParseError::UnknownWiring { unit, tile } => {
                write!(f, "tile #{} of hardware #{} has unknown wiring", tile, unit)
            }
        }
    }
}

impl fmt::Display for AllocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocationError::ZeroDimension => write!(f, "frame dimension is zero"),
            AllocationError::UnsupportedFormat(format) => {
                write!(f, "unsupported pixel format \"{}\"", format.as_str())
            }
            AllocationError::FrameTooLarge { pixels, capacity } => write!(
                f,
                "frame of {} pixels exceeds capacity of {}",
                pixels, capacity
            ),
            AllocationError::ChainTooLong {
                unit,
                leds,
                capacity,
            } => write!(
                f,
                "chain of hardware #{} has {} LEDs, capacity is {}",
                unit, leds, capacity
            ),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Parse(e) => write!(f, "parse error: {}", e),
            Error::Empty => write!(f, "no LED hardware found"),
            Error::Allocation(e) => write!(f, "allocation error: {}", e),
            Error::Mapping { unit } => write!(f, "no pixel maps to hardware #{}", unit),
            Error::NothingMapped => write!(f, "no LED maps into the frame"),
            Error::Gain { unit } => write!(f, "invalid gain for hardware #{}", unit),
            Error::Transmit { unit, source } => {
                write!(f, "failed to send chain of hardware #{}: {}", unit, source)
            }
            Error::Latch { unit, source } => {
                write!(f, "failed to latch hardware #{}: {}", unit, source)
            }
            Error::StaleFrame => write!(f, "frame token is stale"),
            Error::InvalidState(state) => {
                write!(f, "operation not allowed in state {}", state.as_str())
            }
        }
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Error::Parse(e)
    }
}

impl From<AllocationError> for Error {
    fn from(e: AllocationError) -> Self {
        Error::Allocation(e)
    }
}
