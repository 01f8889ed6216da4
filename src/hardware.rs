//! Hardware units and device seams.

use heapless::Vec;
use smart_leds::SmartLedsWrite;

use crate::color::{BLACK, Rgb};
use crate::error::{AllocationError, DeviceError, Error};
use crate::gain::GainTable;
use crate::mapping::Mapping;
use crate::setup::HardwareDescriptor;

/// Abstract LED device.
///
/// Implement this trait to drive one physical controller. Both calls may
/// block on I/O.
pub trait LedDevice {
    /// Send the chain values to the device.
    fn send_chain(&mut self, chain: &[Rgb]) -> Result<(), DeviceError>;

    /// Make the last sent chain visible.
    fn latch(&mut self) -> Result<(), DeviceError>;
}

/// Opens the device behind each hardware unit of a setup.
pub trait DeviceProvider {
    type Device: LedDevice;

    /// Open the device for the unit at position `unit`.
    fn connect(
        &mut self,
        unit: usize,
        hardware: &HardwareDescriptor,
    ) -> Result<Self::Device, DeviceError>;
}

/// [`LedDevice`] on top of a `smart-leds` writer.
///
/// Clockless strips show the data as soon as the write finishes, so latching
/// is a no-op.
#[derive(Debug)]
pub struct SmartLedsDevice<W> {
    writer: W,
}

impl<W> SmartLedsDevice<W> {
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W> LedDevice for SmartLedsDevice<W>
where
    W: SmartLedsWrite,
    W::Color: From<Rgb>,
{
    fn send_chain(&mut self, chain: &[Rgb]) -> Result<(), DeviceError> {
        self.writer
            .write(chain.iter().copied())
            .map_err(|_| DeviceError::Io)
    }

    fn latch(&mut self) -> Result<(), DeviceError> {
        Ok(())
    }
}

/// Send buffer of one hardware unit.
#[derive(Debug, Clone)]
pub struct Chain<const MAX_LEDS: usize> {
    leds: Vec<Rgb, MAX_LEDS>,
}

impl<const MAX_LEDS: usize> Chain<MAX_LEDS> {
    /// Create a black chain of `len` slots.
    pub fn with_len(unit: usize, len: usize) -> Result<Self, AllocationError> {
        let mut leds = Vec::new();
        leds.resize(len, BLACK)
            .map_err(|()| AllocationError::ChainTooLong {
                unit,
                leds: len,
                capacity: MAX_LEDS,
            })?;
        Ok(Self { leds })
    }

    pub fn len(&self) -> usize {
        self.leds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leds.is_empty()
    }

    pub fn as_slice(&self) -> &[Rgb] {
        &self.leds
    }

    pub fn get(&self, slot: usize) -> Option<Rgb> {
        self.leds.get(slot).copied()
    }

    pub(crate) fn set(&mut self, slot: usize, color: Rgb) {
        if let Some(led) = self.leds.get_mut(slot) {
            *led = color;
        }
    }

    /// Reset every slot to black.
    pub fn clear(&mut self) {
        self.leds.iter_mut().for_each(|led| *led = BLACK);
    }
}

/// Whether a unit takes part in the frame cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitStatus {
    /// Mapped and connected.
    Active,
    /// Device could not be opened, excluded for the session.
    Disconnected,
    /// No LED maps into the frame, excluded until the next remap.
    Unmapped,
}

/// Runtime state of one hardware unit.
#[derive(Debug)]
pub struct HardwareUnit<D, const MAX_LEDS: usize> {
    pub(crate) index: usize,
    pub(crate) device: Option<D>,
    pub(crate) chain: Chain<MAX_LEDS>,
    pub(crate) mapping: Option<Mapping<MAX_LEDS>>,
    pub(crate) gain: GainTable,
    pub(crate) gain_override: Option<f32>,
    pub(crate) status: UnitStatus,
    pub(crate) last_error: Option<Error>,
}

impl<D, const MAX_LEDS: usize> HardwareUnit<D, MAX_LEDS> {
    /// Position of the unit in the setup.
    pub const fn index(&self) -> usize {
        self.index
    }

    pub const fn status(&self) -> UnitStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == UnitStatus::Active
    }

    pub fn chain(&self) -> &[Rgb] {
        self.chain.as_slice()
    }

    pub const fn mapping(&self) -> Option<&Mapping<MAX_LEDS>> {
        self.mapping.as_ref()
    }

    /// Gain currently applied to the chain.
    pub const fn gain(&self) -> f32 {
        self.gain.gain()
    }

    /// Most recent per-unit failure.
    pub const fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    pub const fn device(&self) -> Option<&D> {
        self.device.as_ref()
    }

    pub fn device_mut(&mut self) -> Option<&mut D> {
        self.device.as_mut()
    }
}
