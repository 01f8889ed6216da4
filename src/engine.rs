//! Mapping engine.
//!
//! Owns the runtime hardware units and moves pixels from the frame into their
//! chains. Mapping and gain tables are rebuilt only on refresh; the per-frame
//! path is `fill_from_frame` → `transmit` → `show`. Per-unit failures are
//! logged and stored on the unit, they never stop the other units.

use heapless::Vec;

use crate::color::Rgb;
use crate::error::{DeviceError, Error};
use crate::frame::Frame;
use crate::gain::{GainTable, NEUTRAL_GAIN};
use crate::hardware::{Chain, DeviceProvider, HardwareUnit, LedDevice, UnitStatus};
use crate::logging::{Log, Logger};
use crate::mapping::Mapping;
use crate::setup::{HardwareDescriptor, MAX_HARDWARE, Setup};

/// Frame to hardware mapping engine.
#[derive(Debug)]
pub struct Engine<D, const MAX_LEDS: usize> {
    units: Vec<HardwareUnit<D, MAX_LEDS>, MAX_HARDWARE>,
}

impl<D: LedDevice, const MAX_LEDS: usize> Engine<D, MAX_LEDS> {
    /// Create the runtime units of a setup and open their devices.
    ///
    /// Units whose device cannot be opened are kept but excluded. Fails if no
    /// device could be opened or a chain exceeds `MAX_LEDS`.
    pub fn connect<P, L>(setup: &Setup, provider: &mut P, log: &mut Log<L>) -> Result<Self, Error>
    where
        P: DeviceProvider<Device = D>,
        L: Logger,
    {
        let mut units = Vec::new();
        for (index, hardware) in setup.hardware().iter().enumerate() {
            let chain = Chain::with_len(index, hardware.led_count())?;
            let (device, status, last_error) = match provider.connect(index, hardware) {
                Ok(device) => (Some(device), UnitStatus::Unmapped, None),
                Err(source) => {
                    log.error(format_args!(
                        "failed to open hardware \"{}\": {}",
                        hardware.id(),
                        source
                    ));
                    let error = Error::Transmit {
                        unit: index,
                        source,
                    };
                    (None, UnitStatus::Disconnected, Some(error))
                }
            };
            // Setup and engine share the same unit capacity
            let _ = units.push(HardwareUnit {
                index,
                device,
                chain,
                mapping: None,
                gain: GainTable::neutral(),
                gain_override: None,
                status,
                last_error,
            });
        }

        if units.iter().all(|unit| unit.device.is_none()) {
            log.warn(format_args!("no LED hardware could be opened"));
            return Err(Error::Empty);
        }

        Ok(Self { units })
    }

    pub fn units(&self) -> &[HardwareUnit<D, MAX_LEDS>] {
        &self.units
    }

    pub fn unit(&self, index: usize) -> Option<&HardwareUnit<D, MAX_LEDS>> {
        self.units.get(index)
    }

    pub fn unit_mut(&mut self, index: usize) -> Option<&mut HardwareUnit<D, MAX_LEDS>> {
        self.units.get_mut(index)
    }

    /// Number of units taking part in the frame cycle.
    pub fn active_units(&self) -> usize {
        self.units.iter().filter(|unit| unit.is_active()).count()
    }

    /// Rebuild the pixel mapping of every unit for `frame`.
    ///
    /// Units without a single LED inside the frame are excluded. Returns
    /// `true` if at least one unit is mapped.
    pub fn refresh_mapping<L: Logger, const MAX_PIXELS: usize>(
        &mut self,
        setup: &Setup,
        frame: &Frame<MAX_PIXELS>,
        log: &mut Log<L>,
    ) -> bool {
        let dimensions = frame.dimensions();
        for (unit, hardware) in self.units.iter_mut().zip(setup.hardware()) {
            if unit.device.is_none() {
                continue;
            }
            unit.chain.clear();

            let mapping = match Mapping::build(unit.index, hardware, dimensions) {
                Ok(mapping) => mapping,
                Err(e) => {
                    log.error(format_args!("hardware \"{}\": {}", hardware.id(), e));
                    unit.mapping = None;
                    unit.status = UnitStatus::Unmapped;
                    unit.last_error = Some(Error::Allocation(e));
                    continue;
                }
            };

            if mapping.mapped() == 0 {
                log.warn(format_args!(
                    "hardware \"{}\" has no LED inside the {}x{} frame",
                    hardware.id(),
                    dimensions.width,
                    dimensions.height
                ));
                unit.mapping = None;
                unit.status = UnitStatus::Unmapped;
                unit.last_error = Some(Error::Mapping { unit: unit.index });
                continue;
            }

            log.debug(format_args!(
                "hardware \"{}\": {} of {} LEDs mapped",
                hardware.id(),
                mapping.mapped(),
                mapping.len()
            ));
            unit.mapping = Some(mapping);
            unit.status = UnitStatus::Active;
        }

        self.active_units() > 0
    }

    /// Rebuild the gain table of every unit.
    ///
    /// Invalid gains fall back to neutral. Returns `true` if every gain was
    /// valid.
    pub fn refresh_gain<L: Logger>(&mut self, setup: &Setup, log: &mut Log<L>) -> bool {
        let mut all_valid = true;
        for (unit, hardware) in self.units.iter_mut().zip(setup.hardware()) {
            all_valid &= Self::apply_gain(unit, hardware, log);
        }
        all_valid
    }

    /// Override the gain of one unit.
    ///
    /// Returns `false` if the unit does not exist or the gain was rejected.
    pub fn set_gain<L: Logger>(
        &mut self,
        setup: &Setup,
        index: usize,
        gain: f32,
        log: &mut Log<L>,
    ) -> bool {
        let (Some(unit), Some(hardware)) = (self.units.get_mut(index), setup.hardware().get(index))
        else {
            log.warn(format_args!("no hardware #{} to set gain on", index));
            return false;
        };
        unit.gain_override = Some(gain);
        Self::apply_gain(unit, hardware, log)
    }

    fn apply_gain<L: Logger>(
        unit: &mut HardwareUnit<D, MAX_LEDS>,
        hardware: &HardwareDescriptor,
        log: &mut Log<L>,
    ) -> bool {
        let gain = unit
            .gain_override
            .or(hardware.gain())
            .unwrap_or(NEUTRAL_GAIN);
        if let Some(table) = GainTable::new(gain) {
            unit.gain = table;
            return true;
        }

        log.warn(format_args!(
            "hardware \"{}\" has invalid gain {}, using {}",
            hardware.id(),
            gain,
            NEUTRAL_GAIN
        ));
        unit.gain = GainTable::neutral();
        unit.last_error = Some(Error::Gain { unit: unit.index });
        false
    }

    /// Copy mapped pixels of `frame` into the chains.
    ///
    /// A unit whose mapping was built for another frame size is excluded from
    /// the cycle until the next mapping refresh. Returns the number of filled
    /// units.
    pub fn fill_from_frame<L: Logger, const MAX_PIXELS: usize>(
        &mut self,
        frame: &Frame<MAX_PIXELS>,
        log: &mut Log<L>,
    ) -> usize {
        let pixels = frame.pixels();
        let mut filled = 0;
        for unit in self.units.iter_mut().filter(|unit| unit.is_active()) {
            let Some(mapping) = unit
                .mapping
                .as_ref()
                .filter(|mapping| mapping.frame() == frame.dimensions())
            else {
                log.error(format_args!(
                    "mapping of hardware #{} does not match the frame",
                    unit.index
                ));
                unit.status = UnitStatus::Unmapped;
                unit.last_error = Some(Error::Mapping { unit: unit.index });
                continue;
            };

            for (slot, pixel) in mapping.entries() {
                if let Some(&color) = pixels.get(pixel) {
                    unit.chain.set(slot, unit.gain.apply(color));
                }
            }
            filled += 1;
        }
        filled
    }

    /// Send every chain to its device.
    ///
    /// Returns the number of units that accepted their chain.
    pub fn transmit<L: Logger>(&mut self, log: &mut Log<L>) -> usize {
        self.for_each_device(log, |device, chain| device.send_chain(chain), |unit, source| {
            Error::Transmit { unit, source }
        })
    }

    /// Latch every device, including those whose transmit failed.
    ///
    /// Returns the number of latched units.
    pub fn show<L: Logger>(&mut self, log: &mut Log<L>) -> usize {
        self.for_each_device(log, |device, _| device.latch(), |unit, source| {
            Error::Latch { unit, source }
        })
    }

    fn for_each_device<L, F, E>(&mut self, log: &mut Log<L>, mut op: F, error: E) -> usize
    where
        L: Logger,
        F: FnMut(&mut D, &[Rgb]) -> Result<(), DeviceError>,
        E: Fn(usize, DeviceError) -> Error,
    {
        let mut succeeded = 0;
        for unit in self.units.iter_mut().filter(|unit| unit.status == UnitStatus::Active) {
            let Some(device) = unit.device.as_mut() else {
                continue;
            };
            match op(device, unit.chain.as_slice()) {
                Ok(()) => succeeded += 1,
                Err(source) => {
                    let e = error(unit.index, source);
                    log.error(format_args!("{}", e));
                    unit.last_error = Some(e);
                }
            }
        }
        succeeded
    }
}
