#![allow(dead_code)]

use std::fmt;

use myrtio_frame_mapper::{
    DeviceError, DeviceProvider, HardwareDescriptor, LedDevice, LogLevel, Logger, Rgb,
};

pub const RED: Rgb = Rgb { r: 255, g: 0, b: 0 };
pub const GREEN: Rgb = Rgb { r: 0, g: 255, b: 0 };
pub const BLUE: Rgb = Rgb { r: 0, g: 0, b: 255 };
pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

/// Device that records every chain it receives.
#[derive(Debug, Default)]
pub struct FakeDevice {
    pub sent: Vec<Vec<Rgb>>,
    pub latches: usize,
    pub fail_send: bool,
    pub fail_latch: bool,
}

impl FakeDevice {
    pub fn last_sent(&self) -> Option<&[Rgb]> {
        self.sent.last().map(Vec::as_slice)
    }
}

impl LedDevice for FakeDevice {
    fn send_chain(&mut self, chain: &[Rgb]) -> Result<(), DeviceError> {
        if self.fail_send {
            return Err(DeviceError::Unreachable);
        }
        self.sent.push(chain.to_vec());
        Ok(())
    }

    fn latch(&mut self) -> Result<(), DeviceError> {
        if self.fail_latch {
            return Err(DeviceError::Io);
        }
        self.latches += 1;
        Ok(())
    }
}

/// Provider handing out [`FakeDevice`]s.
#[derive(Debug, Default)]
pub struct FakeProvider {
    pub unreachable: Vec<usize>,
    pub failing_send: Vec<usize>,
    pub failing_latch: Vec<usize>,
    pub connected: Vec<String>,
}

impl DeviceProvider for FakeProvider {
    type Device = FakeDevice;

    fn connect(
        &mut self,
        unit: usize,
        hardware: &HardwareDescriptor,
    ) -> Result<FakeDevice, DeviceError> {
        if self.unreachable.contains(&unit) {
            return Err(DeviceError::Unreachable);
        }
        self.connected.push(hardware.id().to_string());
        Ok(FakeDevice {
            fail_send: self.failing_send.contains(&unit),
            fail_latch: self.failing_latch.contains(&unit),
            ..FakeDevice::default()
        })
    }
}

/// Logger keeping every record.
#[derive(Debug, Default)]
pub struct RecordingLogger {
    pub records: Vec<(LogLevel, String)>,
}

impl RecordingLogger {
    pub fn contains(&self, level: LogLevel, needle: &str) -> bool {
        self.records
            .iter()
            .any(|(l, message)| *l == level && message.contains(needle))
    }
}

impl Logger for RecordingLogger {
    fn log(&mut self, level: LogLevel, args: fmt::Arguments<'_>) {
        self.records.push((level, args.to_string()));
    }
}

/// One unit with one 2x1 tile at the origin.
pub const SINGLE_TILE_SETUP: &str = r#"{
    "hardware": [
        { "id": "strip", "tiles": [ { "x": 0, "y": 0, "width": 2, "height": 1 } ] }
    ]
}"#;
