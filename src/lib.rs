#![no_std]

pub mod color;
pub mod control;
pub mod display;
pub mod engine;
pub mod error;
pub mod frame;
pub mod frame_scheduler;
pub mod gain;
pub mod hardware;
pub mod logging;
pub mod mapping;
pub mod setup;

pub use control::{ControlChannel, ControlCommand, ControlReceiver, ControlSender};
pub use display::{Display, DisplayConfig, DisplayToken, PipelineState};
pub use engine::Engine;
pub use error::{AllocationError, DeviceError, Error, ParseError};
pub use frame::{Frame, FrameToken, PixelFormat, RenderLease};
pub use frame_scheduler::{FrameResult, FrameScheduler, FrameSource};
pub use hardware::{DeviceProvider, HardwareUnit, LedDevice, SmartLedsDevice, UnitStatus};
pub use logging::{Log, LogLevel, Logger, NoopLogger};
pub use mapping::Mapping;
pub use setup::{Dimensions, HardwareDescriptor, Rotation, Setup, Tile, Wiring};

pub use color::Rgb;
pub use embassy_time::{Duration, Instant};
