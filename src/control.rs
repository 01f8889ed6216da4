//! Control commands.
//!
//! Hosts change the running pipeline through commands. They can be applied
//! directly with [`Display::control`](crate::Display::control) or queued from
//! another context through a [`ControlChannel`], which the display drains at
//! the next frame boundary. The channel is a `heapless::Deque` behind a
//! `critical-section` mutex, so it is safe to share between threads and
//! interrupt handlers.

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::Deque;

use crate::logging::LogLevel;

/// Runtime change requested by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlCommand {
    /// Change the frame size; values `<= 0` derive from the setup bounds.
    Resize { width: i32, height: i32 },
    /// Override the gain of one hardware unit.
    SetGain { unit: usize, gain: f32 },
    /// Change the log verbosity.
    SetVerbosity(LogLevel),
}

/// Error returned when the channel is full, carrying the rejected command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrySendError(pub ControlCommand);

/// Bounded queue of control commands.
pub struct ControlChannel<const SIZE: usize> {
    queue: Mutex<RefCell<Deque<ControlCommand, SIZE>>>,
}

impl<const SIZE: usize> ControlChannel<SIZE> {
    pub const fn new() -> Self {
        Self {
            queue: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    pub const fn sender(&self) -> ControlSender<'_, SIZE> {
        ControlSender { channel: self }
    }

    pub const fn receiver(&self) -> ControlReceiver<'_, SIZE> {
        ControlReceiver { channel: self }
    }

    /// Queue a command, fails if `SIZE` commands are already waiting.
    pub fn try_send(&self, command: ControlCommand) -> Result<(), TrySendError> {
        critical_section::with(|cs| {
            self.queue
                .borrow(cs)
                .borrow_mut()
                .push_back(command)
                .map_err(TrySendError)
        })
    }

    /// Take the oldest queued command.
    pub fn try_receive(&self) -> Option<ControlCommand> {
        critical_section::with(|cs| self.queue.borrow(cs).borrow_mut().pop_front())
    }

    /// Number of queued commands.
    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.queue.borrow(cs).borrow().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<const SIZE: usize> Default for ControlChannel<SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

/// Sending half of a [`ControlChannel`].
#[derive(Clone, Copy)]
pub struct ControlSender<'a, const SIZE: usize> {
    channel: &'a ControlChannel<SIZE>,
}

impl<const SIZE: usize> ControlSender<'_, SIZE> {
    pub fn try_send(&self, command: ControlCommand) -> Result<(), TrySendError> {
        self.channel.try_send(command)
    }
}

/// Receiving half of a [`ControlChannel`].
#[derive(Clone, Copy)]
pub struct ControlReceiver<'a, const SIZE: usize> {
    channel: &'a ControlChannel<SIZE>,
}

impl<const SIZE: usize> ControlReceiver<'_, SIZE> {
    pub fn try_receive(&self) -> Option<ControlCommand> {
        self.channel.try_receive()
    }
}
