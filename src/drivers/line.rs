//! Owned line handles over the [`gpio`](super::gpio) provider.
//!
//! Constructing a handle configures the line's direction; the handle then
//! speaks the `embedded-hal` digital traits so the controller does not care
//! whether it is driving provider lines or a HAL's pin drivers.

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

use super::gpio::{self, Direction, LineError};

/// A line configured as a digital input.
#[derive(Debug)]
pub struct InputLine {
    pin: i32,
}

impl InputLine {
    pub fn new(pin: i32) -> Result<Self, LineError> {
        gpio::configure(pin, Direction::Input)?;
        Ok(Self { pin })
    }

    pub fn pin(&self) -> i32 {
        self.pin
    }
}

impl ErrorType for InputLine {
    type Error = LineError;
}

impl InputPin for InputLine {
    fn is_high(&mut self) -> Result<bool, LineError> {
        gpio::read(self.pin)
    }

    fn is_low(&mut self) -> Result<bool, LineError> {
        gpio::read(self.pin).map(|high| !high)
    }
}

/// A line configured as a push-pull output, released (LOW) on creation.
#[derive(Debug)]
pub struct OutputLine {
    pin: i32,
}

impl OutputLine {
    pub fn new(pin: i32) -> Result<Self, LineError> {
        gpio::configure(pin, Direction::Output)?;
        Ok(Self { pin })
    }

    pub fn pin(&self) -> i32 {
        self.pin
    }
}

impl ErrorType for OutputLine {
    type Error = LineError;
}

impl OutputPin for OutputLine {
    fn set_high(&mut self) -> Result<(), LineError> {
        gpio::write(self.pin, true)
    }

    fn set_low(&mut self) -> Result<(), LineError> {
        gpio::write(self.pin, false)
    }
}
