//! Unified error types for the ATX controller.
//!
//! A single `Error` enum that every subsystem converts into, so callers
//! (console, transport adapters) handle failures uniformly.  All variants
//! are `Copy` so they can be handed across tasks without allocation.

use core::fmt;

use embedded_hal::digital::ErrorKind;

use crate::region::RegionIsBusy;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A pulse is already in progress on the named region.
    Busy(&'static str),
    /// A GPIO line read or write failed.
    Gpio(GpioError),
    /// Configuration is invalid.
    Config(&'static str),
}

impl Error {
    /// `true` for the fail-fast rejection of an overlapping click.
    pub const fn is_busy(&self) -> bool {
        matches!(self, Self::Busy(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busy(region) => write!(f, "{region} busy"),
            Self::Gpio(e) => write!(f, "gpio: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

impl From<RegionIsBusy> for Error {
    fn from(e: RegionIsBusy) -> Self {
        Self::Busy(e.region)
    }
}

// ---------------------------------------------------------------------------
// GPIO errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioError {
    /// Reading an input line failed.
    ReadFailed(ErrorKind),
    /// Driving an output line failed.
    WriteFailed(ErrorKind),
    /// The given line could not be configured for the requested direction.
    ConfigFailed(i32),
}

impl GpioError {
    pub(crate) fn read<E: embedded_hal::digital::Error>(e: &E) -> Self {
        Self::ReadFailed(e.kind())
    }

    pub(crate) fn write<E: embedded_hal::digital::Error>(e: &E) -> Self {
        Self::WriteFailed(e.kind())
    }
}

impl fmt::Display for GpioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFailed(kind) => write!(f, "line read failed ({kind:?})"),
            Self::WriteFailed(kind) => write!(f, "line write failed ({kind:?})"),
            Self::ConfigFailed(line) => write!(f, "line {line} config failed"),
        }
    }
}

impl From<GpioError> for Error {
    fn from(e: GpioError) -> Self {
        Self::Gpio(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
