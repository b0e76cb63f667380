//! GPIO line provider.
//!
//! Configures line directions and reads/writes levels by line number.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: raw `gpio_config` / `gpio_get_level` / `gpio_set_level`.
//! On host/test: a simulated line table.  Inputs idle HIGH (pull-up),
//! outputs start LOW, and [`sim_drive_input`] stands in for the outside
//! world pulling an input line.

use core::fmt;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

// ── Error type ────────────────────────────────────────────────

/// Failures reported by the line provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineError {
    /// The line number does not exist on this chip.
    InvalidLine(i32),
    /// The line has not been configured, or not for this direction.
    WrongDirection(i32),
    /// ESP-IDF returned a non-OK status code.
    Esp(i32),
}

impl fmt::Display for LineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLine(pin) => write!(f, "no such line {}", pin),
            Self::WrongDirection(pin) => write!(f, "line {} not configured for this access", pin),
            Self::Esp(rc) => write!(f, "esp-idf error (rc={})", rc),
        }
    }
}

impl embedded_hal::digital::Error for LineError {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        embedded_hal::digital::ErrorKind::Other
    }
}

/// Bit selecting `pin` in a `gpio_config_t` mask.  Lines outside the
/// 64-bit mask do not exist.
fn line_mask(pin: i32) -> Result<u64, LineError> {
    u32::try_from(pin)
        .ok()
        .and_then(|bit| 1u64.checked_shl(bit))
        .ok_or(LineError::InvalidLine(pin))
}

// ── ESP-IDF backend ───────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub fn configure(pin: i32, direction: Direction) -> Result<(), LineError> {
    let (mode, pull_up) = match direction {
        Direction::Input => (gpio_mode_t_GPIO_MODE_INPUT, gpio_pullup_t_GPIO_PULLUP_ENABLE),
        Direction::Output => (gpio_mode_t_GPIO_MODE_OUTPUT, gpio_pullup_t_GPIO_PULLUP_DISABLE),
    };
    let cfg = gpio_config_t {
        pin_bit_mask: line_mask(pin)?,
        mode,
        pull_up_en: pull_up,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    // SAFETY: gpio_config only touches the pin named in the bit mask.
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 {
        return Err(LineError::Esp(ret));
    }
    if direction == Direction::Output {
        write(pin, false)?;
    }
    log::info!("gpio: line {} configured as {:?}", pin, direction);
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn read(pin: i32) -> Result<bool, LineError> {
    // SAFETY: gpio_get_level is a read-only register access on an
    // already-configured input pin.
    Ok((unsafe { gpio_get_level(pin) }) != 0)
}

#[cfg(target_os = "espidf")]
pub fn write(pin: i32, high: bool) -> Result<(), LineError> {
    // SAFETY: gpio_set_level writes to an already-configured output pin.
    let ret = unsafe { gpio_set_level(pin, u32::from(high)) };
    if ret != ESP_OK as i32 {
        return Err(LineError::Esp(ret));
    }
    Ok(())
}

// ── Host simulation backend ───────────────────────────────────

#[cfg(not(target_os = "espidf"))]
mod sim {
    use core::cell::RefCell;

    use embassy_sync::blocking_mutex::Mutex;
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

    use super::{Direction, LineError, line_mask};

    /// Number of simulated lines, one per bit of the config mask.
    pub const LINE_COUNT: usize = u64::BITS as usize;

    #[derive(Clone, Copy)]
    struct SimLine {
        direction: Option<Direction>,
        level: bool,
    }

    static LINES: Mutex<CriticalSectionRawMutex, RefCell<[SimLine; LINE_COUNT]>> =
        Mutex::new(RefCell::new(
            [SimLine {
                direction: None,
                level: false,
            }; LINE_COUNT],
        ));

    fn with_line<R>(
        pin: i32,
        f: impl FnOnce(&mut SimLine) -> Result<R, LineError>,
    ) -> Result<R, LineError> {
        let idx = line_mask(pin)?.trailing_zeros() as usize;
        LINES.lock(|lines| f(&mut lines.borrow_mut()[idx]))
    }

    pub fn configure(pin: i32, direction: Direction) -> Result<(), LineError> {
        with_line(pin, |line| {
            line.direction = Some(direction);
            // Pull-up on inputs, outputs released.
            line.level = direction == Direction::Input;
            Ok(())
        })?;
        log::info!("gpio(sim): line {} configured as {:?}", pin, direction);
        Ok(())
    }

    pub fn read(pin: i32) -> Result<bool, LineError> {
        with_line(pin, |line| match line.direction {
            Some(_) => Ok(line.level),
            None => Err(LineError::WrongDirection(pin)),
        })
    }

    pub fn write(pin: i32, high: bool) -> Result<(), LineError> {
        with_line(pin, |line| match line.direction {
            Some(Direction::Output) => {
                line.level = high;
                Ok(())
            }
            _ => Err(LineError::WrongDirection(pin)),
        })
    }

    pub fn drive_input(pin: i32, high: bool) -> Result<(), LineError> {
        with_line(pin, |line| match line.direction {
            Some(Direction::Input) => {
                line.level = high;
                Ok(())
            }
            _ => Err(LineError::WrongDirection(pin)),
        })
    }
}

#[cfg(not(target_os = "espidf"))]
pub use sim::{LINE_COUNT as SIM_LINE_COUNT, configure, read, write};

/// Simulate external hardware pulling an input line (host only).
#[cfg(not(target_os = "espidf"))]
pub fn sim_drive_input(pin: i32, high: bool) -> Result<(), LineError> {
    sim::drive_input(pin, high)
}
