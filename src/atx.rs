//! ATX front-panel controller.
//!
//! Owns the two LED sense inputs and the two switch outputs of one machine
//! and turns "press the button" into a timed pulse on the matching output.
//!
//! ```text
//!   click_*() ──▶ region.enter() ──busy──▶ Err(Error::Busy)
//!                      │
//!                      ok
//!                      ▼
//!            switch HIGH ─ hold ─ switch LOW ─ release
//! ```
//!
//! ## Safety contract
//!
//! Only one pulse runs at a time, across every switch.  A second click while
//! one is in progress is rejected, never queued.  A pulse that is abandoned
//! half-way (future dropped, pin error) still drives its switch LOW before
//! the region is released.
//!
//! LED inputs are active-low: a lit LED pulls its sense line LOW.

use core::cell::RefCell;
use core::fmt;
use core::str::FromStr;
use core::time::Duration;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embedded_hal::digital::{InputPin, OutputPin};
use log::{debug, info, warn};
use serde::Serialize;

use crate::config::{self, AtxConfig};
use crate::drivers::line::{InputLine, OutputLine};
use crate::error::{Error, GpioError, Result};
use crate::region::ExclusiveRegion;

/// Name the busy error reports, e.g. "ATX controller busy".
pub const REGION_NAME: &str = "ATX controller";

// ───────────────────────────────────────────────────────────────
// State snapshot
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Leds {
    pub power: bool,
    pub hdd: bool,
}

/// Point-in-time view of the controller, serialised as
/// `{"busy": .., "leds": {"power": .., "hdd": ..}}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AtxState {
    pub busy: bool,
    pub leds: Leds,
}

// ───────────────────────────────────────────────────────────────
// Buttons and pulse timing
// ───────────────────────────────────────────────────────────────

/// The three front-panel actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtxButton {
    Power,
    PowerLong,
    Reset,
}

impl AtxButton {
    pub const ALL: [Self; 3] = [Self::Power, Self::PowerLong, Self::Reset];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Power => "power",
            Self::PowerLong => "power_long",
            Self::Reset => "reset",
        }
    }
}

impl fmt::Display for AtxButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AtxButton {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|b| b.as_str() == s)
            .ok_or(Error::Config("unknown button"))
    }
}

/// How long each kind of click holds its switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseDelays {
    pub short: Duration,
    pub long: Duration,
}

impl PulseDelays {
    /// Build from seconds.  Zero, negative, non-finite and overflowing holds
    /// are rejected.
    pub fn from_secs(short: f32, long: f32) -> Result<Self> {
        match (config::delay_from_secs(short), config::delay_from_secs(long)) {
            (Some(short), Some(long)) => Ok(Self { short, long }),
            _ => Err(Error::Config("pulse delays must be positive and finite")),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Controller
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Switch {
    Power,
    Reset,
}

struct Lines<I, O> {
    power_led: I,
    hdd_led: I,
    power_switch: O,
    reset_switch: O,
}

impl<I, O: OutputPin> Lines<I, O> {
    fn drive(&mut self, switch: Switch, high: bool) -> Result<()> {
        let line = match switch {
            Switch::Power => &mut self.power_switch,
            Switch::Reset => &mut self.reset_switch,
        };
        let res = if high { line.set_high() } else { line.set_low() };
        res.map_err(|e| GpioError::write(&e).into())
    }
}

/// Pin handles are only ever touched for a single access at a time, never
/// across an await.
type SharedLines<I, O> = Mutex<CriticalSectionRawMutex, RefCell<Lines<I, O>>>;

pub struct AtxController<I, O> {
    lines: SharedLines<I, O>,
    delays: PulseDelays,
    region: ExclusiveRegion<Error>,
}

impl AtxController<InputLine, OutputLine> {
    /// Configure the four lines named in `config` and build a controller.
    pub fn from_config(config: &AtxConfig) -> Result<Self> {
        config.validate()?;

        let input = |pin| InputLine::new(pin).map_err(|_| GpioError::ConfigFailed(pin));
        let output = |pin| OutputLine::new(pin).map_err(|_| GpioError::ConfigFailed(pin));

        let controller = Self::new(
            input(config.power_led_pin)?,
            input(config.hdd_led_pin)?,
            output(config.power_switch_pin)?,
            output(config.reset_switch_pin)?,
            PulseDelays::from_secs(config.click_delay_secs, config.long_click_delay_secs)?,
        )?;
        info!(
            "ATX: power_led={} hdd_led={} power_switch={} reset_switch={}",
            config.power_led_pin,
            config.hdd_led_pin,
            config.power_switch_pin,
            config.reset_switch_pin
        );
        Ok(controller)
    }
}

impl<I: InputPin, O: OutputPin> AtxController<I, O> {
    /// Take ownership of the lines.  Both switches are driven LOW first so
    /// the controller never starts with a button held.
    pub fn new(
        power_led: I,
        hdd_led: I,
        power_switch: O,
        reset_switch: O,
        delays: PulseDelays,
    ) -> Result<Self> {
        let mut lines = Lines {
            power_led,
            hdd_led,
            power_switch,
            reset_switch,
        };
        lines.drive(Switch::Power, false)?;
        lines.drive(Switch::Reset, false)?;

        Ok(Self {
            lines: Mutex::new(RefCell::new(lines)),
            delays,
            region: ExclusiveRegion::new(REGION_NAME),
        })
    }

    pub fn delays(&self) -> PulseDelays {
        self.delays
    }

    pub fn is_busy(&self) -> bool {
        self.region.is_busy()
    }

    /// Busy flag and LED levels.  Never waits on a pulse in progress.
    pub fn get_state(&self) -> Result<AtxState> {
        let busy = self.region.is_busy();
        let (power, hdd) = self.lines.lock(|lines| {
            let mut lines = lines.borrow_mut();
            let power = lines.power_led.is_low().map_err(|e| GpioError::read(&e))?;
            let hdd = lines.hdd_led.is_low().map_err(|e| GpioError::read(&e))?;
            Ok::<_, Error>((power, hdd))
        })?;
        Ok(AtxState {
            busy,
            leds: Leds { power, hdd },
        })
    }

    pub async fn click_power(&self) -> Result<()> {
        self.pulse(Switch::Power, self.delays.short).await?;
        info!("Clicked power");
        Ok(())
    }

    pub async fn click_power_long(&self) -> Result<()> {
        self.pulse(Switch::Power, self.delays.long).await?;
        info!("Clicked power (long press)");
        Ok(())
    }

    pub async fn click_reset(&self) -> Result<()> {
        self.pulse(Switch::Reset, self.delays.short).await?;
        info!("Clicked reset");
        Ok(())
    }

    pub async fn click(&self, button: AtxButton) -> Result<()> {
        match button {
            AtxButton::Power => self.click_power().await,
            AtxButton::PowerLong => self.click_power_long().await,
            AtxButton::Reset => self.click_reset().await,
        }
    }

    async fn pulse(&self, switch: Switch, hold: Duration) -> Result<()> {
        let region = self
            .region
            .enter()
            .inspect_err(|_| debug!("ATX: {:?} click rejected, busy", switch))?;
        let pulse = Pulse {
            lines: &self.lines,
            switch,
            released: false,
            _region: region,
        };

        self.lines.lock(|l| l.borrow_mut().drive(switch, true))?;
        async_io_mini::Timer::after(hold).await;
        pulse.release()
    }
}

/// An asserted switch.  Dropping it without [`release`](Self::release)
/// (cancellation, early error) still drives the switch LOW, and the region
/// guard is only dropped after that.
struct Pulse<'a, I, O: OutputPin> {
    lines: &'a SharedLines<I, O>,
    switch: Switch,
    released: bool,
    _region: crate::region::RegionGuard<'a>,
}

impl<I, O: OutputPin> Pulse<'_, I, O> {
    fn release(mut self) -> Result<()> {
        self.lines.lock(|l| l.borrow_mut().drive(self.switch, false))?;
        self.released = true;
        Ok(())
    }
}

impl<I, O: OutputPin> Drop for Pulse<'_, I, O> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = self.lines.lock(|l| l.borrow_mut().drive(self.switch, false)) {
            warn!("ATX: failed to release {:?} switch: {}", self.switch, e);
        }
    }
}
