//! ATX controller configuration.
//!
//! Line assignments and pulse timings.  Loaded from JSON by whatever
//! hosts the controller; always [`validate`](AtxConfig::validate)d before a
//! controller is built from it.

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::pins;

/// Core controller configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtxConfig {
    // --- Inputs ---
    /// Power LED sense line
    pub power_led_pin: i32,
    /// HDD LED sense line
    pub hdd_led_pin: i32,

    // --- Outputs ---
    /// Power switch line
    pub power_switch_pin: i32,
    /// Reset switch line
    pub reset_switch_pin: i32,

    // --- Timing ---
    /// Hold time of a short click (seconds)
    pub click_delay_secs: f32,
    /// Hold time of a long power press (seconds)
    pub long_click_delay_secs: f32,
}

impl Default for AtxConfig {
    fn default() -> Self {
        Self {
            power_led_pin: pins::POWER_LED_GPIO,
            hdd_led_pin: pins::HDD_LED_GPIO,

            power_switch_pin: pins::POWER_SWITCH_GPIO,
            reset_switch_pin: pins::RESET_SWITCH_GPIO,

            click_delay_secs: 0.1,
            // Most boards force power-off after holding the switch for ~4 s.
            long_click_delay_secs: 5.5,
        }
    }
}

impl AtxConfig {
    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|_| Error::Config("malformed JSON"))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations a controller cannot be built from.
    pub fn validate(&self) -> Result<()> {
        let lines = [
            self.power_led_pin,
            self.hdd_led_pin,
            self.power_switch_pin,
            self.reset_switch_pin,
        ];
        if lines.iter().any(|&pin| pin < 0) {
            return Err(Error::Config("line numbers must be non-negative"));
        }
        for (i, a) in lines.iter().enumerate() {
            if lines[i + 1..].contains(a) {
                return Err(Error::Config("each line may only be assigned once"));
            }
        }
        if delay_from_secs(self.click_delay_secs).is_none() {
            return Err(Error::Config("click_delay_secs must be positive and finite"));
        }
        if delay_from_secs(self.long_click_delay_secs).is_none() {
            return Err(Error::Config(
                "long_click_delay_secs must be positive and finite",
            ));
        }
        Ok(())
    }
}

/// Hold time for `secs`, or `None` when it is zero, negative, NaN or too
/// large for a `Duration`.
pub(crate) fn delay_from_secs(secs: f32) -> Option<Duration> {
    Duration::try_from_secs_f32(secs)
        .ok()
        .filter(|d| !d.is_zero())
}
