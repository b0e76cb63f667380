//! ATX front-panel controller library.
//!
//! Exposes the controller, its fail-fast exclusive region, and the GPIO
//! line provider for integration testing and for transports that embed
//! it.  All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod atx;
pub mod config;
pub mod drivers;
pub mod error;
pub mod pins;
pub mod region;

#[cfg(target_os = "espidf")]
mod esp_link_shims;

pub use atx::{AtxButton, AtxController, AtxState, Leds, PulseDelays};
pub use config::AtxConfig;
pub use error::{Error, Result};
pub use region::{ExclusiveRegion, RegionGuard, RegionIsBusy};
