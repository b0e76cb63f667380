//! Default GPIO line assignments for the ATX control board.
//!
//! Single source of truth for [`AtxConfig::default`](crate::config::AtxConfig)
//! — change a line here and it propagates everywhere.

// ---------------------------------------------------------------------------
// LED sense inputs (active-low: the line reads LOW while the LED is lit)
// ---------------------------------------------------------------------------

/// Digital input tapped from the motherboard power LED header.
pub const POWER_LED_GPIO: i32 = 24;
/// Digital input tapped from the motherboard HDD activity LED header.
pub const HDD_LED_GPIO: i32 = 22;

// ---------------------------------------------------------------------------
// Switch outputs (HIGH closes the optocoupler across the front-panel pins)
// ---------------------------------------------------------------------------

/// Digital output wired across the power switch header.
pub const POWER_SWITCH_GPIO: i32 = 23;
/// Digital output wired across the reset switch header.
pub const RESET_SWITCH_GPIO: i32 = 27;
