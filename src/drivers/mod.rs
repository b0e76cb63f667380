//! GPIO line provider and the line handles built on it.

pub mod gpio;
pub mod line;
