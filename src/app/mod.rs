//! Application boundary — how requests from the outside reach the controller.
//!
//! Transports (serial console, HTTP, WebSocket) stay outside the crate; they
//! only need [`commands::AtxCommand`] and an
//! [`AtxController`](crate::atx::AtxController).

pub mod commands;
