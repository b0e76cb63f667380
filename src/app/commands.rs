//! Inbound commands to the ATX controller.
//!
//! These represent actions requested by the outside world (serial console,
//! HTTP or WebSocket adapters) in their textual form.  Adapters parse a
//! request into an [`AtxCommand`] and hand it to [`AtxCommand::execute`].

use core::str::FromStr;

use embedded_hal::digital::{InputPin, OutputPin};
use serde::Serialize;

use crate::atx::{AtxButton, AtxController, AtxState};
use crate::error::{Error, Result};

/// Commands that external adapters can send to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtxCommand {
    /// Report busy flag and LED levels.
    GetState,

    /// Press a front-panel button.
    Click(AtxButton),
}

impl FromStr for AtxCommand {
    type Err = Error;

    /// `state`, or a button name optionally prefixed with `click`
    /// (`power`, `click power_long`, `reset`, ...).
    fn from_str(s: &str) -> Result<Self> {
        let mut words = s.split_whitespace();
        let cmd = match (words.next(), words.next()) {
            (Some("state"), None) => Self::GetState,
            (Some("click"), Some(button)) | (Some(button), None) => Self::Click(button.parse()?),
            _ => return Err(Error::Config("unrecognised command")),
        };
        if words.next().is_some() {
            return Err(Error::Config("unrecognised command"));
        }
        Ok(cmd)
    }
}

impl AtxCommand {
    /// Run the command and report the state afterwards.
    ///
    /// A click completes only once its pulse has; a click issued while
    /// another is in progress fails with [`Error::Busy`] straight away.
    pub async fn execute<I: InputPin, O: OutputPin>(
        self,
        atx: &AtxController<I, O>,
    ) -> Result<AtxState> {
        if let Self::Click(button) = self {
            atx.click(button).await?;
        }
        atx.get_state()
    }
}

/// Outcome of one command as an adapter reports it back.
///
/// Serialises to `{"ok":true,"result":{...}}` or
/// `{"ok":false,"error":"..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandReply {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<AtxState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Result<AtxState>> for CommandReply {
    fn from(outcome: Result<AtxState>) -> Self {
        match outcome {
            Ok(state) => Self {
                ok: true,
                result: Some(state),
                error: None,
            },
            Err(e) => Self {
                ok: false,
                result: None,
                error: Some(e.to_string()),
            },
        }
    }
}
