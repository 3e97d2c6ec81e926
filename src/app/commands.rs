//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (serial console,
//! stdin on the host) that the [`AppService`](super::service::AppService)
//! interprets and acts upon.
//!
//! Console grammar, one command per line:
//!
//! ```text
//! ratio <percent>              desired duty cycle, 0–100
//! adjust on|off                duty-cycle regulation
//! log on|off                   data logging
//! interval <secs>              data log interval
//! delay <secs>                 door debounce delay
//! clock YYYY-MM-DD HH:MM:SS    set the wall clock
//! save                         persist config now
//! status                       emit a status snapshot
//! ```

use crate::clock::DateTimeFields;
use crate::error::CommandError;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppCommand {
    /// Desired on/off ratio, 0.0–1.0.
    SetDesiredRatio(f32),
    SetAdjustment(bool),
    SetLogging(bool),
    SetLoggingInterval(u32),
    SetDoorDelay(u32),
    SetClock(DateTimeFields),

    /// Explicitly persist the current config immediately.
    SaveConfig,

    /// Emit an [`AppEvent::Status`](super::events::AppEvent::Status).
    ReportStatus,
}

impl AppCommand {
    /// Parse one console line.  Keywords are case-insensitive.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((w, r)) => (w, r.trim()),
            None => (line, ""),
        };
        if word.is_empty() {
            return Err(CommandError::Empty);
        }

        let word = word.to_ascii_lowercase();
        match word.as_str() {
            "ratio" => {
                let pct: f32 = arg(rest)?
                    .parse()
                    .map_err(|_| CommandError::InvalidArgument("ratio must be a number"))?;
                if !(0.0..=100.0).contains(&pct) {
                    return Err(CommandError::InvalidArgument("ratio must be 0–100"));
                }
                Ok(Self::SetDesiredRatio(pct / 100.0))
            }
            "adjust" => Ok(Self::SetAdjustment(on_off(rest)?)),
            "log" => Ok(Self::SetLogging(on_off(rest)?)),
            "interval" => Ok(Self::SetLoggingInterval(seconds(rest)?)),
            "delay" => Ok(Self::SetDoorDelay(seconds(rest)?)),
            "clock" => {
                let fields = DateTimeFields::parse(arg(rest)?)
                    .map_err(|_| CommandError::InvalidArgument("expected YYYY-MM-DD HH:MM:SS"))?;
                Ok(Self::SetClock(fields))
            }
            "save" => Ok(Self::SaveConfig),
            "status" => Ok(Self::ReportStatus),
            _ => Err(CommandError::UnknownCommand),
        }
    }
}

fn arg(rest: &str) -> Result<&str, CommandError> {
    if rest.is_empty() {
        Err(CommandError::MissingArgument)
    } else {
        Ok(rest)
    }
}

fn on_off(rest: &str) -> Result<bool, CommandError> {
    match arg(rest)?.to_ascii_lowercase().as_str() {
        "on" | "1" | "true" => Ok(true),
        "off" | "0" | "false" => Ok(false),
        _ => Err(CommandError::InvalidArgument("expected on or off")),
    }
}

fn seconds(rest: &str) -> Result<u32, CommandError> {
    arg(rest)?
        .parse()
        .map_err(|_| CommandError::InvalidArgument("expected whole seconds"))
}
