// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Inbound light commands.
//!
//! Home Assistant's default MQTT light schema sends plain-text payloads to
//! the command topic. Three shapes are understood, tried in order:
//!
//! | Payload      | Meaning                                  |
//! |--------------|------------------------------------------|
//! | `ON`, `OFF`  | Switch, keep the stored brightness       |
//! | `ON\n128`    | Switch and set brightness                |
//! | ` 64 `       | Brightness only, keep on/off state       |
//!
//! Anything else is rejected as malformed.
//!
//! # Examples
//!
//! ```
//! use gp8413_light::command::LightCommand;
//! use gp8413_light::types::{Brightness, PowerState};
//!
//! assert_eq!(LightCommand::parse(b"ON").unwrap(), LightCommand::Power(PowerState::On));
//! assert_eq!(
//!     LightCommand::parse(b"OFF\n20").unwrap(),
//!     LightCommand::PowerAndBrightness(PowerState::Off, Brightness::new(20))
//! );
//! assert!(LightCommand::parse(b"garbage").is_err());
//! ```

use std::fmt;

use crate::error::ParseError;
use crate::types::{Brightness, PowerState};

/// A parsed command for the light.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightCommand {
    /// Switch on or off, keeping the stored brightness.
    Power(PowerState),
    /// Switch and set brightness together.
    PowerAndBrightness(PowerState, Brightness),
    /// Set brightness, keeping the on/off state.
    Brightness(Brightness),
}

impl LightCommand {
    /// Parses a raw command payload.
    ///
    /// Brightness values outside 0-255 are clamped.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidUtf8`] for non-text payloads and
    /// [`ParseError::MalformedCommand`] for text matching no known shape.
    pub fn parse(payload: &[u8]) -> Result<Self, ParseError> {
        let text = std::str::from_utf8(payload).map_err(|_| ParseError::InvalidUtf8)?;

        if let Ok(power) = text.parse::<PowerState>() {
            return Ok(Self::Power(power));
        }

        if let Some((state, value)) = text.split_once('\n')
            && let Ok(power) = state.parse::<PowerState>()
            && let Some(brightness) = parse_brightness(value)
        {
            return Ok(Self::PowerAndBrightness(power, brightness));
        }

        if let Some(brightness) = parse_brightness(text.trim()) {
            return Ok(Self::Brightness(brightness));
        }

        Err(ParseError::MalformedCommand(text.to_string()))
    }

    /// Returns the requested power state, if any.
    #[must_use]
    pub fn power(&self) -> Option<PowerState> {
        match self {
            Self::Power(power) | Self::PowerAndBrightness(power, _) => Some(*power),
            Self::Brightness(_) => None,
        }
    }

    /// Returns the requested brightness, if any.
    #[must_use]
    pub fn brightness(&self) -> Option<Brightness> {
        match self {
            Self::PowerAndBrightness(_, brightness) | Self::Brightness(brightness) => {
                Some(*brightness)
            }
            Self::Power(_) => None,
        }
    }
}

impl fmt::Display for LightCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Power(power) => write!(f, "{power}"),
            Self::PowerAndBrightness(power, brightness) => write!(f, "{power} @ {brightness}"),
            Self::Brightness(brightness) => write!(f, "brightness {brightness}"),
        }
    }
}

/// Parses a signed decimal integer and clamps it to a brightness.
fn parse_brightness(text: &str) -> Option<Brightness> {
    if text.is_empty() {
        return None;
    }
    let digits = text.strip_prefix(['-', '+']).unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let negative = text.starts_with('-');
    // Overlong inputs saturate rather than fail
    let value = text.parse::<i64>().unwrap_or(if negative { i64::MIN } else { i64::MAX });
    Some(Brightness::clamped(value))
}
