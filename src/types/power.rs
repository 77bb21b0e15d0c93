// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Power state of the light.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// On/off state of the light.
///
/// The textual form matches the Home Assistant default `payload_on` and
/// `payload_off` values exactly. Parsing is case-sensitive.
///
/// # Examples
///
/// ```
/// use gp8413_light::types::PowerState;
///
/// assert_eq!("ON".parse::<PowerState>().unwrap(), PowerState::On);
/// assert!("on".parse::<PowerState>().is_err());
/// assert_eq!(PowerState::Off.as_str(), "OFF");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PowerState {
    /// Light is off.
    #[default]
    Off,
    /// Light is on.
    On,
}

impl PowerState {
    /// Returns the payload string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "OFF",
            Self::On => "ON",
        }
    }

    /// Returns `true` for [`PowerState::On`].
    #[must_use]
    pub const fn is_on(&self) -> bool {
        matches!(self, Self::On)
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PowerState {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ON" => Ok(Self::On),
            "OFF" => Ok(Self::Off),
            _ => Err(ParseError::MalformedCommand(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_exact_payloads() {
        assert_eq!("ON".parse::<PowerState>().unwrap(), PowerState::On);
        assert_eq!("OFF".parse::<PowerState>().unwrap(), PowerState::Off);
    }

    #[test]
    fn parse_is_case_sensitive() {
        assert!("on".parse::<PowerState>().is_err());
        assert!("Off".parse::<PowerState>().is_err());
        assert!(" ON".parse::<PowerState>().is_err());
    }
}
