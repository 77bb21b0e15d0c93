// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Output voltage span of the DAC.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Output voltage span selected at startup.
///
/// The GP8413 can drive either 0-5 V or 0-10 V on both channels. The span
/// is fixed for the lifetime of the process.
///
/// # Examples
///
/// ```
/// use gp8413_light::types::VoltageRange;
///
/// let range: VoltageRange = "0-10V".parse().unwrap();
/// assert_eq!(range, VoltageRange::High);
/// assert!((range.max_volts() - 10.0).abs() < f32::EPSILON);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VoltageRange {
    /// 0-5 V output.
    Low,
    /// 0-10 V output.
    #[default]
    High,
}

impl VoltageRange {
    /// Returns the maximum output voltage of this span.
    #[must_use]
    pub const fn max_volts(&self) -> f32 {
        match self {
            Self::Low => 5.0,
            Self::High => 10.0,
        }
    }

    /// Returns the value written to the GP8413 range register.
    #[must_use]
    pub const fn register_code(&self) -> u8 {
        match self {
            Self::Low => 0x00,
            Self::High => 0x11,
        }
    }

    /// Returns the canonical label, as accepted on the command line.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "0-5V",
            Self::High => "0-10V",
        }
    }
}

impl fmt::Display for VoltageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoltageRange {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "0-5v" | "5v" | "5" | "low" => Ok(Self::Low),
            "0-10v" | "10v" | "10" | "high" => Ok(Self::High),
            _ => Err(ConfigError::InvalidRange(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepted_labels() {
        for label in ["0-5V", "5V", "low", "LOW"] {
            assert_eq!(label.parse::<VoltageRange>().unwrap(), VoltageRange::Low);
        }
        for label in ["0-10V", "10v", "high", "10"] {
            assert_eq!(label.parse::<VoltageRange>().unwrap(), VoltageRange::High);
        }
    }

    #[test]
    fn parse_rejects_unknown_span() {
        let err = "0-12V".parse::<VoltageRange>().unwrap_err();
        assert_eq!(err, ConfigError::InvalidRange("0-12V".to_string()));
    }

    #[test]
    fn register_codes() {
        assert_eq!(VoltageRange::Low.register_code(), 0x00);
        assert_eq!(VoltageRange::High.register_code(), 0x11);
    }

    #[test]
    fn display_round_trips_label() {
        assert_eq!(VoltageRange::Low.to_string(), "0-5V");
        assert_eq!(
            VoltageRange::High.to_string().parse::<VoltageRange>().unwrap(),
            VoltageRange::High
        );
    }
}
