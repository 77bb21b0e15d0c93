// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Brightness type for the Home Assistant light scale.
//!
//! Home Assistant uses 0-255 for brightness, where 0 is off and 255 is full
//! brightness. Values arriving from the outside are clamped into that range
//! rather than rejected.

use std::fmt;

/// Brightness level on the Home Assistant scale (0-255).
///
/// # Examples
///
/// ```
/// use gp8413_light::types::Brightness;
///
/// let half = Brightness::new(128);
/// assert_eq!(half.value(), 128);
///
/// // Out-of-range integers clamp to the nearest bound
/// assert_eq!(Brightness::clamped(300), Brightness::MAX);
/// assert_eq!(Brightness::clamped(-5), Brightness::MIN);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Brightness(u8);

impl Brightness {
    /// Zero brightness.
    pub const MIN: Self = Self(0);

    /// Full brightness.
    pub const MAX: Self = Self(255);

    /// Creates a brightness value.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Creates a brightness value from any integer, clamping to 0-255.
    #[must_use]
    pub fn clamped(value: i64) -> Self {
        // Safe: clamped into u8 range first
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let value = value.clamp(0, 255) as u8;
        Self(value)
    }

    /// Returns the raw brightness value.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Returns `true` for zero brightness.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for Brightness {
    fn default() -> Self {
        Self::MAX
    }
}

impl fmt::Display for Brightness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u8> for Brightness {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamped_keeps_in_range_values() {
        for v in 0..=255_i64 {
            assert_eq!(i64::from(Brightness::clamped(v).value()), v);
        }
    }

    #[test]
    fn clamped_limits_out_of_range() {
        assert_eq!(Brightness::clamped(-5).value(), 0);
        assert_eq!(Brightness::clamped(256).value(), 255);
        assert_eq!(Brightness::clamped(i64::MAX).value(), 255);
        assert_eq!(Brightness::clamped(i64::MIN).value(), 0);
    }

    #[test]
    fn default_is_full() {
        assert_eq!(Brightness::default(), Brightness::MAX);
    }

    #[test]
    fn display_is_plain_number() {
        assert_eq!(Brightness::new(64).to_string(), "64");
    }
}
