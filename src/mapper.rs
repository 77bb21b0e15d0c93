// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Brightness to output voltage mapping.
//!
//! Brightness 0 switches the output fully off. Brightness 1-255 maps
//! linearly onto 1 V up to the range maximum. The band between 0 V and 1 V
//! is never targeted: the dimming inputs this DAC drives treat it as
//! undefined.

use crate::types::{Brightness, VoltageRange};

/// Lowest voltage used for a lit output.
pub const MIN_ON_VOLTS: f32 = 1.0;

/// Maps a Home Assistant brightness to an output voltage.
///
/// Inputs outside 0-255 are clamped to the nearest bound first.
///
/// # Examples
///
/// ```
/// use gp8413_light::mapper::brightness_to_voltage;
/// use gp8413_light::types::VoltageRange;
///
/// assert_eq!(brightness_to_voltage(0, VoltageRange::High), 0.0);
/// assert_eq!(brightness_to_voltage(1, VoltageRange::High), 1.0);
/// assert_eq!(brightness_to_voltage(255, VoltageRange::High), 10.0);
/// assert_eq!(brightness_to_voltage(300, VoltageRange::Low), 5.0);
/// ```
#[must_use]
pub fn brightness_to_voltage(brightness: i64, range: VoltageRange) -> f32 {
    voltage_for(Brightness::clamped(brightness), range)
}

/// Maps an already-validated [`Brightness`] to an output voltage.
#[must_use]
pub fn voltage_for(brightness: Brightness, range: VoltageRange) -> f32 {
    if brightness.is_zero() {
        return 0.0;
    }
    let ratio = f32::from(brightness.value() - 1) / 254.0;
    MIN_ON_VOLTS + ratio * (range.max_volts() - MIN_ON_VOLTS)
}
