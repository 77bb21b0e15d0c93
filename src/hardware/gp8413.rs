// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Driver for the DFRobot Gravity GP8413 15-bit two-channel DAC.
//!
//! Register map used here:
//!
//! | Register | Content                                      |
//! |----------|----------------------------------------------|
//! | `0x01`   | Output range (`0x00` = 0-5 V, `0x11` = 0-10 V) |
//! | `0x02`   | Channel 0 code, little-endian, shifted left 1 |
//! | `0x04`   | Channel 1 code, little-endian, shifted left 1 |

use embedded_hal::i2c::{Error as _, I2c};

use super::{Channel, ChannelWriter};
use crate::error::HardwareError;
use crate::mapper::MIN_ON_VOLTS;
use crate::types::VoltageRange;

/// Factory I2C address with all address pins low.
pub const DEFAULT_ADDRESS: u8 = 0x58;

/// Full-scale 15-bit output code.
pub const MAX_CODE: u16 = 0x7FFF;

const RANGE_REGISTER: u8 = 0x01;
const CHANNEL0_REGISTER: u8 = 0x02;
const CHANNEL1_REGISTER: u8 = 0x04;

/// Converts a voltage to the 15-bit DAC code for `range`.
///
/// Voltages inside the undefined 0-1 V band snap to 0 V below 0.5 V and
/// to 1 V from 0.5 V upwards. The result is clamped to `0..=MAX_CODE`.
///
/// # Examples
///
/// ```
/// use gp8413_light::hardware::{volts_to_code, MAX_CODE};
/// use gp8413_light::types::VoltageRange;
///
/// assert_eq!(volts_to_code(10.0, VoltageRange::High), MAX_CODE);
/// assert_eq!(volts_to_code(0.2, VoltageRange::High), 0);
/// assert_eq!(volts_to_code(0.7, VoltageRange::High), volts_to_code(1.0, VoltageRange::High));
/// ```
#[must_use]
// Safe: clamped into the 15-bit range before the cast
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn volts_to_code(volts: f32, range: VoltageRange) -> u16 {
    let volts = if volts > 0.0 && volts < MIN_ON_VOLTS {
        if volts < MIN_ON_VOLTS / 2.0 {
            0.0
        } else {
            MIN_ON_VOLTS
        }
    } else {
        volts
    };
    let code = (volts / range.max_volts() * f32::from(MAX_CODE)).round();
    code.clamp(0.0, f32::from(MAX_CODE)) as u16
}

/// GP8413 on an `embedded-hal` I2C bus.
#[derive(Debug)]
pub struct Gp8413<I> {
    i2c: I,
    address: u8,
    range: VoltageRange,
}

impl<I: I2c> Gp8413<I> {
    /// Wraps a bus. No traffic happens until [`begin`](Self::begin).
    pub fn new(i2c: I, address: u8, range: VoltageRange) -> Self {
        Self {
            i2c,
            address,
            range,
        }
    }

    /// Returns the configured output span.
    #[must_use]
    pub fn range(&self) -> VoltageRange {
        self.range
    }

    /// Returns the device address.
    #[must_use]
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Checks the device answers and programs the output range.
    ///
    /// The presence check is an empty write that only addresses the device.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::NotFound`] if the address is not acknowledged
    /// and [`HardwareError::Bus`] if the range write fails afterwards.
    pub fn begin(&mut self) -> Result<(), HardwareError> {
        self.write_register(&[]).map_err(|e| {
            tracing::debug!(address = self.address, error = %e, "GP8413 not acknowledged");
            HardwareError::NotFound(self.address)
        })?;
        self.set_output_range(self.range)?;
        tracing::info!(address = self.address, range = %self.range, "GP8413 initialised");
        Ok(())
    }

    /// Programs the output range register.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::Bus`] if the write fails.
    pub fn set_output_range(&mut self, range: VoltageRange) -> Result<(), HardwareError> {
        self.write_register(&[RANGE_REGISTER, range.register_code()])?;
        self.range = range;
        Ok(())
    }

    /// Writes a raw 15-bit code to one channel.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::Bus`] if the write fails.
    pub fn set_raw(&mut self, channel: Channel, code: u16) -> Result<(), HardwareError> {
        let register = match channel {
            Channel::Zero => CHANNEL0_REGISTER,
            Channel::One => CHANNEL1_REGISTER,
        };
        let [lo, hi] = (code.min(MAX_CODE) << 1).to_le_bytes();
        self.write_register(&[register, lo, hi])
    }

    /// Releases the bus.
    pub fn into_inner(self) -> I {
        self.i2c
    }

    fn write_register(&mut self, bytes: &[u8]) -> Result<(), HardwareError> {
        self.i2c
            .write(self.address, bytes)
            .map_err(|e| HardwareError::Bus {
                address: self.address,
                message: format!("{:?}", e.kind()),
            })
    }
}

impl<I> ChannelWriter for Gp8413<I>
where
    I: I2c + Send + 'static,
{
    fn write(&mut self, channel: Channel, volts: f32) -> Result<(), HardwareError> {
        let code = volts_to_code(volts, self.range);
        self.set_raw(channel, code)
    }
}
