// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! DAC hardware access.
//!
//! The fade engine only talks to the [`ChannelWriter`] trait. The
//! [`Gp8413`] driver implements it on top of any `embedded-hal` I2C bus;
//! with the `linux` feature, [`open_bus`] opens the kernel I2C device that
//! sits behind a given SDA/SCL pin pair.

mod gp8413;
#[cfg(feature = "linux")]
mod linux;

pub use gp8413::{DEFAULT_ADDRESS, Gp8413, MAX_CODE, volts_to_code};
#[cfg(feature = "linux")]
pub use linux::open_bus;

use std::fmt;

use crate::error::{ConfigError, HardwareError};

/// One of the two DAC outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// First output (VOUT0).
    Zero,
    /// Second output (VOUT1).
    One,
}

impl Channel {
    /// Both channels, in write order.
    pub const BOTH: [Self; 2] = [Self::Zero, Self::One];

    /// Returns the channel number.
    #[must_use]
    pub const fn index(&self) -> u8 {
        match self {
            Self::Zero => 0,
            Self::One => 1,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// Returns the I2C device node wired to a BCM SDA/SCL pin pair.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidPins`] for pairs without a hardware bus.
pub fn bus_path_for_pins(sda: u8, scl: u8) -> Result<&'static str, ConfigError> {
    match (sda, scl) {
        (2, 3) => Ok("/dev/i2c-1"),
        (0, 1) => Ok("/dev/i2c-0"),
        _ => Err(ConfigError::InvalidPins { sda, scl }),
    }
}

/// Sets a DAC output to a voltage, synchronously.
///
/// Any error aborts the fade that issued the write; callers never retry.
pub trait ChannelWriter: Send + 'static {
    /// Drives `channel` to `volts` immediately.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError`] if the device did not accept the write.
    fn write(&mut self, channel: Channel, volts: f32) -> Result<(), HardwareError>;

    /// Drives both channels to the same voltage.
    ///
    /// # Errors
    ///
    /// Returns the first [`HardwareError`]; the second channel is not
    /// written if the first fails.
    fn write_both(&mut self, volts: f32) -> Result<(), HardwareError> {
        for channel in Channel::BOTH {
            self.write(channel, volts)?;
        }
        Ok(())
    }
}

impl<W: ChannelWriter + ?Sized> ChannelWriter for Box<W> {
    fn write(&mut self, channel: Channel, volts: f32) -> Result<(), HardwareError> {
        (**self).write(channel, volts)
    }

    fn write_both(&mut self, volts: f32) -> Result<(), HardwareError> {
        (**self).write_both(volts)
    }
}
