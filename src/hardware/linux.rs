// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Kernel I2C bus access on Raspberry Pi class boards.

use linux_embedded_hal::I2cdev;

use super::bus_path_for_pins;
use crate::error::HardwareError;

/// Opens the I2C bus behind the given pins.
///
/// # Errors
///
/// Returns a configuration error for unknown pin pairs and
/// [`HardwareError::Open`] if the device node cannot be opened.
pub fn open_bus(sda: u8, scl: u8) -> crate::Result<I2cdev> {
    let path = bus_path_for_pins(sda, scl)?;
    tracing::debug!(path, sda, scl, "Opening I2C bus");
    I2cdev::new(path).map_err(|e| {
        HardwareError::Open {
            path: path.to_string(),
            message: e.to_string(),
        }
        .into()
    })
}
