// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Commanded light state and its published snapshot.

use std::fmt;

use crate::command::LightCommand;
use crate::mapper;
use crate::types::{Brightness, PowerState, VoltageRange};

/// Last commanded on/off state and brightness.
///
/// Starts off, with full brightness remembered for the first `ON`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LightState {
    power: PowerState,
    brightness: Brightness,
}

impl LightState {
    /// Creates the startup state: off, brightness 255.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the on/off state.
    #[must_use]
    pub fn power(&self) -> PowerState {
        self.power
    }

    /// Returns `true` if the light is on.
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.power.is_on()
    }

    /// Returns the stored brightness.
    ///
    /// While off this is the brightness the next `ON` will use.
    #[must_use]
    pub fn brightness(&self) -> Brightness {
        self.brightness
    }

    /// Applies a command.
    ///
    /// Returns `true` if the state changed.
    pub fn apply(&mut self, command: &LightCommand) -> bool {
        let before = *self;
        if let Some(power) = command.power() {
            self.power = power;
        }
        if let Some(brightness) = command.brightness() {
            self.brightness = brightness;
        }
        *self != before
    }

    /// Returns the voltage the output should settle at.
    ///
    /// Always 0 V while off, regardless of the stored brightness.
    #[must_use]
    pub fn target_voltage(&self, range: VoltageRange) -> f32 {
        if self.is_on() {
            mapper::voltage_for(self.brightness, range)
        } else {
            0.0
        }
    }

    /// Returns a snapshot for publishing.
    #[must_use]
    pub fn status(&self) -> LightStatus {
        LightStatus {
            power: self.power,
            brightness: self.brightness,
        }
    }
}

/// Snapshot of the light state echoed to Home Assistant.
///
/// The payload form is `<STATE>\n<brightness>`, which the discovery
/// document's value templates split apart again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightStatus {
    /// On/off state.
    pub power: PowerState,
    /// Stored brightness.
    pub brightness: Brightness,
}

impl LightStatus {
    /// Renders the state topic payload.
    #[must_use]
    pub fn to_payload(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for LightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self.power, self.brightness)
    }
}
