// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for light control.
//!
//! # Types
//!
//! - [`PowerState`] - On/Off state of the light
//! - [`Brightness`] - Home Assistant brightness (0-255)
//! - [`VoltageRange`] - DAC output span (0-5 V or 0-10 V)

mod brightness;
mod power;
mod voltage_range;

pub use brightness::Brightness;
pub use power::PowerState;
pub use voltage_range::VoltageRange;
