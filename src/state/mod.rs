// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Light state tracking.
//!
//! [`LightState`] holds the last commanded on/off state and brightness.
//! Applying a [`LightCommand`](crate::command::LightCommand) updates it and
//! yields the voltage the output should fade to.
//!
//! # Examples
//!
//! ```
//! use gp8413_light::command::LightCommand;
//! use gp8413_light::state::LightState;
//! use gp8413_light::types::VoltageRange;
//!
//! let mut state = LightState::new();
//!
//! // Brightness while off is remembered but keeps the output dark
//! state.apply(&LightCommand::parse(b"1").unwrap());
//! assert_eq!(state.target_voltage(VoltageRange::High), 0.0);
//!
//! state.apply(&LightCommand::parse(b"ON").unwrap());
//! assert_eq!(state.target_voltage(VoltageRange::High), 1.0);
//! ```

mod light_state;

pub use light_state::{LightState, LightStatus};
