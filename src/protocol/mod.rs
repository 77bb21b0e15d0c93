// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MQTT transport between Home Assistant and the light controller.
//!
//! [`MqttBridge`] owns the broker connection and drives the controller from
//! its event loop; [`MqttStatePublisher`] is the controller's outbound side.
//!
//! # Topics
//!
//! | Topic                                      | Direction | Retained |
//! |--------------------------------------------|-----------|----------|
//! | `<base>/set`                               | inbound   | -        |
//! | `<base>/state`                             | outbound  | yes      |
//! | `<base>/availability`                      | outbound  | yes      |
//! | `<discovery_prefix>/light/<unique_id>/config` | outbound | yes     |

mod mqtt_bridge;

pub use mqtt_bridge::{MqttBridge, MqttStatePublisher, RECONNECT_DELAY};

/// Availability payload while the bridge is connected.
pub const PAYLOAD_ONLINE: &str = "online";

/// Availability payload after shutdown, also used as the Last Will.
pub const PAYLOAD_OFFLINE: &str = "offline";
