// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Home Assistant MQTT discovery.
//!
//! Home Assistant creates the light entity from a retained JSON document
//! published under `<discovery_prefix>/light/<unique_id>/config`. State and
//! brightness share a single topic; the value templates split the
//! `STATE\nbrightness` payload back into its two lines.
//!
//! # Examples
//!
//! ```
//! use gp8413_light::config::BridgeConfig;
//! use gp8413_light::discovery::DiscoveryDocument;
//!
//! let config = BridgeConfig::builder().build().unwrap();
//! let doc = DiscoveryDocument::for_config(&config);
//!
//! assert_eq!(doc.brightness_scale, 255);
//! assert_eq!(doc.device.model, "GP8413");
//! ```

use serde::Serialize;

use crate::config::BridgeConfig;
use crate::error::ProtocolError;
use crate::types::{Brightness, PowerState};

/// Template extracting the power state from the state payload.
pub const STATE_VALUE_TEMPLATE: &str = "{{ value.split('\\n')[0] }}";

/// Template extracting the brightness from the state payload.
pub const BRIGHTNESS_VALUE_TEMPLATE: &str = "{{ value.split('\\n')[1] }}";

/// Discovery configuration for the light entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveryDocument {
    /// Entity name.
    pub name: String,
    /// Entity unique id.
    pub unique_id: String,
    /// Topic carrying `STATE\nbrightness`.
    pub state_topic: String,
    /// Topic commands are sent to.
    pub command_topic: String,
    /// Same as `state_topic`.
    pub brightness_state_topic: String,
    /// Same as `command_topic`.
    pub brightness_command_topic: String,
    /// Upper end of the brightness slider.
    pub brightness_scale: u8,
    /// Template for the state line.
    pub state_value_template: String,
    /// Template for the brightness line.
    pub brightness_value_template: String,
    /// Payload meaning on.
    pub payload_on: String,
    /// Payload meaning off.
    pub payload_off: String,
    /// Topic carrying `online`/`offline`.
    pub availability_topic: String,
    /// Whether Home Assistant should retain its commands.
    pub retain: bool,
    /// Device registry entry.
    pub device: DeviceInfo,
}

/// Device registry block of the discovery document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    /// Identifiers grouping entities into one device.
    pub identifiers: Vec<String>,
    /// Device name.
    pub name: String,
    /// Model name.
    pub model: String,
    /// Manufacturer name.
    pub manufacturer: String,
}

impl DiscoveryDocument {
    /// Builds the document for a bridge configuration.
    #[must_use]
    pub fn for_config(config: &BridgeConfig) -> Self {
        let state_topic = config.state_topic();
        let command_topic = config.command_topic();
        Self {
            name: config.device_name().to_string(),
            unique_id: config.unique_id().to_string(),
            brightness_state_topic: state_topic.clone(),
            brightness_command_topic: command_topic.clone(),
            state_topic,
            command_topic,
            brightness_scale: Brightness::MAX.value(),
            state_value_template: STATE_VALUE_TEMPLATE.to_string(),
            brightness_value_template: BRIGHTNESS_VALUE_TEMPLATE.to_string(),
            payload_on: PowerState::On.as_str().to_string(),
            payload_off: PowerState::Off.as_str().to_string(),
            availability_topic: config.availability_topic(),
            retain: true,
            device: DeviceInfo {
                identifiers: vec![config.unique_id().to_string()],
                name: config.device_name().to_string(),
                model: "GP8413".to_string(),
                manufacturer: "DFRobot".to_string(),
            },
        }
    }

    /// Serialises the document to JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Json`] if serialisation fails.
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::Json)
    }
}
