// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bridge configuration.
//!
//! [`BridgeConfig`] is assembled once at startup through
//! [`BridgeConfigBuilder`] and never changes afterwards. Every field has a
//! default matching a stock Raspberry Pi + GP8413 setup.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use gp8413_light::config::BridgeConfig;
//! use gp8413_light::types::VoltageRange;
//!
//! let config = BridgeConfig::builder()
//!     .mqtt_host("192.168.1.50")
//!     .credentials("ha", "secret")
//!     .range(VoltageRange::Low)
//!     .fade_duration_secs(1.5)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.command_topic(), "homeassistant/light/gp8413/set");
//! assert_eq!(config.fade_duration(), Duration::from_millis(1500));
//! ```

use std::time::Duration;

use crate::error::ConfigError;
use crate::hardware::{self, DEFAULT_ADDRESS};
use crate::types::VoltageRange;

/// Default base topic for command and state topics.
pub const DEFAULT_BASE_TOPIC: &str = "homeassistant/light/gp8413";

/// Default Home Assistant discovery prefix.
pub const DEFAULT_DISCOVERY_PREFIX: &str = "homeassistant";

/// Lowest non-reserved 7-bit I2C address.
pub const MIN_ADDRESS: u8 = 0x08;

/// Highest non-reserved 7-bit I2C address.
pub const MAX_ADDRESS: u8 = 0x77;

/// Parses an I2C address given in decimal or `0x`-prefixed hex.
///
/// # Errors
///
/// Returns [`ConfigError::MalformedAddress`] for text that is not a number
/// and [`ConfigError::InvalidAddress`] outside `0x08..=0x77`.
///
/// # Examples
///
/// ```
/// use gp8413_light::config::parse_address;
///
/// assert_eq!(parse_address("0x58"), Ok(0x58));
/// assert_eq!(parse_address("88"), Ok(88));
/// assert!(parse_address("0x80").is_err());
/// ```
pub fn parse_address(text: &str) -> Result<u8, ConfigError> {
    let text = text.trim();
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => text.parse::<u16>(),
    };
    let value = parsed.map_err(|_| ConfigError::MalformedAddress(text.to_string()))?;
    validate_address(value)
}

fn validate_address(value: u16) -> Result<u8, ConfigError> {
    u8::try_from(value)
        .ok()
        .filter(|a| (MIN_ADDRESS..=MAX_ADDRESS).contains(a))
        .ok_or(ConfigError::InvalidAddress(value))
}

/// Validated, immutable startup configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeConfig {
    mqtt_host: String,
    mqtt_port: u16,
    credentials: Option<(String, String)>,
    keep_alive: Duration,
    base_topic: String,
    discovery_prefix: String,
    device_name: String,
    unique_id: String,
    range: VoltageRange,
    sda_pin: u8,
    scl_pin: u8,
    address: u8,
    fade_duration: Duration,
}

impl BridgeConfig {
    /// Creates a builder holding the defaults.
    #[must_use]
    pub fn builder() -> BridgeConfigBuilder {
        BridgeConfigBuilder::default()
    }

    /// Broker host name or address.
    #[must_use]
    pub fn mqtt_host(&self) -> &str {
        &self.mqtt_host
    }

    /// Broker port.
    #[must_use]
    pub fn mqtt_port(&self) -> u16 {
        self.mqtt_port
    }

    /// Broker credentials as `(username, password)`.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        self.credentials
            .as_ref()
            .map(|(u, p)| (u.as_str(), p.as_str()))
    }

    /// MQTT keep-alive interval.
    #[must_use]
    pub fn keep_alive(&self) -> Duration {
        self.keep_alive
    }

    /// Base topic, without trailing slash.
    #[must_use]
    pub fn base_topic(&self) -> &str {
        &self.base_topic
    }

    /// Home Assistant discovery prefix.
    #[must_use]
    pub fn discovery_prefix(&self) -> &str {
        &self.discovery_prefix
    }

    /// Device name shown in Home Assistant.
    #[must_use]
    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Unique id of the light entity.
    #[must_use]
    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    /// DAC output span.
    #[must_use]
    pub fn range(&self) -> VoltageRange {
        self.range
    }

    /// BCM pin numbers as `(sda, scl)`.
    #[must_use]
    pub fn pins(&self) -> (u8, u8) {
        (self.sda_pin, self.scl_pin)
    }

    /// I2C address of the DAC.
    #[must_use]
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Duration of a fade across the whole span.
    #[must_use]
    pub fn fade_duration(&self) -> Duration {
        self.fade_duration
    }

    /// Topic Home Assistant sends commands to.
    #[must_use]
    pub fn command_topic(&self) -> String {
        format!("{}/set", self.base_topic)
    }

    /// Topic the state echo is published on.
    #[must_use]
    pub fn state_topic(&self) -> String {
        format!("{}/state", self.base_topic)
    }

    /// Topic carrying `online`/`offline`.
    #[must_use]
    pub fn availability_topic(&self) -> String {
        format!("{}/availability", self.base_topic)
    }

    /// Topic of the Home Assistant discovery document.
    #[must_use]
    pub fn discovery_topic(&self) -> String {
        format!(
            "{}/light/{}/config",
            self.discovery_prefix, self.unique_id
        )
    }

    /// MQTT client id derived from the unique id.
    #[must_use]
    pub fn client_id(&self) -> String {
        format!("gp8413_{}", self.unique_id)
    }
}

/// Builder for [`BridgeConfig`].
///
/// Setters never fail; [`build`](Self::build) validates everything at once.
#[derive(Debug, Clone)]
pub struct BridgeConfigBuilder {
    mqtt_host: String,
    mqtt_port: u16,
    username: Option<String>,
    password: Option<String>,
    keep_alive: Duration,
    base_topic: String,
    discovery_prefix: String,
    device_name: String,
    unique_id: String,
    range: VoltageRange,
    sda_pin: u8,
    scl_pin: u8,
    address: u16,
    fade_duration_secs: f64,
}

impl Default for BridgeConfigBuilder {
    fn default() -> Self {
        Self {
            mqtt_host: "localhost".to_string(),
            mqtt_port: 1883,
            username: None,
            password: None,
            keep_alive: Duration::from_secs(60),
            base_topic: DEFAULT_BASE_TOPIC.to_string(),
            discovery_prefix: DEFAULT_DISCOVERY_PREFIX.to_string(),
            device_name: "GP8413 Light".to_string(),
            unique_id: "gp8413_light".to_string(),
            range: VoltageRange::High,
            sda_pin: 2,
            scl_pin: 3,
            address: u16::from(DEFAULT_ADDRESS),
            fade_duration_secs: 0.5,
        }
    }
}

impl BridgeConfigBuilder {
    /// Sets the broker host (default: `localhost`).
    #[must_use]
    pub fn mqtt_host(mut self, host: impl Into<String>) -> Self {
        self.mqtt_host = host.into();
        self
    }

    /// Sets the broker port (default: 1883).
    #[must_use]
    pub fn mqtt_port(mut self, port: u16) -> Self {
        self.mqtt_port = port;
        self
    }

    /// Sets the broker username.
    #[must_use]
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Sets the broker password. Requires a username.
    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Sets username and password together.
    #[must_use]
    pub fn credentials(self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username(username).password(password)
    }

    /// Sets the keep-alive interval (default: 60 seconds, zero disables).
    #[must_use]
    pub fn keep_alive(mut self, keep_alive: Duration) -> Self {
        self.keep_alive = keep_alive;
        self
    }

    /// Sets the base topic (default: `homeassistant/light/gp8413`).
    ///
    /// Trailing slashes are stripped.
    #[must_use]
    pub fn base_topic(mut self, topic: impl Into<String>) -> Self {
        self.base_topic = topic.into();
        self
    }

    /// Sets the discovery prefix (default: `homeassistant`).
    #[must_use]
    pub fn discovery_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.discovery_prefix = prefix.into();
        self
    }

    /// Sets the device name (default: `GP8413 Light`).
    #[must_use]
    pub fn device_name(mut self, name: impl Into<String>) -> Self {
        self.device_name = name.into();
        self
    }

    /// Sets the unique id (default: `gp8413_light`).
    #[must_use]
    pub fn unique_id(mut self, id: impl Into<String>) -> Self {
        self.unique_id = id.into();
        self
    }

    /// Sets the output span (default: 0-10 V).
    #[must_use]
    pub fn range(mut self, range: VoltageRange) -> Self {
        self.range = range;
        self
    }

    /// Sets the BCM SDA/SCL pins (default: 2/3).
    #[must_use]
    pub fn pins(mut self, sda: u8, scl: u8) -> Self {
        self.sda_pin = sda;
        self.scl_pin = scl;
        self
    }

    /// Sets the I2C address (default: `0x58`).
    #[must_use]
    pub fn address(mut self, address: u16) -> Self {
        self.address = address;
        self
    }

    /// Sets the full-scale fade duration in seconds (default: 0.5).
    #[must_use]
    pub fn fade_duration_secs(mut self, secs: f64) -> Self {
        self.fade_duration_secs = secs;
        self
    }

    /// Validates and freezes the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for empty host/topics/ids, pins without an
    /// I2C bus, addresses outside `0x08..=0x77`, negative or non-finite
    /// fade durations, sub-second keep-alives, and a password without a
    /// username.
    pub fn build(self) -> Result<BridgeConfig, ConfigError> {
        if self.mqtt_host.trim().is_empty() {
            return Err(ConfigError::Empty("MQTT host"));
        }
        let base_topic = self.base_topic.trim_end_matches('/').to_string();
        if base_topic.is_empty() {
            return Err(ConfigError::Empty("base topic"));
        }
        let discovery_prefix = self.discovery_prefix.trim_end_matches('/').to_string();
        if discovery_prefix.is_empty() {
            return Err(ConfigError::Empty("discovery prefix"));
        }
        if self.unique_id.trim().is_empty() {
            return Err(ConfigError::Empty("unique id"));
        }
        if self.device_name.trim().is_empty() {
            return Err(ConfigError::Empty("device name"));
        }

        if !self.keep_alive.is_zero() && self.keep_alive < Duration::from_secs(1) {
            return Err(ConfigError::InvalidKeepAlive(self.keep_alive));
        }

        hardware::bus_path_for_pins(self.sda_pin, self.scl_pin)?;

        let address = validate_address(self.address)?;

        if !self.fade_duration_secs.is_finite() || self.fade_duration_secs < 0.0 {
            return Err(ConfigError::InvalidFadeDuration(self.fade_duration_secs));
        }
        let fade_duration = Duration::try_from_secs_f64(self.fade_duration_secs)
            .map_err(|_| ConfigError::InvalidFadeDuration(self.fade_duration_secs))?;

        let credentials = match (self.username, self.password) {
            (Some(user), password) => Some((user, password.unwrap_or_default())),
            (None, Some(_)) => return Err(ConfigError::PasswordWithoutUsername),
            (None, None) => None,
        };

        Ok(BridgeConfig {
            mqtt_host: self.mqtt_host,
            mqtt_port: self.mqtt_port,
            credentials,
            keep_alive: self.keep_alive,
            base_topic,
            discovery_prefix,
            device_name: self.device_name,
            unique_id: self.unique_id,
            range: self.range,
            sda_pin: self.sda_pin,
            scl_pin: self.scl_pin,
            address,
            fade_duration,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = BridgeConfig::builder().build().unwrap();
        assert_eq!(config.mqtt_host(), "localhost");
        assert_eq!(config.mqtt_port(), 1883);
        assert!(config.credentials().is_none());
        assert_eq!(config.device_name(), "GP8413 Light");
        assert_eq!(config.unique_id(), "gp8413_light");
        assert_eq!(config.range(), VoltageRange::High);
        assert_eq!(config.pins(), (2, 3));
        assert_eq!(config.address(), 0x58);
        assert_eq!(config.fade_duration(), Duration::from_millis(500));
    }

    #[test]
    fn derived_topics() {
        let config = BridgeConfig::builder()
            .base_topic("lights/shed/")
            .unique_id("shed_strip")
            .build()
            .unwrap();
        assert_eq!(config.command_topic(), "lights/shed/set");
        assert_eq!(config.state_topic(), "lights/shed/state");
        assert_eq!(config.availability_topic(), "lights/shed/availability");
        assert_eq!(
            config.discovery_topic(),
            "homeassistant/light/shed_strip/config"
        );
        assert_eq!(config.client_id(), "gp8413_shed_strip");
    }

    #[test]
    fn username_without_password_is_allowed() {
        let config = BridgeConfig::builder().username("ha").build().unwrap();
        assert_eq!(config.credentials(), Some(("ha", "")));
    }

    #[test]
    fn password_without_username_is_rejected() {
        let err = BridgeConfig::builder().password("x").build().unwrap_err();
        assert_eq!(err, ConfigError::PasswordWithoutUsername);
    }

    #[test]
    fn invalid_pins_are_rejected() {
        let err = BridgeConfig::builder().pins(17, 27).build().unwrap_err();
        assert_eq!(err, ConfigError::InvalidPins { sda: 17, scl: 27 });
    }

    #[test]
    fn invalid_addresses_are_rejected() {
        for address in [0x00, 0x07, 0x78, 0x1_00] {
            let err = BridgeConfig::builder().address(address).build().unwrap_err();
            assert_eq!(err, ConfigError::InvalidAddress(address));
        }
        assert!(BridgeConfig::builder().address(0x5F).build().is_ok());
    }

    #[test]
    fn address_text_accepts_hex_and_decimal() {
        assert_eq!(parse_address("0x58"), Ok(0x58));
        assert_eq!(parse_address("0X5f"), Ok(0x5F));
        assert_eq!(parse_address(" 88 "), Ok(88));
        assert_eq!(parse_address("0x08"), Ok(MIN_ADDRESS));
        assert_eq!(parse_address("0x77"), Ok(MAX_ADDRESS));
    }

    #[test]
    fn address_text_is_validated() {
        assert_eq!(
            parse_address("0xZZ"),
            Err(ConfigError::MalformedAddress("0xZZ".to_string()))
        );
        assert_eq!(
            parse_address("gp8413"),
            Err(ConfigError::MalformedAddress("gp8413".to_string()))
        );
        assert_eq!(parse_address("0x78"), Err(ConfigError::InvalidAddress(0x78)));
        assert_eq!(parse_address("3"), Err(ConfigError::InvalidAddress(3)));
        assert_eq!(parse_address("0x100"), Err(ConfigError::InvalidAddress(0x100)));
    }

    #[test]
    fn invalid_fade_durations_are_rejected() {
        for secs in [-0.1, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                BridgeConfig::builder().fade_duration_secs(secs).build(),
                Err(ConfigError::InvalidFadeDuration(_))
            ));
        }
        let config = BridgeConfig::builder().fade_duration_secs(0.0).build().unwrap();
        assert_eq!(config.fade_duration(), Duration::ZERO);
    }

    #[test]
    fn sub_second_keep_alive_is_rejected() {
        let err = BridgeConfig::builder()
            .keep_alive(Duration::from_millis(500))
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::InvalidKeepAlive(Duration::from_millis(500)));
        assert!(BridgeConfig::builder().keep_alive(Duration::ZERO).build().is_ok());
    }

    #[test]
    fn empty_fields_are_rejected() {
        assert_eq!(
            BridgeConfig::builder().mqtt_host(" ").build(),
            Err(ConfigError::Empty("MQTT host"))
        );
        assert_eq!(
            BridgeConfig::builder().base_topic("/").build(),
            Err(ConfigError::Empty("base topic"))
        );
        assert_eq!(
            BridgeConfig::builder().unique_id("").build(),
            Err(ConfigError::Empty("unique id"))
        );
    }
}
