// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the GP8413 light bridge.
//!
//! Failures fall into four groups: configuration problems detected at
//! startup, hardware write failures raised by the DAC, inbound payloads that
//! cannot be understood, and MQTT communication errors.

use thiserror::Error;

/// The main error type for this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Startup configuration is invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The DAC rejected a write or could not be reached.
    #[error("hardware error: {0}")]
    Hardware(#[from] HardwareError),

    /// An inbound payload could not be parsed.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// An outbound MQTT message could not be prepared.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Errors detected while validating the startup configuration.
///
/// All of these are fatal: the bridge refuses to start.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// The voltage range is not one of the supported spans.
    #[error("invalid voltage range: {0} (expected 0-5V or 0-10V)")]
    InvalidRange(String),

    /// The SDA/SCL pair does not correspond to a hardware I2C bus.
    #[error("no I2C bus on SDA pin {sda} / SCL pin {scl}")]
    InvalidPins {
        /// BCM number of the data pin.
        sda: u8,
        /// BCM number of the clock pin.
        scl: u8,
    },

    /// The I2C address is outside the 7-bit non-reserved range.
    #[error("invalid I2C address {0:#04x} (expected 0x08..=0x77)")]
    InvalidAddress(u16),

    /// The I2C address is not a decimal or `0x`-prefixed hex number.
    #[error("malformed I2C address: {0:?}")]
    MalformedAddress(String),

    /// The fade duration is negative or not a finite number.
    #[error("invalid fade duration: {0}")]
    InvalidFadeDuration(f64),

    /// A required text field is empty.
    #[error("{0} must not be empty")]
    Empty(&'static str),

    /// The MQTT keep-alive is shorter than one second.
    #[error("invalid MQTT keep-alive: {0:?} (expected 0 or at least 1s)")]
    InvalidKeepAlive(std::time::Duration),

    /// A password was given without a username.
    #[error("MQTT password requires a username")]
    PasswordWithoutUsername,
}

/// Errors raised by the DAC channel writer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HardwareError {
    /// The I2C transaction failed.
    #[error("I2C write to {address:#04x} failed: {message}")]
    Bus {
        /// Device address of the failed transaction.
        address: u8,
        /// Description reported by the bus driver.
        message: String,
    },

    /// The DAC did not acknowledge its address during initialisation.
    #[error("no DAC answered at {0:#04x}")]
    NotFound(u8),

    /// The I2C bus device could not be opened.
    #[error("cannot open I2C bus {path}: {message}")]
    Open {
        /// Device node path.
        path: String,
        /// Description of the failure.
        message: String,
    },
}

/// Errors related to parsing inbound command payloads.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The payload matches none of the accepted command forms.
    #[error("malformed command payload: {0:?}")]
    MalformedCommand(String),

    /// The payload is not valid UTF-8.
    #[error("command payload is not valid UTF-8")]
    InvalidUtf8,
}

/// Errors preparing outbound MQTT messages.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Serialising an outbound document failed.
    #[error("JSON encode error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
