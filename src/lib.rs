// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `gp8413_light` - drive a DFRobot GP8413 DAC as a Home Assistant light.
//!
//! The GP8413 is a two-channel 15-bit I2C DAC with a 0-5 V or 0-10 V output,
//! commonly used to feed 1-10 V dimmable LED drivers. This crate turns it
//! into an MQTT light: Home Assistant discovers it, sends `ON`/`OFF` and
//! brightness commands, and the output fades smoothly between levels.
//!
//! # Architecture
//!
//! ```text
//!  MQTT ─► protocol::MqttBridge ─► controller::LightController
//!                                        │ LightCommand, LightState
//!                                        ▼
//!                   mapper ─► fade::FadeEngine ─► hardware::ChannelWriter
//!                                                        │
//!                                                  hardware::Gp8413 (I2C)
//! ```
//!
//! Both DAC channels always carry the same voltage. Brightness 0 maps to
//! 0 V; brightness 1..=255 maps linearly onto 1 V..=range max, skipping the
//! 0-1 V band that 1-10 V drivers treat as undefined.
//!
//! # Features
//!
//! - `mqtt` (default): the [`protocol`] module and its `rumqttc` bridge
//! - `linux` (default): [`hardware::open_bus`] on top of `linux-embedded-hal`
//!
//! # Quick Start
//!
//! ```no_run
//! use gp8413_light::config::BridgeConfig;
//! use gp8413_light::controller::LightController;
//! use gp8413_light::fade::FadeEngine;
//! use gp8413_light::hardware::{Gp8413, open_bus};
//! use gp8413_light::protocol::MqttBridge;
//!
//! #[tokio::main]
//! async fn main() -> gp8413_light::Result<()> {
//!     let config = BridgeConfig::builder()
//!         .mqtt_host("192.168.1.50")
//!         .fade_duration_secs(1.0)
//!         .build()?;
//!
//!     let (sda, scl) = config.pins();
//!     let mut dac = Gp8413::new(open_bus(sda, scl)?, config.address(), config.range());
//!     dac.begin()?;
//!
//!     let bridge = MqttBridge::new(config.clone())?;
//!     let engine = FadeEngine::new(dac, config.range(), config.fade_duration());
//!     let controller = LightController::new(engine, bridge.state_publisher());
//!
//!     bridge
//!         .run(controller, async {
//!             let _ = tokio::signal::ctrl_c().await;
//!         })
//!         .await
//! }
//! ```

pub mod command;
pub mod config;
pub mod controller;
pub mod discovery;
pub mod error;
pub mod fade;
pub mod hardware;
pub mod mapper;
#[cfg(feature = "mqtt")]
pub mod protocol;
pub mod state;
pub mod types;

pub use command::LightCommand;
pub use config::{BridgeConfig, BridgeConfigBuilder};
pub use controller::{LightController, StatePublisher};
pub use error::{ConfigError, Error, HardwareError, ParseError, ProtocolError, Result};
pub use fade::{FadeEngine, FadeFault, FadePhase};
pub use hardware::{Channel, ChannelWriter, Gp8413};
#[cfg(feature = "mqtt")]
pub use protocol::{MqttBridge, MqttStatePublisher};
pub use state::{LightState, LightStatus};
pub use types::{Brightness, PowerState, VoltageRange};
