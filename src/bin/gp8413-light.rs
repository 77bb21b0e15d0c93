// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Home Assistant MQTT light daemon for the GP8413 DAC.

use anyhow::{Context, Result};
use clap::Parser;
use gp8413_light::config::{
    BridgeConfig, DEFAULT_BASE_TOPIC, DEFAULT_DISCOVERY_PREFIX, parse_address,
};
use gp8413_light::controller::LightController;
use gp8413_light::fade::FadeEngine;
use gp8413_light::hardware::{Gp8413, open_bus};
use gp8413_light::protocol::MqttBridge;
use gp8413_light::types::VoltageRange;
use tokio::signal::unix::{SignalKind, signal};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Expose a GP8413 DAC to Home Assistant as a dimmable MQTT light")]
struct Params {
    /// MQTT broker host name or address
    #[arg(long, env = "GP8413_MQTT_HOST", default_value = "localhost")]
    mqtt_host: String,
    /// MQTT broker port
    #[arg(long, env = "GP8413_MQTT_PORT", default_value_t = 1883)]
    mqtt_port: u16,
    /// MQTT username
    #[arg(long, env = "GP8413_MQTT_USERNAME")]
    mqtt_username: Option<String>,
    /// MQTT password (requires a username)
    #[arg(long, env = "GP8413_MQTT_PASSWORD", hide_env_values = true)]
    mqtt_password: Option<String>,
    /// MQTT keep-alive in seconds (0 disables)
    #[arg(long, env = "GP8413_MQTT_KEEP_ALIVE", default_value_t = 60)]
    mqtt_keep_alive: u64,
    /// Base topic for command, state and availability topics
    #[arg(long, env = "GP8413_MQTT_TOPIC", default_value = DEFAULT_BASE_TOPIC)]
    mqtt_topic: String,
    /// Home Assistant discovery prefix
    #[arg(long, env = "GP8413_DISCOVERY_PREFIX", default_value = DEFAULT_DISCOVERY_PREFIX)]
    discovery_prefix: String,
    /// Device name shown in Home Assistant
    #[arg(long, env = "GP8413_DEVICE_NAME", default_value = "GP8413 Light")]
    device_name: String,
    /// Unique id of the light entity
    #[arg(long, env = "GP8413_UNIQUE_ID", default_value = "gp8413_light")]
    unique_id: String,
    /// Output span: 0-5V or 0-10V
    #[arg(long, env = "GP8413_RANGE", default_value = "0-10V")]
    range: VoltageRange,
    /// BCM number of the SDA pin
    #[arg(long, env = "GP8413_SDA_PIN", default_value_t = 2)]
    sda_pin: u8,
    /// BCM number of the SCL pin
    #[arg(long, env = "GP8413_SCL_PIN", default_value_t = 3)]
    scl_pin: u8,
    /// I2C address, decimal or 0x-prefixed hex
    #[arg(long, env = "GP8413_ADDRESS", default_value = "0x58", value_parser = parse_address)]
    address: u8,
    /// Seconds to fade across the whole span
    #[arg(long, env = "GP8413_FADE_DURATION", default_value_t = 0.5)]
    fade_duration: f64,
}

impl Params {
    fn into_config(self) -> Result<BridgeConfig> {
        let mut builder = BridgeConfig::builder()
            .mqtt_host(self.mqtt_host)
            .mqtt_port(self.mqtt_port)
            .keep_alive(std::time::Duration::from_secs(self.mqtt_keep_alive))
            .base_topic(self.mqtt_topic)
            .discovery_prefix(self.discovery_prefix)
            .device_name(self.device_name)
            .unique_id(self.unique_id)
            .range(self.range)
            .pins(self.sda_pin, self.scl_pin)
            .address(u16::from(self.address))
            .fade_duration_secs(self.fade_duration);
        if let Some(username) = self.mqtt_username {
            builder = builder.username(username);
        }
        if let Some(password) = self.mqtt_password {
            builder = builder.password(password);
        }
        Ok(builder.build()?)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Params::parse().into_config()?;
    let (sda, scl) = config.pins();

    let mut dac = Gp8413::new(open_bus(sda, scl)?, config.address(), config.range());
    dac.begin()
        .with_context(|| format!("GP8413 not found at {:#04x}", config.address()))?;

    let bridge = MqttBridge::new(config.clone())?;
    let engine = FadeEngine::new(dac, config.range(), config.fade_duration());
    let controller = LightController::new(engine, bridge.state_publisher());

    bridge.run(controller, shutdown_signal()).await?;
    Ok(())
}

/// Completes on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(terminate) => terminate,
        Err(e) => {
            tracing::warn!(error = %e, "Cannot listen for SIGTERM, using Ctrl-C only");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = terminate.recv() => {}
    }
}
