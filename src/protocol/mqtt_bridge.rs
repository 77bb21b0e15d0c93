// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Broker connection and event loop.

use std::future::Future;
use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, LastWill, MqttOptions, Outgoing, Packet, QoS};
use tokio::sync::broadcast::error::RecvError;

use super::{PAYLOAD_OFFLINE, PAYLOAD_ONLINE};
use crate::config::BridgeConfig;
use crate::controller::{LightController, StatePublisher};
use crate::discovery::DiscoveryDocument;
use crate::error::ProtocolError;
use crate::state::LightStatus;

/// Pause after an event loop error before polling again.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Extra time granted to the shutdown fade on top of the full-scale duration.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// Upper bound for flushing the final publishes before disconnecting.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Capacity of the client request channel.
const REQUEST_CHANNEL_CAPACITY: usize = 16;

/// Publishes state echoes to `<base>/state`.
///
/// Uses `try_publish` so it can be called from the event loop task itself
/// without waiting on the request channel.
#[derive(Debug, Clone)]
pub struct MqttStatePublisher {
    client: AsyncClient,
    topic: String,
}

impl MqttStatePublisher {
    /// Returns the state topic.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }
}

impl StatePublisher for MqttStatePublisher {
    fn publish_state(&self, status: &LightStatus) {
        let payload = status.to_payload();
        match self
            .client
            .try_publish(&self.topic, QoS::AtLeastOnce, true, payload.as_bytes())
        {
            Ok(()) => tracing::debug!(topic = %self.topic, payload = %payload, "State published"),
            Err(e) => tracing::warn!(topic = %self.topic, error = %e, "Failed to publish state"),
        }
    }
}

/// MQTT connection serving one light.
///
/// The event loop runs inside [`run`](Self::run), on the task that owns the
/// controller, so commands are handled strictly in arrival order.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use gp8413_light::config::BridgeConfig;
/// use gp8413_light::controller::LightController;
/// use gp8413_light::fade::FadeEngine;
/// use gp8413_light::hardware::{Gp8413, open_bus};
/// use gp8413_light::protocol::MqttBridge;
///
/// # async fn example() -> gp8413_light::Result<()> {
/// let config = BridgeConfig::builder().mqtt_host("192.168.1.50").build()?;
/// let (sda, scl) = config.pins();
/// let mut dac = Gp8413::new(open_bus(sda, scl)?, config.address(), config.range());
/// dac.begin()?;
///
/// let bridge = MqttBridge::new(config.clone())?;
/// let engine = FadeEngine::new(dac, config.range(), config.fade_duration());
/// let controller = LightController::new(engine, bridge.state_publisher());
///
/// bridge.run(controller, async { let _ = tokio::signal::ctrl_c().await; }).await?;
/// # Ok(())
/// # }
/// ```
pub struct MqttBridge {
    client: AsyncClient,
    event_loop: EventLoop,
    config: BridgeConfig,
    discovery: String,
}

impl MqttBridge {
    /// Prepares the connection. Nothing is sent until [`run`](Self::run).
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Json`] if the discovery document cannot be
    /// encoded.
    pub fn new(config: BridgeConfig) -> Result<Self, ProtocolError> {
        let discovery = DiscoveryDocument::for_config(&config).to_json()?;

        let mut options =
            MqttOptions::new(config.client_id(), config.mqtt_host(), config.mqtt_port());
        options.set_keep_alive(config.keep_alive());
        options.set_clean_session(true);
        options.set_last_will(LastWill::new(
            config.availability_topic(),
            PAYLOAD_OFFLINE,
            QoS::AtLeastOnce,
            true,
        ));
        if let Some((username, password)) = config.credentials() {
            options.set_credentials(username, password);
        }

        let (client, event_loop) = AsyncClient::new(options, REQUEST_CHANNEL_CAPACITY);

        Ok(Self {
            client,
            event_loop,
            config,
            discovery,
        })
    }

    /// Returns a state publisher sharing this connection.
    #[must_use]
    pub fn state_publisher(&self) -> MqttStatePublisher {
        MqttStatePublisher {
            client: self.client.clone(),
            topic: self.config.state_topic(),
        }
    }

    /// Runs the event loop until `shutdown` completes or a fade fails.
    ///
    /// The output is first driven to the controller's state. On shutdown
    /// the light is turned off, the fade is given `fade_duration + 1 s` to
    /// settle, `offline` is published and the connection is closed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Hardware`](crate::Error::Hardware) when a fade is
    /// aborted by the DAC. The bridge publishes `offline` first.
    pub async fn run<P, F>(
        self,
        mut controller: LightController<P>,
        shutdown: F,
    ) -> crate::Result<()>
    where
        P: StatePublisher,
        F: Future<Output = ()>,
    {
        let Self {
            client,
            mut event_loop,
            config,
            discovery,
        } = self;
        let command_topic = config.command_topic();
        let mut faults = controller.engine().subscribe_faults();

        controller.sync_output();

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                () = &mut shutdown => {
                    tracing::info!("Shutdown requested");
                    break;
                }
                fault = faults.recv() => match fault {
                    Ok(fault) => {
                        tracing::error!(
                            error = %fault.error,
                            voltage = fault.voltage,
                            target = fault.target,
                            "DAC write failed, stopping bridge"
                        );
                        publish_availability(&client, &config, false);
                        close(&client, &mut event_loop).await;
                        return Err(fault.error.into());
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Missed fade faults");
                    }
                    Err(RecvError::Closed) => break,
                },
                event = event_loop.poll() => match event {
                    Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                        tracing::info!(
                            host = %config.mqtt_host(),
                            port = config.mqtt_port(),
                            code = ?ack.code,
                            "Connected to MQTT broker"
                        );
                        on_connect(&client, &config, &discovery, &command_topic);
                        controller.publish();
                    }
                    Ok(Event::Incoming(Packet::SubAck(suback))) => {
                        tracing::debug!(?suback, "Subscription acknowledged");
                    }
                    Ok(Event::Incoming(Packet::Publish(publish))) => {
                        if publish.topic == command_topic {
                            tracing::debug!(
                                topic = %publish.topic,
                                payload = %String::from_utf8_lossy(&publish.payload),
                                "Command received"
                            );
                            controller.handle(&publish.payload);
                        } else {
                            tracing::debug!(
                                topic = %publish.topic,
                                "Ignoring message on foreign topic"
                            );
                        }
                    }
                    Ok(Event::Incoming(Packet::Disconnect)) => {
                        tracing::warn!("Broker closed the connection");
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::error!(error = %e, "MQTT event loop error, reconnecting");
                        tokio::time::sleep(RECONNECT_DELAY).await;
                    }
                },
            }
        }

        controller.turn_off();
        let settle = config.fade_duration() + SHUTDOWN_GRACE;
        if tokio::time::timeout(settle, controller.engine().wait_idle())
            .await
            .is_err()
        {
            tracing::warn!(?settle, "Output did not settle before shutdown");
        }
        publish_availability(&client, &config, false);
        close(&client, &mut event_loop).await;
        tracing::info!("Bridge stopped");
        Ok(())
    }
}

impl std::fmt::Debug for MqttBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MqttBridge")
            .field("host", &self.config.mqtt_host())
            .field("port", &self.config.mqtt_port())
            .field("base_topic", &self.config.base_topic())
            .finish_non_exhaustive()
    }
}

/// Subscribes and announces the light after every (re)connect.
fn on_connect(client: &AsyncClient, config: &BridgeConfig, discovery: &str, command_topic: &str) {
    if let Err(e) = client.try_subscribe(command_topic, QoS::AtLeastOnce) {
        tracing::error!(topic = %command_topic, error = %e, "Failed to subscribe");
    } else {
        tracing::debug!(topic = %command_topic, "Subscribed to command topic");
    }

    let topic = config.discovery_topic();
    if let Err(e) = client.try_publish(&topic, QoS::AtLeastOnce, true, discovery.as_bytes()) {
        tracing::warn!(topic = %topic, error = %e, "Failed to publish discovery document");
    }

    publish_availability(client, config, true);
}

fn publish_availability(client: &AsyncClient, config: &BridgeConfig, online: bool) {
    let topic = config.availability_topic();
    let payload = if online { PAYLOAD_ONLINE } else { PAYLOAD_OFFLINE };
    if let Err(e) = client.try_publish(&topic, QoS::AtLeastOnce, true, payload) {
        tracing::warn!(topic = %topic, error = %e, "Failed to publish availability");
    }
}

/// Requests a disconnect and polls until it has been sent.
async fn close(client: &AsyncClient, event_loop: &mut EventLoop) {
    if let Err(e) = client.try_disconnect() {
        tracing::warn!(error = %e, "Failed to request disconnect");
        return;
    }
    let drain = async {
        loop {
            match event_loop.poll().await {
                Ok(Event::Outgoing(Outgoing::Disconnect)) | Err(_) => break,
                Ok(_) => {}
            }
        }
    };
    if tokio::time::timeout(DRAIN_TIMEOUT, drain).await.is_err() {
        tracing::warn!("Timed out flushing MQTT connection");
    }
}
