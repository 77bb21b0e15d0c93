// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command interpreter tying parsed commands to the fade engine.
//!
//! ```text
//! payload ─► LightCommand::parse ─► LightState::apply ─► target voltage
//!                                                            │
//!                    StatePublisher ◄── echo ── FadeEngine::request_fade
//! ```

use crate::command::LightCommand;
use crate::fade::FadeEngine;
use crate::state::{LightState, LightStatus};
use crate::types::PowerState;

/// Sink for state echoes.
///
/// Publishing is fire-and-forget: implementations log their own failures
/// and never block the caller.
pub trait StatePublisher: Send {
    /// Publishes the current light state.
    fn publish_state(&self, status: &LightStatus);
}

/// Interprets inbound commands for a single light.
///
/// Commands are applied strictly in the order they are handed in. Every
/// accepted command requests a fade and publishes the new state right
/// away, without waiting for the fade to finish.
#[derive(Debug)]
pub struct LightController<P> {
    state: LightState,
    engine: FadeEngine,
    publisher: P,
}

impl<P: StatePublisher> LightController<P> {
    /// Creates a controller in the startup state (off, brightness 255).
    pub fn new(engine: FadeEngine, publisher: P) -> Self {
        Self {
            state: LightState::new(),
            engine,
            publisher,
        }
    }

    /// Returns the commanded state.
    #[must_use]
    pub fn state(&self) -> LightState {
        self.state
    }

    /// Returns the fade engine.
    #[must_use]
    pub fn engine(&self) -> &FadeEngine {
        &self.engine
    }

    /// Handles a raw command payload.
    ///
    /// Malformed payloads are logged and dropped without touching state.
    /// Returns the accepted command, if any.
    pub fn handle(&mut self, payload: &[u8]) -> Option<LightCommand> {
        match LightCommand::parse(payload) {
            Ok(command) => {
                self.apply(command);
                Some(command)
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    payload = %String::from_utf8_lossy(payload),
                    "Ignoring light command"
                );
                None
            }
        }
    }

    /// Applies a parsed command: updates state, starts the fade, publishes.
    pub fn apply(&mut self, command: LightCommand) {
        self.state.apply(&command);
        let target = self.state.target_voltage(self.engine.range());
        tracing::info!(
            command = %command,
            state = %self.state.power(),
            brightness = %self.state.brightness(),
            target_voltage = target,
            "Light command applied"
        );
        self.engine.request_fade(target);
        self.publish();
    }

    /// Turns the light off.
    pub fn turn_off(&mut self) {
        self.apply(LightCommand::Power(PowerState::Off));
    }

    /// Re-drives the output to the commanded state.
    ///
    /// Used at startup so hardware and software agree even when the DAC
    /// kept a previous output across a restart.
    pub fn sync_output(&self) {
        self.engine
            .request_fade(self.state.target_voltage(self.engine.range()));
    }

    /// Publishes the current state.
    pub fn publish(&self) {
        self.publisher.publish_state(&self.state.status());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use parking_lot::Mutex;

    use super::*;
    use crate::error::HardwareError;
    use crate::hardware::{Channel, ChannelWriter};
    use crate::types::{Brightness, VoltageRange};

    struct NullWriter;

    impl ChannelWriter for NullWriter {
        fn write(&mut self, _: Channel, _: f32) -> Result<(), HardwareError> {
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct Published(Arc<Mutex<Vec<LightStatus>>>);

    impl StatePublisher for Published {
        fn publish_state(&self, status: &LightStatus) {
            self.0.lock().push(*status);
        }
    }

    fn controller() -> (LightController<Published>, Published) {
        let published = Published::default();
        let engine = FadeEngine::new(NullWriter, VoltageRange::High, Duration::from_millis(500));
        (LightController::new(engine, published.clone()), published)
    }

    #[tokio::test(start_paused = true)]
    async fn on_uses_default_brightness() {
        let (mut ctl, _) = controller();
        ctl.handle(b"ON");
        assert!(ctl.state().is_on());
        assert_eq!(ctl.state().brightness(), Brightness::MAX);
        assert_eq!(ctl.engine().target_voltage(), 10.0);
    }

    #[tokio::test(start_paused = true)]
    async fn off_targets_zero() {
        let (mut ctl, _) = controller();
        ctl.handle(b"ON\n128");
        ctl.handle(b"OFF");
        assert!(!ctl.state().is_on());
        assert_eq!(ctl.state().brightness(), Brightness::new(128));
        assert_eq!(ctl.engine().target_voltage(), 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn brightness_while_off_is_echoed_but_dark() {
        let (mut ctl, published) = controller();
        ctl.handle(b"64");
        assert!(!ctl.state().is_on());
        assert_eq!(ctl.state().brightness(), Brightness::new(64));
        assert_eq!(ctl.engine().target_voltage(), 0.0);
        assert_eq!(published.0.lock().last().unwrap().to_payload(), "OFF\n64");
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_payload_changes_nothing() {
        let (mut ctl, published) = controller();
        ctl.handle(b"ON\n30");
        let before = ctl.state();
        let target = ctl.engine().target_voltage();

        assert_eq!(ctl.handle(b"garbage"), None);
        assert_eq!(ctl.state(), before);
        assert_eq!(ctl.engine().target_voltage(), target);
        assert_eq!(published.0.lock().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn every_accepted_command_publishes_once() {
        let (mut ctl, published) = controller();
        ctl.handle(b"ON");
        ctl.handle(b"ON");
        ctl.handle(b"100");
        let payloads: Vec<String> = published
            .0
            .lock()
            .iter()
            .map(LightStatus::to_payload)
            .collect();
        assert_eq!(payloads, vec!["ON\n255", "ON\n255", "ON\n100"]);
    }

    #[tokio::test(start_paused = true)]
    async fn turn_off_settles_at_zero() {
        let (mut ctl, _) = controller();
        ctl.handle(b"ON");
        ctl.engine().wait_idle().await;
        ctl.turn_off();
        ctl.engine().wait_idle().await;
        assert_eq!(ctl.engine().current_voltage(), 0.0);
    }
}
