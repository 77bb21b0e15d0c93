// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The fade engine and its background task.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::{FadePhase, FadeRequest, SETTLED_EPSILON, TICK};
use crate::error::HardwareError;
use crate::hardware::ChannelWriter;
use crate::types::VoltageRange;

/// Capacity of the fault broadcast channel.
const FAULT_CHANNEL_CAPACITY: usize = 16;

/// A hardware failure that aborted a fade.
#[derive(Debug, Clone, PartialEq)]
pub struct FadeFault {
    /// The error reported by the channel writer.
    pub error: HardwareError,
    /// Voltage last written successfully, where the output was left.
    pub voltage: f32,
    /// Voltage the aborted fade was heading for.
    pub target: f32,
}

/// Drives both DAC channels through smooth, interruptible fades.
///
/// `FadeEngine` is cheaply cloneable; all clones share the same output.
/// Requests are synchronous and never block on the hardware: each one
/// spawns a task on the current tokio runtime, which waits for the
/// previous task to stop before writing.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use gp8413_light::fade::FadeEngine;
/// use gp8413_light::hardware::{Gp8413, open_bus, DEFAULT_ADDRESS};
/// use gp8413_light::types::VoltageRange;
///
/// # async fn example() -> gp8413_light::Result<()> {
/// let mut dac = Gp8413::new(open_bus(2, 3)?, DEFAULT_ADDRESS, VoltageRange::High);
/// dac.begin()?;
///
/// let engine = FadeEngine::new(dac, VoltageRange::High, Duration::from_millis(500));
/// engine.request_fade(7.5);
/// engine.wait_idle().await;
/// assert_eq!(engine.current_voltage(), 7.5);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct FadeEngine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    /// Everything a tick touches, behind one lock held for a single tick.
    state: Mutex<EngineState>,
    /// Output span.
    range: VoltageRange,
    /// Duration of a fade across the whole span.
    full_scale: Duration,
    /// Phase observers.
    phase_tx: watch::Sender<FadePhase>,
    /// Hardware fault subscribers.
    fault_tx: broadcast::Sender<FadeFault>,
}

struct EngineState {
    writer: Box<dyn ChannelWriter>,
    /// Voltage last written successfully to both channels.
    current_voltage: f32,
    /// Voltage of the most recent request.
    target_voltage: f32,
    /// Incremented by every request; a task whose generation is stale
    /// must not write.
    generation: u64,
    /// Task of the most recent request.
    active: Option<JoinHandle<()>>,
}

impl FadeEngine {
    /// Creates an engine driving `writer`.
    ///
    /// The output is assumed to be at 0 V until the first write.
    ///
    /// # Arguments
    ///
    /// * `writer` - Hardware channel writer
    /// * `range` - Output span, used to scale fade durations
    /// * `full_scale` - Duration of a fade across the whole span
    pub fn new(writer: impl ChannelWriter, range: VoltageRange, full_scale: Duration) -> Self {
        let (phase_tx, _) = watch::channel(FadePhase::Idle);
        let (fault_tx, _) = broadcast::channel(FAULT_CHANNEL_CAPACITY);
        let state = EngineState {
            writer: Box::new(writer),
            current_voltage: 0.0,
            target_voltage: 0.0,
            generation: 0,
            active: None,
        };
        Self {
            inner: Arc::new(EngineInner {
                state: Mutex::new(state),
                range,
                full_scale,
                phase_tx,
                fault_tx,
            }),
        }
    }

    /// Returns the output span.
    #[must_use]
    pub fn range(&self) -> VoltageRange {
        self.inner.range
    }

    /// Returns the voltage last written to the hardware.
    ///
    /// During a fade this is the most recent interpolated value.
    #[must_use]
    pub fn current_voltage(&self) -> f32 {
        self.inner.state.lock().current_voltage
    }

    /// Returns the target of the most recent request.
    #[must_use]
    pub fn target_voltage(&self) -> f32 {
        self.inner.state.lock().target_voltage
    }

    /// Returns the current phase.
    #[must_use]
    pub fn phase(&self) -> FadePhase {
        *self.inner.phase_tx.borrow()
    }

    /// Subscribes to hardware faults raised by fade tasks.
    #[must_use]
    pub fn subscribe_faults(&self) -> broadcast::Receiver<FadeFault> {
        self.inner.fault_tx.subscribe()
    }

    /// Starts a fade to `target_voltage`, superseding any fade in flight.
    ///
    /// If the output already sits at the target, both channels are written
    /// once with the target and no fade runs.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn request_fade(&self, target_voltage: f32) {
        let issued_at = Instant::now();
        let mut state = self.inner.state.lock();
        state.generation += 1;
        state.target_voltage = target_voltage;
        let generation = state.generation;

        let predecessor = state.active.take().filter(|task| !task.is_finished());
        let phase = if predecessor.is_some() {
            FadePhase::Cancelling
        } else {
            FadePhase::Fading
        };
        self.inner.phase_tx.send_replace(phase);

        tracing::debug!(
            target_voltage,
            generation,
            %phase,
            "Fade requested"
        );

        let inner = Arc::clone(&self.inner);
        state.active = Some(tokio::spawn(run_fade(
            inner,
            generation,
            target_voltage,
            issued_at,
            predecessor,
        )));
    }

    /// Waits until no fade is running.
    pub async fn wait_idle(&self) {
        let mut rx = self.inner.phase_tx.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = rx.wait_for(|phase| *phase == FadePhase::Idle).await;
    }
}

impl std::fmt::Debug for FadeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FadeEngine")
            .field("range", &self.inner.range)
            .field("full_scale", &self.inner.full_scale)
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}

impl EngineInner {
    /// Writes `volts` to both channels and records it on success.
    ///
    /// On failure the phase drops back to idle and the fault is broadcast.
    fn write(
        &self,
        state: &mut EngineState,
        volts: f32,
        target: f32,
    ) -> Result<(), HardwareError> {
        match state.writer.write_both(volts) {
            Ok(()) => {
                state.current_voltage = volts;
                Ok(())
            }
            Err(error) => {
                tracing::error!(
                    error = %error,
                    voltage = state.current_voltage,
                    target,
                    "DAC write failed, fade aborted"
                );
                self.phase_tx.send_replace(FadePhase::Idle);
                // No subscribers is fine; the error is already logged.
                let _ = self.fault_tx.send(FadeFault {
                    error: error.clone(),
                    voltage: state.current_voltage,
                    target,
                });
                Err(error)
            }
        }
    }
}

async fn run_fade(
    inner: Arc<EngineInner>,
    generation: u64,
    target: f32,
    issued_at: Instant,
    predecessor: Option<JoinHandle<()>>,
) {
    if let Some(task) = predecessor
        && let Err(e) = task.await
    {
        tracing::warn!(error = %e, "Previous fade task did not finish cleanly");
    }

    let request = {
        let mut state = inner.state.lock();
        if state.generation != generation {
            tracing::debug!(generation, "Fade superseded before it started");
            return;
        }

        let start = state.current_voltage;
        if (target - start).abs() < SETTLED_EPSILON {
            if inner.write(&mut state, target, target).is_ok() {
                inner.phase_tx.send_replace(FadePhase::Idle);
                tracing::debug!(voltage = target, "Output already at target, refreshed");
            }
            return;
        }

        inner.phase_tx.send_replace(FadePhase::Fading);
        FadeRequest::new(
            start,
            target,
            inner.range.max_volts(),
            inner.full_scale,
            issued_at,
        )
    };

    tracing::info!(
        from = request.start_voltage(),
        to = request.target_voltage(),
        duration_ms = request.duration().as_millis(),
        "Fade started"
    );

    let started = Instant::now();
    let mut ticker = tokio::time::interval_at(started + TICK, TICK);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        let mut state = inner.state.lock();
        if state.generation != generation {
            tracing::debug!(
                generation,
                voltage = state.current_voltage,
                "Fade superseded"
            );
            return;
        }

        let (volts, done) = request.voltage_at(started.elapsed());
        if inner.write(&mut state, volts, target).is_err() {
            return;
        }

        if done {
            inner.phase_tx.send_replace(FadePhase::Idle);
            tracing::info!(
                voltage = volts,
                latency_ms = request.issued_at().elapsed().as_millis(),
                "Fade complete"
            );
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::Channel;

    #[derive(Clone, Default)]
    struct SharedLog(Arc<Mutex<Vec<(Channel, f32)>>>);

    impl ChannelWriter for SharedLog {
        fn write(&mut self, channel: Channel, volts: f32) -> Result<(), HardwareError> {
            self.0.lock().push((channel, volts));
            Ok(())
        }
    }

    fn engine(log: &SharedLog) -> FadeEngine {
        FadeEngine::new(log.clone(), VoltageRange::High, Duration::from_secs(1))
    }

    #[tokio::test(start_paused = true)]
    async fn fresh_engine_is_idle_at_zero() {
        let engine = engine(&SharedLog::default());
        assert_eq!(engine.phase(), FadePhase::Idle);
        assert_eq!(engine.current_voltage(), 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn fade_completes_on_exact_target() {
        let log = SharedLog::default();
        let engine = engine(&log);

        engine.request_fade(3.3);
        assert_eq!(engine.target_voltage(), 3.3);
        engine.wait_idle().await;

        assert_eq!(engine.current_voltage(), 3.3);
        assert_eq!(log.0.lock().last(), Some(&(Channel::One, 3.3)));
    }

    #[tokio::test(start_paused = true)]
    async fn fade_takes_proportional_ticks() {
        let log = SharedLog::default();
        let engine = engine(&log);

        // 5 V of a 10 V span at 1 s full scale: 500 ms, 25 ticks
        engine.request_fade(5.0);
        engine.wait_idle().await;

        assert_eq!(log.0.lock().len(), 25 * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn phase_reports_fading() {
        let engine = engine(&SharedLog::default());
        engine.request_fade(10.0);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(engine.phase(), FadePhase::Fading);
        engine.wait_idle().await;
        assert_eq!(engine.phase(), FadePhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn superseding_request_enters_cancelling() {
        let engine = engine(&SharedLog::default());
        engine.request_fade(10.0);
        tokio::time::sleep(Duration::from_millis(100)).await;

        engine.request_fade(0.0);
        assert_eq!(engine.phase(), FadePhase::Cancelling);

        engine.wait_idle().await;
        assert_eq!(engine.current_voltage(), 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn same_target_writes_once() {
        let log = SharedLog::default();
        let engine = engine(&log);

        engine.request_fade(0.0);
        engine.wait_idle().await;

        assert_eq!(*log.0.lock(), vec![(Channel::Zero, 0.0), (Channel::One, 0.0)]);
    }
}
