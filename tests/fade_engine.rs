// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Timing behaviour of the fade engine, run on a paused tokio clock.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use gp8413_light::error::HardwareError;
use gp8413_light::fade::{FadeEngine, FadePhase};
use gp8413_light::hardware::{Channel, ChannelWriter};
use gp8413_light::types::VoltageRange;
use parking_lot::Mutex;
use tokio::time::sleep;

/// Records every channel write; fails while `fail` is set.
#[derive(Clone, Default)]
struct Recorder {
    writes: Arc<Mutex<Vec<(Channel, f32)>>>,
    fail: Arc<AtomicBool>,
}

impl Recorder {
    fn writes(&self) -> Vec<(Channel, f32)> {
        self.writes.lock().clone()
    }

    /// Voltages written to channel 0, in order.
    fn trace(&self) -> Vec<f32> {
        self.writes
            .lock()
            .iter()
            .filter(|(channel, _)| *channel == Channel::Zero)
            .map(|(_, volts)| *volts)
            .collect()
    }
}

impl ChannelWriter for Recorder {
    fn write(&mut self, channel: Channel, volts: f32) -> Result<(), HardwareError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(HardwareError::Bus {
                address: 0x58,
                message: "NoAcknowledge(Address)".to_string(),
            });
        }
        self.writes.lock().push((channel, volts));
        Ok(())
    }
}

fn engine(recorder: &Recorder) -> FadeEngine {
    FadeEngine::new(recorder.clone(), VoltageRange::High, Duration::from_secs(1))
}

fn assert_lockstep(writes: &[(Channel, f32)]) {
    assert_eq!(writes.len() % 2, 0, "odd number of channel writes");
    for pair in writes.chunks(2) {
        assert_eq!(pair[0].0, Channel::Zero);
        assert_eq!(pair[1].0, Channel::One);
        assert_eq!(pair[0].1, pair[1].1, "channels diverged");
    }
}

mod idempotence {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn repeated_target_writes_exactly_one_more_pair() {
        let recorder = Recorder::default();
        let engine = engine(&recorder);

        engine.request_fade(5.0);
        engine.wait_idle().await;
        let before = recorder.writes().len();

        engine.request_fade(5.0);
        engine.wait_idle().await;

        let writes = recorder.writes();
        assert_eq!(writes.len(), before + 2);
        assert_eq!(writes[before..], [(Channel::Zero, 5.0), (Channel::One, 5.0)]);
        assert_eq!(engine.current_voltage(), 5.0);
    }
}

mod at_most_one_writer {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn rapid_fire_requests_never_interleave() {
        let recorder = Recorder::default();
        let engine = engine(&recorder);

        let targets = [1.0, 9.0, 3.0, 7.5, 2.2, 10.0, 0.0, 6.4];
        for target in targets.iter().cycle().take(60) {
            engine.request_fade(*target);
            sleep(Duration::from_millis(5)).await;
        }
        engine.request_fade(4.2);
        engine.wait_idle().await;

        assert_lockstep(&recorder.writes());
        assert_eq!(engine.current_voltage(), 4.2);
        assert_eq!(engine.phase(), FadePhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn interleaved_fades_stay_paired() {
        let recorder = Recorder::default();
        let engine = engine(&recorder);

        engine.request_fade(10.0);
        sleep(Duration::from_millis(130)).await;
        engine.request_fade(2.0);
        sleep(Duration::from_millis(70)).await;
        engine.request_fade(8.0);
        engine.wait_idle().await;

        assert_lockstep(&recorder.writes());
        assert_eq!(engine.current_voltage(), 8.0);
    }
}

mod cancellation {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn second_leg_starts_where_first_stopped() {
        let recorder = Recorder::default();
        let engine = engine(&recorder);

        engine.request_fade(10.0);
        sleep(Duration::from_millis(500)).await;
        engine.request_fade(0.0);
        engine.wait_idle().await;

        let trace = recorder.trace();
        let (peak_index, peak) = trace
            .iter()
            .copied()
            .enumerate()
            .fold((0, f32::MIN), |best, (i, v)| if v > best.1 { (i, v) } else { best });

        // Halfway through a 0 -> 10 V fade, give or take one tick
        assert!((4.6..=5.2).contains(&peak), "peak {peak}");

        let resume = trace[peak_index + 1];
        assert!(resume < peak);
        assert!(peak - resume <= 0.45, "second leg began at {resume}, peak {peak}");

        assert!(trace[..=peak_index].windows(2).all(|w| w[0] <= w[1]));
        assert!(trace[peak_index..].windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(engine.current_voltage(), 0.0);
    }
}

mod hardware_fault {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn fault_aborts_fade_and_is_broadcast() {
        let recorder = Recorder::default();
        let engine = engine(&recorder);
        let mut faults = engine.subscribe_faults();

        engine.request_fade(10.0);
        sleep(Duration::from_millis(210)).await;
        let last_good = engine.current_voltage();
        recorder.fail.store(true, Ordering::SeqCst);

        let fault = faults.recv().await.unwrap();
        assert!(matches!(fault.error, HardwareError::Bus { address: 0x58, .. }));
        assert_eq!(fault.target, 10.0);
        assert_eq!(fault.voltage, last_good);
        assert!(last_good > 0.0 && last_good < 10.0);

        engine.wait_idle().await;
        assert_eq!(engine.current_voltage(), last_good);
        assert_eq!(engine.phase(), FadePhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn later_request_resumes_from_last_good_voltage() {
        let recorder = Recorder::default();
        let engine = engine(&recorder);

        engine.request_fade(10.0);
        sleep(Duration::from_millis(210)).await;
        recorder.fail.store(true, Ordering::SeqCst);
        engine.wait_idle().await;
        let stuck_at = engine.current_voltage();
        let first_leg = recorder.trace().len();

        recorder.fail.store(false, Ordering::SeqCst);
        engine.request_fade(1.0);
        engine.wait_idle().await;

        let trace = recorder.trace();
        let resumed = trace[first_leg];
        assert!(resumed < stuck_at);
        assert!(stuck_at - resumed < 0.5, "resumed at {resumed}, stuck at {stuck_at}");
        assert_eq!(engine.current_voltage(), 1.0);
    }
}
