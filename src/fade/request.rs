// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A single planned transition between two voltages.

use std::time::Duration;

use tokio::time::Instant;

use super::TICK;

/// A planned fade from `start_voltage` to `target_voltage`.
///
/// The duration is proportional to the size of the step: a full-range
/// change takes the configured full-scale duration, smaller changes take
/// proportionally less, and no fade is shorter than one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeRequest {
    start_voltage: f32,
    target_voltage: f32,
    duration: Duration,
    issued_at: Instant,
}

impl FadeRequest {
    /// Plans a fade between two voltages.
    ///
    /// # Arguments
    ///
    /// * `start_voltage` - Voltage last written to the hardware
    /// * `target_voltage` - Voltage to end on
    /// * `range_max` - Maximum voltage of the output span
    /// * `full_scale` - Duration of a fade across the whole span
    /// * `issued_at` - When the fade was requested
    #[must_use]
    pub fn new(
        start_voltage: f32,
        target_voltage: f32,
        range_max: f32,
        full_scale: Duration,
        issued_at: Instant,
    ) -> Self {
        let fraction = f64::from((target_voltage - start_voltage).abs() / range_max);
        let duration = full_scale.mul_f64(fraction.min(1.0)).max(TICK);
        Self {
            start_voltage,
            target_voltage,
            duration,
            issued_at,
        }
    }

    /// Voltage the fade starts from.
    #[must_use]
    pub fn start_voltage(&self) -> f32 {
        self.start_voltage
    }

    /// Voltage the fade ends on.
    #[must_use]
    pub fn target_voltage(&self) -> f32 {
        self.target_voltage
    }

    /// Length of the fade.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// When the fade was requested.
    #[must_use]
    pub fn issued_at(&self) -> Instant {
        self.issued_at
    }

    /// Returns the voltage `elapsed` into the fade, and whether the fade
    /// is complete.
    ///
    /// Interpolation is linear in time. Once `elapsed` reaches the
    /// duration the exact target is returned, never an approximation.
    #[must_use]
    pub fn voltage_at(&self, elapsed: Duration) -> (f32, bool) {
        if elapsed >= self.duration {
            return (self.target_voltage, true);
        }
        // Safe: the ratio is in [0, 1)
        #[allow(clippy::cast_possible_truncation)]
        let progress = (elapsed.as_secs_f64() / self.duration.as_secs_f64()) as f32;
        let volts = self.start_voltage + (self.target_voltage - self.start_voltage) * progress;
        (volts, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(start: f32, target: f32) -> FadeRequest {
        FadeRequest::new(start, target, 10.0, Duration::from_secs(1), Instant::now())
    }

    #[test]
    fn duration_scales_with_step_size() {
        assert_eq!(request(0.0, 10.0).duration(), Duration::from_secs(1));
        assert_eq!(request(10.0, 5.0).duration(), Duration::from_millis(500));
        assert_eq!(request(2.0, 4.5).duration(), Duration::from_millis(250));
    }

    #[test]
    fn tiny_steps_take_one_tick() {
        assert_eq!(request(5.0, 5.01).duration(), TICK);
    }

    #[test]
    fn interpolates_linearly() {
        let fade = request(0.0, 10.0);
        let (v, done) = fade.voltage_at(Duration::from_millis(250));
        assert!((v - 2.5).abs() < 1e-4);
        assert!(!done);

        let fade = request(8.0, 4.0);
        let (v, _) = fade.voltage_at(Duration::from_millis(200));
        assert!((v - 6.0).abs() < 1e-4);
    }

    #[test]
    fn never_overshoots_target() {
        let fade = request(1.0, 7.0);
        assert_eq!(fade.voltage_at(fade.duration()), (7.0, true));
        assert_eq!(fade.voltage_at(Duration::from_secs(10)), (7.0, true));
    }
}
