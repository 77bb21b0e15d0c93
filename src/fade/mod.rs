// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Interruptible background fades between output voltages.
//!
//! The [`FadeEngine`] owns the voltage last written to the DAC and runs at
//! most one fade task at a time. A new request always supersedes the fade
//! in flight: the old task stops at its next tick, and the new one starts
//! from wherever the output physically was.
//!
//! ```text
//!   request_fade ──► Cancelling ──(predecessor stopped)──► Fading ──► Idle
//!        │                                                   ▲
//!        └──────────(nothing in flight)──────────────────────┘
//! ```

mod engine;
mod request;

pub use engine::{FadeEngine, FadeFault};
pub use request::FadeRequest;

use std::fmt;
use std::time::Duration;

/// Interval between two interpolated writes (50 Hz).
pub const TICK: Duration = Duration::from_millis(20);

/// Voltage difference below which a fade is skipped.
pub const SETTLED_EPSILON: f32 = 1e-4;

/// Lifecycle phase of the fade engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FadePhase {
    /// No fade running; the output is stable.
    #[default]
    Idle,
    /// A fade task is writing interpolated voltages.
    Fading,
    /// A new request is waiting for the previous fade to stop.
    Cancelling,
}

impl fmt::Display for FadePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Fading => "fading",
            Self::Cancelling => "cancelling",
        };
        f.write_str(name)
    }
}
