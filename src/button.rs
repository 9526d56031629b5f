//! Long-press detection.
//!
//! The button is sampled once per firmware tick. A press held for
//! [`HOLD_THRESHOLD`] produces exactly one long-press event; the detector
//! then stays quiet until the button is released and re-pressed.

use std::time::{Duration, Instant};

/// Hold duration that turns a press into a long-press event.
pub const HOLD_THRESHOLD: Duration = Duration::from_secs(3);

/// Source of raw button samples. `true` means pressed.
///
/// Implementations must be cheap to call: the controller also samples this
/// mid-wait to let a press abort a blocking reconnect.
pub trait ButtonInput {
    fn is_pressed(&mut self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HoldState {
    /// Button up.
    Released,
    /// Button down, waiting out the hold threshold.
    Armed { since: Instant },
    /// Event delivered; the rest of this hold is ignored.
    Fired,
}

/// Tick-polled long-press state machine.
#[derive(Debug)]
pub struct LongPressDetector {
    state: HoldState,
}

impl LongPressDetector {
    pub fn new() -> Self {
        Self {
            state: HoldState::Released,
        }
    }

    /// Feed one button sample. Returns `true` exactly once per hold that
    /// reaches the threshold.
    pub fn poll(&mut self, pressed: bool, now: Instant) -> bool {
        if !pressed {
            self.state = HoldState::Released;
            return false;
        }
        match self.state {
            HoldState::Released => {
                self.state = HoldState::Armed { since: now };
                false
            }
            HoldState::Armed { since } => {
                if now.duration_since(since) >= HOLD_THRESHOLD {
                    self.state = HoldState::Fired;
                    true
                } else {
                    false
                }
            }
            HoldState::Fired => false,
        }
    }
}

impl Default for LongPressDetector {
    fn default() -> Self {
        Self::new()
    }
}
