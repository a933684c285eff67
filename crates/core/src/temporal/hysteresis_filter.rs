use std::time::Duration;

use crate::shared::constants::DEFAULT_CLOSED_THRESHOLD;
use crate::shared::eye_state::EyeState;

/// Result of feeding one raw reading through a state filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FilterOutput {
    pub state: EyeState,
    pub previous: EyeState,
    pub transitioned: bool,
}

/// Domain interface for turning the raw per-frame state stream into the
/// reported state.
///
/// Timestamps must be non-decreasing across calls.
pub trait EyeStateFilter: Send {
    fn update(&mut self, raw: EyeState, now: Duration) -> FilterOutput;

    fn reported_state(&self) -> EyeState;

    /// Returns the filter to its session-start state.
    fn reset(&mut self);

    /// How long CLOSED evidence has been accumulating at `now`, if it is.
    fn pending_closed_for(&self, _now: Duration) -> Option<Duration> {
        None
    }
}

/// Mutable memory of the hysteresis machine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FilterState {
    pub reported: EyeState,
    /// Set iff CLOSED evidence is being accumulated.
    pub closed_candidate_since: Option<Duration>,
}

/// Asymmetric debounce: OPEN and NO FACE are reported on the frame they
/// appear, CLOSED only after raw CLOSED readings persist for
/// `closed_threshold`.
///
/// A blink yields a few CLOSED frames followed by OPEN, which clears the
/// pending evidence before CLOSED is ever reported.
pub struct HysteresisFilter {
    closed_threshold: Duration,
    state: FilterState,
}

impl HysteresisFilter {
    pub fn new(closed_threshold: Duration) -> Self {
        Self {
            closed_threshold,
            state: FilterState::default(),
        }
    }

    pub fn closed_threshold(&self) -> Duration {
        self.closed_threshold
    }

    pub fn state(&self) -> FilterState {
        self.state
    }

    pub fn closed_candidate_since(&self) -> Option<Duration> {
        self.state.closed_candidate_since
    }

    fn apply_closed(&mut self, now: Duration) {
        if self.state.reported == EyeState::Closed {
            return;
        }
        match self.state.closed_candidate_since {
            None => self.state.closed_candidate_since = Some(now),
            Some(since) if now.saturating_sub(since) >= self.closed_threshold => {
                self.state.reported = EyeState::Closed;
                self.state.closed_candidate_since = None;
            }
            Some(_) => {}
        }
    }
}

impl Default for HysteresisFilter {
    fn default() -> Self {
        Self::new(DEFAULT_CLOSED_THRESHOLD)
    }
}

impl EyeStateFilter for HysteresisFilter {
    fn update(&mut self, raw: EyeState, now: Duration) -> FilterOutput {
        let previous = self.state.reported;

        match raw {
            EyeState::Open | EyeState::NoFace => {
                self.state.reported = raw;
                self.state.closed_candidate_since = None;
            }
            EyeState::Closed => self.apply_closed(now),
        }

        FilterOutput {
            state: self.state.reported,
            previous,
            transitioned: self.state.reported != previous,
        }
    }

    fn reported_state(&self) -> EyeState {
        self.state.reported
    }

    fn reset(&mut self) {
        self.state = FilterState::default();
    }

    fn pending_closed_for(&self, now: Duration) -> Option<Duration> {
        self.state
            .closed_candidate_since
            .map(|since| now.saturating_sub(since))
    }
}
