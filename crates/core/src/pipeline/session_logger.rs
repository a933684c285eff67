use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::alert::domain::alarm_controller::AlarmCommand;
use crate::pipeline::eye_state_monitor::FrameReport;
use crate::shared::eye_state::EyeState;

/// Cross-cutting logger for monitoring-session events.
///
/// Decouples the session executor from specific output mechanisms so each
/// caller can observe a session without changing the orchestration code.
pub trait SessionLogger: Send {
    /// Record one processed frame.
    fn frame(&mut self, timestamp: Duration, report: &FrameReport);

    /// Record an alarm edge that reached the sink.
    fn alarm(&mut self, timestamp: Duration, command: AlarmCommand);

    /// Record a frame rejected for arriving out of order.
    fn dropped(&mut self, timestamp: Duration);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-session summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger that discards all events.
pub struct NullSessionLogger;

impl SessionLogger for NullSessionLogger {
    fn frame(&mut self, _timestamp: Duration, _report: &FrameReport) {}
    fn alarm(&mut self, _timestamp: Duration, _command: AlarmCommand) {}
    fn dropped(&mut self, _timestamp: Duration) {}
    fn info(&mut self, _message: &str) {}
}

/// CLI-oriented logger that tracks how long the subject spent in each
/// reported state and prints a summary at session end.
///
/// Progress output is throttled to every `throttle_frames` frames.
pub struct StdoutSessionLogger {
    throttle_frames: usize,
    frames: usize,
    frames_by_state: HashMap<EyeState, usize>,
    time_in_state: HashMap<EyeState, Duration>,
    last: Option<(Duration, EyeState)>,
    transitions: usize,
    alarms: usize,
    dropped: usize,
    start_time: Instant,
}

impl StdoutSessionLogger {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            frames: 0,
            frames_by_state: HashMap::new(),
            time_in_state: HashMap::new(),
            last: None,
            transitions: 0,
            alarms: 0,
            dropped: 0,
            start_time: Instant::now(),
        }
    }

    pub fn frames_in(&self, state: EyeState) -> usize {
        self.frames_by_state.get(&state).copied().unwrap_or(0)
    }

    /// Stream time attributed to `state`: each frame's state holds until the
    /// next frame's timestamp.
    pub fn time_in(&self, state: EyeState) -> Duration {
        self.time_in_state.get(&state).copied().unwrap_or_default()
    }

    /// Returns the formatted summary string, or `None` if no frames recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.frames == 0 {
            return None;
        }

        let stream_time: Duration = self.time_in_state.values().sum();
        let mut lines = vec![format!(
            "Session summary ({} frames, {} dropped, {} transitions, {} alarms):",
            self.frames, self.dropped, self.transitions, self.alarms
        )];

        for &state in EyeState::ALL {
            let time = self.time_in(state);
            let pct = if stream_time.is_zero() {
                0.0
            } else {
                time.as_secs_f64() / stream_time.as_secs_f64() * 100.0
            };
            lines.push(format!(
                "  {:8}: {:6} frames  {:8.1}s  ({pct:4.1}%)",
                state.to_string(),
                self.frames_in(state),
                time.as_secs_f64()
            ));
        }

        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            let fps = self.frames as f64 / elapsed;
            lines.push(format!("  Throughput: {fps:.1} fps"));
        }

        Some(lines.join("\n"))
    }
}

impl Default for StdoutSessionLogger {
    fn default() -> Self {
        Self::new(100)
    }
}

impl SessionLogger for StdoutSessionLogger {
    fn frame(&mut self, timestamp: Duration, report: &FrameReport) {
        if let Some((since, state)) = self.last {
            *self.time_in_state.entry(state).or_default() += timestamp.saturating_sub(since);
        }
        self.last = Some((timestamp, report.state));
        self.frames += 1;
        *self.frames_by_state.entry(report.state).or_default() += 1;

        if report.transitioned {
            self.transitions += 1;
            log::info!(
                "{:>8}ms  {} -> {}",
                timestamp.as_millis(),
                report.previous_state,
                report.state
            );
        }
        if self.frames % self.throttle_frames == 0 {
            log::debug!("Processed {} frames, state {}", self.frames, report.state);
        }
    }

    fn alarm(&mut self, timestamp: Duration, command: AlarmCommand) {
        if command == AlarmCommand::Sound {
            self.alarms += 1;
        }
        log::info!("{:>8}ms  {command}", timestamp.as_millis());
    }

    fn dropped(&mut self, _timestamp: Duration) {
        self.dropped += 1;
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}
