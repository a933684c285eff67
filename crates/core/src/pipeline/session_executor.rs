use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::alert::domain::alarm_controller::{AlarmCommand, AlarmController};
use crate::pipeline::detection_source::DetectionSource;
use crate::pipeline::eye_state_monitor::{EyeStateMonitor, FrameReport};
use crate::pipeline::session_logger::SessionLogger;
use crate::shared::eye_state::EyeState;

/// Per-frame observer. Returning `false` ends the session after the
/// current frame.
pub type ReportCallback = Box<dyn FnMut(Duration, &FrameReport) -> bool + Send>;

/// Configuration for one monitoring session run.
pub struct SessionConfig {
    pub on_report: Option<ReportCallback>,
    pub cancelled: Arc<AtomicBool>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            on_report: None,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }
}

/// Counters describing a finished session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub frames: usize,
    pub dropped: usize,
    pub transitions: usize,
    pub alarms: usize,
    pub final_state: EyeState,
}

impl SessionSummary {
    pub fn new(initial_state: EyeState) -> Self {
        Self {
            frames: 0,
            dropped: 0,
            transitions: 0,
            alarms: 0,
            final_state: initial_state,
        }
    }

    pub fn record(&mut self, report: &FrameReport) {
        self.frames += 1;
        if report.transitioned {
            self.transitions += 1;
        }
        self.final_state = report.state;
    }

    pub fn record_alarm(&mut self, command: AlarmCommand) {
        if command == AlarmCommand::Sound {
            self.alarms += 1;
        }
    }
}

/// Abstracts how the source → monitor → alarm session is executed.
///
/// This is a port. Infrastructure provides concrete implementations.
pub trait SessionExecutor: Send {
    fn execute(
        &self,
        source: Box<dyn DetectionSource>,
        monitor: EyeStateMonitor,
        alarm: AlarmController,
        logger: &mut dyn SessionLogger,
        config: SessionConfig,
    ) -> Result<SessionSummary, Box<dyn std::error::Error>>;
}
