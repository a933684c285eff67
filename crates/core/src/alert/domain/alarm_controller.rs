use crate::pipeline::eye_state_monitor::FrameReport;
use crate::shared::eye_state::EyeState;

use super::alarm_sink::AlarmSink;

/// Command derived from a reported-state transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlarmCommand {
    Sound,
    Quiet,
}

impl AlarmCommand {
    /// Start on entering CLOSED, stop on entering OPEN or NO FACE, nothing
    /// on frames that did not transition.
    pub fn for_report(report: &FrameReport) -> Option<Self> {
        if !report.transitioned {
            return None;
        }
        match report.state {
            EyeState::Closed => Some(AlarmCommand::Sound),
            EyeState::Open | EyeState::NoFace => Some(AlarmCommand::Quiet),
        }
    }

    pub fn as_message(&self) -> &'static str {
        match self {
            AlarmCommand::Sound => "SOUND ALARM",
            AlarmCommand::Quiet => "QUIET ALARM",
        }
    }
}

impl std::fmt::Display for AlarmCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_message())
    }
}

/// Drives an `AlarmSink` from the monitor's frame reports.
///
/// Tracks whether the alarm is sounding so the sink sees at most one
/// `start` per CLOSED episode and no `stop` while already silent.
pub struct AlarmController {
    sink: Box<dyn AlarmSink>,
    sounding: bool,
}

impl AlarmController {
    pub fn new(sink: Box<dyn AlarmSink>) -> Self {
        Self {
            sink,
            sounding: false,
        }
    }

    pub fn is_sounding(&self) -> bool {
        self.sounding
    }

    /// Applies the command implied by `report`, returning it if the sink was
    /// actually driven.
    pub fn handle(
        &mut self,
        report: &FrameReport,
    ) -> Result<Option<AlarmCommand>, Box<dyn std::error::Error>> {
        match AlarmCommand::for_report(report) {
            Some(command) => self.apply(command),
            None => Ok(None),
        }
    }

    pub fn apply(
        &mut self,
        command: AlarmCommand,
    ) -> Result<Option<AlarmCommand>, Box<dyn std::error::Error>> {
        match (command, self.sounding) {
            (AlarmCommand::Sound, false) => {
                self.sink.start()?;
                self.sounding = true;
                Ok(Some(command))
            }
            (AlarmCommand::Quiet, true) => {
                self.sink.stop()?;
                self.sounding = false;
                Ok(Some(command))
            }
            _ => Ok(None),
        }
    }

    /// Silences the alarm at session end.
    pub fn shutdown(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.apply(AlarmCommand::Quiet).map(|_| ())
    }
}
