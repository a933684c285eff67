use crate::alert::domain::alarm_controller::AlarmCommand;
use crate::alert::domain::alarm_sink::AlarmSink;

/// Alarm sink that reports alarm edges through the `log` facade.
///
/// Used when no audio output is wired in (trace replay, headless runs).
pub struct LogAlarmSink {
    label: String,
    activations: usize,
}

impl LogAlarmSink {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            activations: 0,
        }
    }

    /// Number of times the alarm has been started.
    pub fn activations(&self) -> usize {
        self.activations
    }
}

impl Default for LogAlarmSink {
    fn default() -> Self {
        Self::new("alarm")
    }
}

impl AlarmSink for LogAlarmSink {
    fn start(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.activations += 1;
        log::warn!("{}: {}", self.label, AlarmCommand::Sound);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        log::info!("{}: {}", self.label, AlarmCommand::Quiet);
        Ok(())
    }
}
