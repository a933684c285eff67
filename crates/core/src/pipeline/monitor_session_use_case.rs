use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::alert::domain::alarm_controller::AlarmController;
use crate::pipeline::detection_source::DetectionSource;
use crate::pipeline::eye_state_monitor::EyeStateMonitor;
use crate::pipeline::session_logger::SessionLogger;

use super::session_executor::{ReportCallback, SessionConfig, SessionExecutor, SessionSummary};

/// Orchestrates one eye-state monitoring session.
///
/// Wires the source, monitor and alarm together and delegates execution to
/// a `SessionExecutor`. This is a single-use struct: `execute` consumes the
/// owned components, so calling it twice will fail.
pub struct MonitorSessionUseCase {
    source: Option<Box<dyn DetectionSource>>,
    monitor: Option<EyeStateMonitor>,
    alarm: Option<AlarmController>,
    executor: Box<dyn SessionExecutor>,
    on_report: Option<ReportCallback>,
    cancelled: Arc<AtomicBool>,
}

impl MonitorSessionUseCase {
    pub fn new(
        source: Box<dyn DetectionSource>,
        monitor: EyeStateMonitor,
        alarm: AlarmController,
        executor: Box<dyn SessionExecutor>,
        on_report: Option<ReportCallback>,
        cancelled: Option<Arc<AtomicBool>>,
    ) -> Self {
        Self {
            source: Some(source),
            monitor: Some(monitor),
            alarm: Some(alarm),
            executor,
            on_report,
            cancelled: cancelled.unwrap_or_else(|| Arc::new(AtomicBool::new(false))),
        }
    }

    /// Flag that stops the session when set from another thread.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    pub fn execute(
        &mut self,
        logger: &mut dyn SessionLogger,
    ) -> Result<SessionSummary, Box<dyn std::error::Error>> {
        let config = SessionConfig {
            on_report: self.on_report.take(),
            cancelled: self.cancelled.clone(),
        };

        let source = self.source.take().ok_or("Session already executed")?;
        let monitor = self.monitor.take().ok_or("Session already executed")?;
        let alarm = self.alarm.take().ok_or("Session already executed")?;

        logger.info("Monitoring session started");
        let summary = self.executor.execute(source, monitor, alarm, logger, config)?;
        logger.info(&format!(
            "Monitoring session finished: {} frames, final state {}",
            summary.frames, summary.final_state
        ));
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::infrastructure::log_alarm_sink::LogAlarmSink;
    use crate::pipeline::detection_source::TimedDetections;
    use crate::pipeline::infrastructure::threaded_session_executor::ThreadedSessionExecutor;
    use crate::pipeline::session_logger::{NullSessionLogger, StdoutSessionLogger};
    use crate::shared::detection_set::DetectionSet;
    use crate::shared::eye_state::EyeState;
    use crate::shared::rectangle::Rectangle;
    use std::sync::atomic::Ordering;
    use std::sync::Mutex;
    use std::time::Duration;

    // --- Stubs ---

    struct StubSource {
        frames: Vec<TimedDetections>,
    }

    impl DetectionSource for StubSource {
        fn frames(
            &mut self,
        ) -> Box<dyn Iterator<Item = Result<TimedDetections, Box<dyn std::error::Error>>> + '_>
        {
            Box::new(self.frames.drain(..).map(Ok))
        }
    }

    fn frames(states: &[(bool, u64)]) -> Vec<TimedDetections> {
        states
            .iter()
            .map(|&(eyes_visible, t)| {
                let mut set =
                    DetectionSet::new().with_faces(vec![Rectangle::new(50, 50, 100, 100)]);
                if eyes_visible {
                    set = set.with_eyes_general(vec![Rectangle::new(70, 80, 20, 20)]);
                }
                TimedDetections::new(Duration::from_millis(t), set)
            })
            .collect()
    }

    fn use_case(
        frames: Vec<TimedDetections>,
        on_report: Option<ReportCallback>,
    ) -> MonitorSessionUseCase {
        MonitorSessionUseCase::new(
            Box::new(StubSource { frames }),
            EyeStateMonitor::default(),
            AlarmController::new(Box::new(LogAlarmSink::default())),
            Box::new(ThreadedSessionExecutor::new()),
            on_report,
            None,
        )
    }

    #[test]
    fn test_runs_session_to_completion() {
        let mut uc = use_case(
            frames(&[(true, 0), (false, 100), (false, 300), (false, 700)]),
            None,
        );
        let mut logger = StdoutSessionLogger::new(10);

        let summary = uc.execute(&mut logger).unwrap();

        assert_eq!(summary.frames, 4);
        assert_eq!(summary.final_state, EyeState::Closed);
        assert_eq!(summary.alarms, 1);
        assert_eq!(logger.frames_in(EyeState::Closed), 1);
    }

    #[test]
    fn test_second_execute_fails() {
        let mut uc = use_case(frames(&[(true, 0)]), None);
        uc.execute(&mut NullSessionLogger).unwrap();
        let err = uc.execute(&mut NullSessionLogger).unwrap_err();
        assert!(err.to_string().contains("already executed"));
    }

    #[test]
    fn test_on_report_receives_every_frame() {
        let seen = Arc::new(Mutex::new(0usize));
        let seen_clone = seen.clone();
        let callback: ReportCallback = Box::new(move |_, _| {
            *seen_clone.lock().unwrap() += 1;
            true
        });
        let mut uc = use_case(frames(&[(true, 0), (true, 33), (true, 66)]), Some(callback));

        uc.execute(&mut NullSessionLogger).unwrap();
        assert_eq!(*seen.lock().unwrap(), 3);
    }

    #[test]
    fn test_cancel_handle_stops_session() {
        let mut uc = use_case(frames(&[(true, 0), (true, 33)]), None);
        uc.cancel_handle().store(true, Ordering::Relaxed);
        let summary = uc.execute(&mut NullSessionLogger).unwrap();
        assert_eq!(summary.frames, 0);
    }
}
