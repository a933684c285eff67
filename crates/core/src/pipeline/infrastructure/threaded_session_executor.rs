use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::alert::domain::alarm_controller::AlarmController;
use crate::pipeline::detection_source::{DetectionSource, TimedDetections};
use crate::pipeline::eye_state_monitor::EyeStateMonitor;
use crate::pipeline::frame_sequencer::FrameSequencer;
use crate::pipeline::session_executor::{SessionConfig, SessionExecutor, SessionSummary};
use crate::pipeline::session_logger::SessionLogger;
use crate::shared::constants::DEFAULT_CHANNEL_CAPACITY;

type SendError = Box<dyn std::error::Error + Send + Sync>;

/// Executes a monitoring session with a dedicated thread for the source.
///
/// Layout: `source → main [sequence/monitor/alarm]`
///
/// The source can block on capture or disk I/O without stalling the
/// monitor; the bounded channel keeps it at most `channel_capacity` frames
/// ahead. All monitor state lives on the calling thread.
pub struct ThreadedSessionExecutor {
    channel_capacity: usize,
}

impl ThreadedSessionExecutor {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(channel_capacity: usize) -> Self {
        Self {
            channel_capacity: channel_capacity.max(1),
        }
    }
}

impl Default for ThreadedSessionExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionExecutor for ThreadedSessionExecutor {
    fn execute(
        &self,
        source: Box<dyn DetectionSource>,
        mut monitor: EyeStateMonitor,
        mut alarm: AlarmController,
        logger: &mut dyn SessionLogger,
        mut config: SessionConfig,
    ) -> Result<SessionSummary, Box<dyn std::error::Error>> {
        let (frame_tx, frame_rx) =
            crossbeam_channel::bounded::<Result<TimedDetections, SendError>>(self.channel_capacity);

        let reader_handle = spawn_reader(source, frame_tx, config.cancelled.clone());

        let result = run_main_loop(frame_rx, &mut monitor, &mut alarm, logger, &mut config);

        if let Err(e) = alarm.shutdown() {
            log::warn!("Failed to silence alarm at session end: {e}");
        }

        if config.cancelled.load(Ordering::Relaxed) && !reader_handle.is_finished() {
            // The reader may be parked inside the source (e.g. a read on an
            // idle pipe). It exits on its next frame, when the send fails.
            log::debug!("Session cancelled; not waiting for a blocked reader");
            return result;
        }

        match reader_handle.join() {
            Ok(mut source) => source.close(),
            Err(_) => {
                if result.is_ok() {
                    return Err("Reader thread panicked".into());
                }
            }
        }

        result
    }
}

fn spawn_reader(
    mut source: Box<dyn DetectionSource>,
    frame_tx: crossbeam_channel::Sender<Result<TimedDetections, SendError>>,
    cancelled: Arc<AtomicBool>,
) -> std::thread::JoinHandle<Box<dyn DetectionSource>> {
    std::thread::spawn(move || {
        for frame_result in source.frames() {
            if cancelled.load(Ordering::Relaxed) {
                break;
            }
            let mapped = frame_result.map_err(|e| -> SendError { e.to_string().into() });
            let failed = mapped.is_err();
            if frame_tx.send(mapped).is_err() || failed {
                break;
            }
        }
        source
    })
}

/// Runs the main thread loop: admit frames in timestamp order, run the
/// monitor, drive the alarm.
///
/// Alarm sink failures are logged and do not end the session; source
/// failures do.
fn run_main_loop(
    frame_rx: crossbeam_channel::Receiver<Result<TimedDetections, SendError>>,
    monitor: &mut EyeStateMonitor,
    alarm: &mut AlarmController,
    logger: &mut dyn SessionLogger,
    config: &mut SessionConfig,
) -> Result<SessionSummary, Box<dyn std::error::Error>> {
    let mut sequencer = FrameSequencer::new();
    let mut summary = SessionSummary::new(monitor.reported_state());

    for frame_result in frame_rx {
        if config.cancelled.load(Ordering::Relaxed) {
            break;
        }

        let timed =
            frame_result.map_err(|e| -> Box<dyn std::error::Error> { e.to_string().into() })?;
        let timestamp = timed.timestamp;

        if !sequencer.admit(timestamp) {
            summary.dropped += 1;
            logger.dropped(timestamp);
            continue;
        }

        let report = monitor.process_frame(&timed.detections, timestamp);
        summary.record(&report);
        logger.frame(timestamp, &report);

        match alarm.handle(&report) {
            Ok(Some(command)) => {
                summary.record_alarm(command);
                logger.alarm(timestamp, command);
            }
            Ok(None) => {}
            Err(e) => log::warn!("Alarm sink failed at {}ms: {e}", timestamp.as_millis()),
        }

        if let Some(callback) = config.on_report.as_mut() {
            if !callback(timestamp, &report) {
                config.cancelled.store(true, Ordering::Relaxed);
                break;
            }
        }
    }

    Ok(summary)
}
