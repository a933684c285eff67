use std::time::Duration;

use serde::Serialize;

use crate::classification::raw_state_classifier::classify;
use crate::config::monitor_config::MonitorConfig;
use crate::detection::domain::face_selector::select_primary_face;
use crate::detection::domain::overlap_deduplicator::OverlapDeduplicator;
use crate::shared::detection_set::DetectionSet;
use crate::shared::eye_state::EyeState;
use crate::shared::rectangle::Rectangle;
use crate::temporal::hysteresis_filter::{EyeStateFilter, HysteresisFilter};

/// Per-frame output of the monitor.
///
/// `state` and `transitioned` are what downstream consumers act on; the
/// remaining fields describe how the frame was interpreted.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FrameReport {
    pub state: EyeState,
    pub previous_state: EyeState,
    pub transitioned: bool,
    pub raw_state: EyeState,
    pub face_count: usize,
    pub eyes: Vec<Rectangle>,
    pub primary_face: Option<Rectangle>,
}

impl FrameReport {
    pub fn eye_count(&self) -> usize {
        self.eyes.len()
    }
}

/// Per-frame entry point: dedup → classify → debounce.
///
/// Holds no memory of its own beyond the filter, so one monitor per
/// subject/session. Frames must arrive with non-decreasing timestamps.
pub struct EyeStateMonitor {
    eye_dedup: OverlapDeduplicator,
    face_dedup: OverlapDeduplicator,
    filter: Box<dyn EyeStateFilter>,
}

impl EyeStateMonitor {
    pub fn new(config: &MonitorConfig) -> Self {
        Self::with_parts(
            OverlapDeduplicator::new(config.overlap_threshold),
            OverlapDeduplicator::new(config.face_overlap_threshold),
            Box::new(HysteresisFilter::new(config.closed_threshold())),
        )
    }

    pub fn with_parts(
        eye_dedup: OverlapDeduplicator,
        face_dedup: OverlapDeduplicator,
        filter: Box<dyn EyeStateFilter>,
    ) -> Self {
        Self {
            eye_dedup,
            face_dedup,
            filter,
        }
    }

    pub fn process_frame(&mut self, detections: &DetectionSet, now: Duration) -> FrameReport {
        let eyes = self.eye_dedup.deduplicate_eyes(
            &detections.eyes_general,
            &detections.eyes_left,
            &detections.eyes_right,
        );
        let faces = self.face_dedup.deduplicate(&detections.faces);
        let face_count = face_presence_count(&detections.faces, &faces);

        let raw_state = classify(face_count, eyes.len());
        let output = self.filter.update(raw_state, now);

        if output.transitioned {
            log::debug!(
                "Eye state {} -> {} at {}ms ({} faces, {} eyes)",
                output.previous,
                output.state,
                now.as_millis(),
                face_count,
                eyes.len()
            );
        }

        FrameReport {
            state: output.state,
            previous_state: output.previous,
            transitioned: output.transitioned,
            raw_state,
            face_count,
            primary_face: select_primary_face(&faces, detections.frame_size),
            eyes,
        }
    }

    pub fn reported_state(&self) -> EyeState {
        self.filter.reported_state()
    }

    pub fn pending_closed_for(&self, now: Duration) -> Option<Duration> {
        self.filter.pending_closed_for(now)
    }

    /// Starts a new session: forgets all accumulated evidence.
    pub fn reset(&mut self) {
        self.filter.reset();
    }
}

impl Default for EyeStateMonitor {
    fn default() -> Self {
        Self::new(&MonitorConfig::default())
    }
}

/// Face presence follows the raw detector output; dedup only refines the
/// count. Malformed-only face lists still count as present.
fn face_presence_count(raw: &[Rectangle], deduped: &[Rectangle]) -> usize {
    if raw.is_empty() {
        0
    } else {
        deduped.len().max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn face() -> Rectangle {
        Rectangle::new(100, 100, 50, 50)
    }

    fn eye_at(x: i32) -> Rectangle {
        Rectangle::new(x, 110, 10, 10)
    }

    fn open_frame() -> DetectionSet {
        DetectionSet::new()
            .with_faces(vec![face()])
            .with_eyes_general(vec![eye_at(110), eye_at(130)])
    }

    fn closed_frame() -> DetectionSet {
        DetectionSet::new().with_faces(vec![face()])
    }

    #[test]
    fn test_no_face_regardless_of_eyes() {
        let mut monitor = EyeStateMonitor::default();
        let set = DetectionSet::new().with_eyes_general(vec![eye_at(110), eye_at(130)]);
        let report = monitor.process_frame(&set, ms(0));
        assert_eq!(report.raw_state, EyeState::NoFace);
        assert_eq!(report.state, EyeState::NoFace);
        assert!(!report.transitioned);
    }

    #[test]
    fn test_two_eyes_open_immediately() {
        let mut monitor = EyeStateMonitor::default();
        let report = monitor.process_frame(&open_frame(), ms(0));
        assert_eq!(report.state, EyeState::Open);
        assert_eq!(report.previous_state, EyeState::NoFace);
        assert!(report.transitioned);
        assert_eq!(report.eye_count(), 2);
        assert_eq!(report.face_count, 1);
    }

    #[test]
    fn test_one_eye_counts_as_open() {
        let mut monitor = EyeStateMonitor::default();
        let set = closed_frame().with_eyes_general(vec![eye_at(110)]);
        assert_eq!(monitor.process_frame(&set, ms(0)).state, EyeState::Open);
    }

    #[test]
    fn test_left_and_right_eyes_fuse_to_open() {
        let mut monitor = EyeStateMonitor::default();
        let set = closed_frame()
            .with_eyes_left(vec![eye_at(110)])
            .with_eyes_right(vec![eye_at(130)]);
        let report = monitor.process_frame(&set, ms(0));
        assert_eq!(report.state, EyeState::Open);
        assert_eq!(report.eye_count(), 2);
    }

    #[test]
    fn test_same_eye_from_two_detectors_counts_once() {
        let mut monitor = EyeStateMonitor::default();
        let set = closed_frame()
            .with_eyes_general(vec![Rectangle::new(110, 110, 12, 12)])
            .with_eyes_left(vec![Rectangle::new(111, 111, 10, 10)]);
        let report = monitor.process_frame(&set, ms(0));
        assert_eq!(report.eye_count(), 1);
        assert_eq!(report.raw_state, EyeState::Open);
        assert_eq!(report.state, EyeState::Open);
    }

    #[test]
    fn test_sustained_closed_reports_closed_once() {
        let mut monitor = EyeStateMonitor::default();
        let frames = [
            (open_frame(), 0),
            (closed_frame(), 0),
            (closed_frame(), 200),
            (closed_frame(), 600),
            (closed_frame(), 700),
        ];
        let reports: Vec<FrameReport> = frames
            .iter()
            .map(|(set, t)| monitor.process_frame(set, ms(*t)))
            .collect();

        let states: Vec<EyeState> = reports.iter().map(|r| r.state).collect();
        assert_eq!(
            states,
            vec![
                EyeState::Open,
                EyeState::Open,
                EyeState::Open,
                EyeState::Closed,
                EyeState::Closed
            ]
        );
        let transitions: Vec<bool> = reports.iter().map(|r| r.transitioned).collect();
        assert_eq!(transitions, vec![true, false, false, true, false]);
    }

    #[test]
    fn test_blink_never_reports_closed() {
        let mut monitor = EyeStateMonitor::default();
        let first = monitor.process_frame(&closed_frame(), ms(0));
        let second = monitor.process_frame(&open_frame(), ms(100));
        assert_eq!(first.state, EyeState::NoFace);
        assert_eq!(second.state, EyeState::Open);
    }

    #[test]
    fn test_face_dedup_refines_count_but_not_presence() {
        let mut monitor = EyeStateMonitor::default();
        let set = DetectionSet::new().with_faces(vec![
            Rectangle::new(100, 100, 80, 80),
            Rectangle::new(105, 105, 75, 75),
            Rectangle::new(400, 100, 80, 80),
        ]);
        let report = monitor.process_frame(&set, ms(0));
        assert_eq!(report.face_count, 2);
        assert_eq!(report.raw_state, EyeState::Closed);
    }

    #[test]
    fn test_malformed_faces_still_mean_present() {
        let mut monitor = EyeStateMonitor::default();
        let set = DetectionSet::new().with_faces(vec![Rectangle::new(0, 0, 0, 0)]);
        let report = monitor.process_frame(&set, ms(0));
        assert_eq!(report.face_count, 1);
        assert_eq!(report.raw_state, EyeState::Closed);
        assert!(report.primary_face.is_none());
    }

    #[test]
    fn test_primary_face_prefers_center() {
        let mut monitor = EyeStateMonitor::default();
        let centered = Rectangle::new(270, 190, 100, 100);
        let set = DetectionSet::new()
            .with_faces(vec![Rectangle::new(0, 0, 110, 110), centered])
            .with_frame_size(640, 480);
        let report = monitor.process_frame(&set, ms(0));
        assert_eq!(report.primary_face, Some(centered));
    }

    #[test]
    fn test_detections_at_coordinate_limit_are_processed() {
        let mut monitor = EyeStateMonitor::default();
        let set = closed_frame()
            .with_eyes_general(vec![Rectangle::new(2_147_483_000, 110, 1000, 10)])
            .with_eyes_left(vec![Rectangle::new(2_147_483_000, 110, 900, 10)]);
        let report = monitor.process_frame(&set, ms(0));
        assert_eq!(report.eye_count(), 1);
        assert_eq!(report.state, EyeState::Open);
    }

    #[test]
    fn test_pending_closed_exposed() {
        let mut monitor = EyeStateMonitor::default();
        monitor.process_frame(&open_frame(), ms(0));
        monitor.process_frame(&closed_frame(), ms(100));
        assert_eq!(monitor.pending_closed_for(ms(400)), Some(ms(300)));
    }

    #[test]
    fn test_reset_starts_new_session() {
        let mut monitor = EyeStateMonitor::default();
        monitor.process_frame(&open_frame(), ms(0));
        assert_eq!(monitor.reported_state(), EyeState::Open);
        monitor.reset();
        assert_eq!(monitor.reported_state(), EyeState::NoFace);
        assert!(monitor.pending_closed_for(ms(0)).is_none());
    }

    #[test]
    fn test_custom_threshold_from_config() {
        let config = MonitorConfig {
            closed_threshold_ms: 100,
            ..MonitorConfig::default()
        };
        let mut monitor = EyeStateMonitor::new(&config);
        monitor.process_frame(&closed_frame(), ms(0));
        let report = monitor.process_frame(&closed_frame(), ms(100));
        assert_eq!(report.state, EyeState::Closed);
    }

    #[test]
    fn test_report_serializes_states() {
        let mut monitor = EyeStateMonitor::default();
        let report = monitor.process_frame(&open_frame(), ms(0));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["state"], "open");
        assert_eq!(json["transitioned"], true);
        assert_eq!(json["eyes"].as_array().unwrap().len(), 2);
    }
}
