use std::time::Duration;

use crate::shared::detection_set::DetectionSet;

/// Detector output for one frame, stamped on a session-local monotonic
/// clock.
#[derive(Clone, Debug, PartialEq)]
pub struct TimedDetections {
    pub timestamp: Duration,
    pub detections: DetectionSet,
}

impl TimedDetections {
    pub fn new(timestamp: Duration, detections: DetectionSet) -> Self {
        Self {
            timestamp,
            detections,
        }
    }
}

/// Port for whatever produces detections: a live capture + cascade stack,
/// or a recorded trace.
pub trait DetectionSource: Send {
    /// Returns an iterator over frames in capture order.
    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<TimedDetections, Box<dyn std::error::Error>>> + '_>;

    /// Releases any resources held by the source.
    fn close(&mut self) {}
}
