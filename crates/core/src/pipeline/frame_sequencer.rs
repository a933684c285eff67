use std::time::Duration;

/// Enforces the monitor's ordering requirement on an incoming frame stream.
///
/// Frames stamped earlier than the last admitted frame are rejected; equal
/// timestamps pass.
#[derive(Debug, Default)]
pub struct FrameSequencer {
    last: Option<Duration>,
}

impl FrameSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn admit(&mut self, timestamp: Duration) -> bool {
        match self.last {
            Some(last) if timestamp < last => {
                log::warn!(
                    "Dropping out-of-order frame at {}ms (last admitted {}ms)",
                    timestamp.as_millis(),
                    last.as_millis()
                );
                false
            }
            _ => {
                self.last = Some(timestamp);
                true
            }
        }
    }
}
