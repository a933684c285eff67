use std::time::Duration;

/// Eye candidates overlapping at least this much are the same physical eye.
pub const DEFAULT_OVERLAP_THRESHOLD: f64 = 0.3;

/// Face candidates from repeated cascade passes merge at this overlap.
pub const DEFAULT_FACE_OVERLAP_THRESHOLD: f64 = 0.5;

/// Sustained CLOSED evidence required before CLOSED is reported.
pub const DEFAULT_CLOSED_THRESHOLD: Duration = Duration::from_millis(500);

/// Distance penalty per pixel when ranking faces by centrality.
pub const FACE_CENTER_PENALTY: f64 = 0.01;

pub const DEFAULT_CHANNEL_CAPACITY: usize = 8;

pub const APP_NAME: &str = "OpenEyes";
pub const CONFIG_FILE_NAME: &str = "config.json";
