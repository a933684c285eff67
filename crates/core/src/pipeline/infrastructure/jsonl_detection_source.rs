use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::pipeline::detection_source::{DetectionSource, TimedDetections};
use crate::shared::detection_set::DetectionSet;

#[derive(Error, Debug)]
pub enum TraceError {
    #[error("failed to open trace {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read trace line {line}: {source}")]
    Read {
        line: usize,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid trace record on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Deserialize)]
struct TraceRecord {
    timestamp_ms: u64,
    #[serde(flatten)]
    detections: DetectionSet,
}

/// Reads recorded detections from JSON lines, one frame per line:
///
/// ```text
/// {"timestamp_ms": 0, "faces": [{"x": 100, "y": 80, "width": 120, "height": 120}],
///  "eyes_general": [...], "eyes_left": [...], "eyes_right": [...]}
/// ```
///
/// Blank lines are skipped. Line numbers in errors are 1-based.
pub struct JsonlDetectionSource {
    reader: Box<dyn BufRead + Send>,
    line: usize,
}

impl JsonlDetectionSource {
    pub fn open(path: &Path) -> Result<Self, TraceError> {
        let file = File::open(path).map_err(|source| TraceError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_reader(Box::new(BufReader::new(file))))
    }

    /// Reads lines until EOF. A read on an idle pipe blocks the calling thread.
    pub fn from_reader(reader: Box<dyn BufRead + Send>) -> Self {
        Self { reader, line: 0 }
    }

    fn next_record(&mut self) -> Option<Result<TimedDetections, TraceError>> {
        let mut buf = String::new();
        loop {
            buf.clear();
            self.line += 1;
            match self.reader.read_line(&mut buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(source) => {
                    return Some(Err(TraceError::Read {
                        line: self.line,
                        source,
                    }))
                }
            }
            let trimmed = buf.trim();
            if !trimmed.is_empty() {
                return Some(parse_record(trimmed, self.line));
            }
        }
    }
}

fn parse_record(text: &str, line: usize) -> Result<TimedDetections, TraceError> {
    let record: TraceRecord =
        serde_json::from_str(text).map_err(|source| TraceError::Parse { line, source })?;
    Ok(TimedDetections::new(
        Duration::from_millis(record.timestamp_ms),
        record.detections,
    ))
}

impl DetectionSource for JsonlDetectionSource {
    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<TimedDetections, Box<dyn std::error::Error>>> + '_> {
        Box::new(std::iter::from_fn(move || {
            self.next_record()
                .map(|r| r.map_err(|e| -> Box<dyn std::error::Error> { Box::new(e) }))
        }))
    }
}
