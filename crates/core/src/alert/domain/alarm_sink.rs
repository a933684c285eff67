/// Domain interface for the audible alert.
///
/// `start` begins looping playback, `stop` silences it. Implementations
/// need not be idempotent; `AlarmController` only calls them on edges.
pub trait AlarmSink: Send {
    fn start(&mut self) -> Result<(), Box<dyn std::error::Error>>;
    fn stop(&mut self) -> Result<(), Box<dyn std::error::Error>>;
}
