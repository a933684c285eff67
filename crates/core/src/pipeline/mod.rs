pub mod detection_source;
pub mod eye_state_monitor;
pub mod frame_sequencer;
pub mod infrastructure;
pub mod monitor_session_use_case;
pub mod session_executor;
pub mod session_logger;
