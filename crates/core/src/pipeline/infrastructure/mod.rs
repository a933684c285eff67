pub mod jsonl_detection_source;
pub mod threaded_session_executor;
