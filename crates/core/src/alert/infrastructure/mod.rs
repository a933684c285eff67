pub mod log_alarm_sink;
