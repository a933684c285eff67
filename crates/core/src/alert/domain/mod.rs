pub mod alarm_controller;
pub mod alarm_sink;
