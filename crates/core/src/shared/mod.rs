pub mod constants;
pub mod detection_set;
pub mod eye_state;
pub mod rectangle;
