pub mod raw_state_classifier;
