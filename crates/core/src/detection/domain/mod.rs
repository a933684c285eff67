pub mod face_selector;
pub mod overlap_deduplicator;
