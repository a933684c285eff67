pub mod alert;
pub mod classification;
pub mod config;
pub mod detection;
pub mod pipeline;
pub mod shared;
pub mod temporal;
