pub mod hysteresis_filter;
