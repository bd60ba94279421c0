//! Audio-related types and utilities
pub mod dsp;
pub mod math;
pub mod sample_rate;
pub mod spatial;
