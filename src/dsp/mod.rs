//! # DSP Building Blocks
//!
//! - **`delay_line`**: a per-channel ring buffer with linearly
//!   interpolated reads at fractional delays.
//!
//! - **`smoother`**: the one-pole glide applied to rate, depth and phase
//!   offset so knob moves never jump the delay time.
//!
//! - **`engine`**: the chorus/flanger itself. Owns two delay lines, the
//!   LFO and the smoothers, and runs the per-sample algorithm.

pub mod delay_line;
pub mod engine;
pub mod smoother;
