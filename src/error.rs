//! # Engine Errors
//!
//! Only two things can go wrong in the engine: the delay buffers can't be
//! allocated when the sample rate becomes known, or the host asks us to
//! process audio before that allocation ever succeeded. Everything in the
//! per-sample path is infallible by construction (all index arithmetic
//! wraps modulo the buffer length).

use thiserror::Error;

/// Errors reported by [`DelayLine`](crate::dsp::delay_line::DelayLine) and
/// [`ModulationEngine`](crate::dsp::engine::ModulationEngine).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// The delay buffer could not be reserved. The engine stays
    /// not-ready until a later `configure()` succeeds.
    #[error("failed to allocate a delay buffer of {samples} samples")]
    Allocation { samples: usize },

    /// The sample rate and maximum delay produce a buffer with no room
    /// for history (zero, negative or non-finite length).
    #[error(
        "a delay of {max_delay_seconds} s at {sample_rate} Hz does not give a usable buffer length"
    )]
    InvalidLength {
        sample_rate: f32,
        max_delay_seconds: f32,
    },

    /// `process_block()` was called before a successful `configure()`.
    #[error("the engine has not been configured with a sample rate")]
    NotPrepared,
}
