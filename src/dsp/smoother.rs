//! # One-Pole Parameter Smoother
//!
//! Rate, depth and phase offset never reach the LFO directly. Each one
//! goes through a one-pole lowpass that glides toward the knob's value a
//! tiny step at a time, so a knob jump becomes a smooth sweep instead of
//! a click in the delay time.
//!
//! ## The Smoothing Equation
//!
//! ```text
//! y[n] = y[n-1] + k * (target - y[n-1])
//! ```
//!
//! Rearranged, that is the classic one-pole lowpass
//! `y[n] = k * target + (1 - k) * y[n-1]`: each sample closes a fraction
//! `k` of the remaining distance to the target. With `k = 0.0001` the
//! remaining distance after `n` samples is `(1 - k)^n`, so at 48 kHz:
//!
//! - after ~0.2 s (10 000 samples): 37% left
//! - after ~1 s (48 000 samples): under 1% left
//!
//! That slow glide is what gives rate and depth changes their audible
//! "swoop", so the coefficient is fixed rather than exposed as a knob.

/// Fraction of the remaining distance closed per sample.
pub const SMOOTHING_COEFFICIENT: f32 = 0.0001;

/// A first-order IIR smoother that starts at 0.0.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ParamSmoother {
    /// The smoother's only state: where the glide currently is.
    current: f32,
}

impl ParamSmoother {
    pub const fn new() -> Self {
        Self { current: 0.0 }
    }

    /// Move one sample toward `target` and return the new value.
    #[inline]
    pub fn next(&mut self, target: f32) -> f32 {
        self.current += SMOOTHING_COEFFICIENT * (target - self.current);
        self.current
    }

    /// The value returned by the last call to [`next()`](Self::next).
    pub fn value(&self) -> f32 {
        self.current
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
