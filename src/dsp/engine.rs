//! # Modulation Engine
//!
//! The engine turns two delay lines into a stereo chorus or flanger. A
//! sine LFO sweeps the read position of each delay line, the right
//! channel's LFO runs ahead of the left by a phase offset, and part of the
//! delayed signal is fed back into the delay input.
//!
//! ## Per-Sample Signal Flow
//!
//! ```text
//!                 ┌──────────── × (1 - dry_wet) ────────────────────┐
//!                 │                                                 │
//! input ──────────┴──►(+)──► [Delay Line] ──► wet ── × dry_wet ───►(+)──► output
//!                      ▲          ▲             │
//!                      │    delay │             │
//!          feedback    │     ┌────┴─────┐       │
//!          (1 sample   └─────┤ × fdbk   │◄──────┘
//!           late)            └──────────┘
//!                                 ▲
//!   LFO phase ─► sin ─► × depth ─► map to [min, max] seconds ─► × sample rate
//! ```
//!
//! ## Order Matters
//!
//! Every sample runs the same nine steps in a fixed order:
//!
//! 1. write `input + feedback` into each delay line and advance the head
//! 2. left LFO = `sin(2π · phase)`
//! 3. glide the phase offset, right LFO = `sin(2π · (phase + offset))`
//! 4. glide the rate, advance the phase by `rate / sample_rate`
//! 5. glide the depth, scale both LFO outputs by it
//! 6. map each LFO output to a delay time (range picked by effect type)
//! 7. read each delay line at that (fractional) delay
//! 8. remember `wet × feedback` for step 1 of the *next* sample
//! 9. output `input × (1 - dry_wet) + wet × dry_wet`
//!
//! The LFO outputs of step 2 and 3 use the phase from *before* step 4
//! advances it, and the feedback written in step 1 is the one computed in
//! step 8 of the previous sample. Swapping any of these changes the sound.

use std::f32::consts::TAU;

use nih_plug::prelude::Enum;

use super::delay_line::DelayLine;
use super::smoother::ParamSmoother;
use crate::error::EngineError;

/// Seconds of history each delay line keeps. The longest delay the LFO
/// can ask for is 30 ms, so this leaves plenty of room.
pub const MAX_DELAY_SECONDS: f32 = 2.0;

/// Delay times (seconds) the LFO sweeps between in chorus mode.
pub const CHORUS_DELAY_RANGE: (f32, f32) = (0.005, 0.03);

/// Delay times (seconds) the LFO sweeps between in flanger mode.
pub const FLANGER_DELAY_RANGE: (f32, f32) = (0.001, 0.005);

/// Which delay range the LFO is mapped onto.
///
/// Switching type takes effect on the very next sample. Only the LFO
/// inputs (rate, depth, phase offset) are smoothed, not the mapping.
///
/// The variants carry no `#[id]`, so the host stores the type as its
/// index: 0 for chorus, 1 for flanger.
#[derive(Enum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectType {
    /// Long, slowly swept delay: a doubled, slightly detuned voice.
    #[name = "Chorus"]
    Chorus,
    /// Short delay plus feedback: a sweeping comb filter.
    #[name = "Flanger"]
    Flanger,
}

impl EffectType {
    /// `(min, max)` delay in seconds.
    pub const fn delay_range(self) -> (f32, f32) {
        match self {
            Self::Chorus => CHORUS_DELAY_RANGE,
            Self::Flanger => FLANGER_DELAY_RANGE,
        }
    }

    /// Linearly map an LFO value in `[-1, 1]` onto this type's delay range.
    ///
    /// ```text
    /// -1.0 → min    0.0 → (min + max) / 2    1.0 → max
    /// ```
    #[inline]
    pub fn delay_seconds(self, lfo: f32) -> f32 {
        let (min, max) = self.delay_range();
        min + (lfo + 1.0) * 0.5 * (max - min)
    }
}

/// One snapshot of the user-facing controls, read by the engine once per
/// sample. The host side owns range enforcement; the engine uses whatever
/// it is given.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectParameters {
    /// 0.0 = input only, 1.0 = delayed signal only.
    pub dry_wet: f32,
    /// LFO amplitude, 0.0 to 1.0.
    pub depth: f32,
    /// LFO frequency in Hz, 0.1 to 20.
    pub rate: f32,
    /// How far the right LFO runs ahead of the left, in cycles (0 to 1).
    pub phase_offset: f32,
    /// Share of the delayed signal fed back into the delay, 0 to 0.98.
    pub feedback: f32,
    pub effect_type: EffectType,
}

impl Default for EffectParameters {
    fn default() -> Self {
        Self {
            dry_wet: 0.5,
            depth: 0.5,
            rate: 10.0,
            phase_offset: 0.0,
            feedback: 0.5,
            effect_type: EffectType::Chorus,
        }
    }
}

/// Everything the engine carries from one sample to the next.
///
/// Starts at all zeros and goes back to all zeros whenever the stream is
/// (re)configured or reset, so `EngineState::default()` is always the
/// state of a freshly prepared engine.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct EngineState {
    /// Left LFO phase in cycles, always in `[0, 1)`.
    pub lfo_phase: f32,
    pub rate: ParamSmoother,
    pub depth: ParamSmoother,
    pub phase_offset: ParamSmoother,
    /// `wet × feedback` from the previous sample, per channel.
    pub feedback_left: f32,
    pub feedback_right: f32,
}

/// The stereo chorus/flanger.
///
/// Construct it with [`new()`](Self::new), call
/// [`configure()`](Self::configure) whenever the sample rate is known or
/// changes, then feed it audio with [`process_block()`](Self::process_block)
/// or [`process_frame()`](Self::process_frame). Until a `configure()` call
/// succeeds, processing returns [`EngineError::NotPrepared`] and leaves the
/// audio untouched.
#[derive(Debug, Default)]
pub struct ModulationEngine {
    state: EngineState,
    left: DelayLine,
    right: DelayLine,
    sample_rate: f32,
    prepared: bool,
}

impl ModulationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepare for a stream at `sample_rate`.
    ///
    /// Resets the LFO, the smoothers and the feedback, and gives both delay
    /// lines zeroed buffers of `MAX_DELAY_SECONDS` of history. The buffers
    /// are only reallocated when the sample rate actually changes;
    /// otherwise the existing ones are cleared in place.
    ///
    /// Allocates, so call it from the host's setup path and never while a
    /// `process_*` call on the same engine is in flight. On error the
    /// engine stays unprepared until a later call succeeds.
    pub fn configure(&mut self, sample_rate: f32) -> Result<(), EngineError> {
        if self.prepared && sample_rate == self.sample_rate {
            self.reset();
            return Ok(());
        }

        self.prepared = false;
        self.state = EngineState::default();
        self.sample_rate = sample_rate;

        self.left.configure(sample_rate, MAX_DELAY_SECONDS)?;
        self.right.configure(sample_rate, MAX_DELAY_SECONDS)?;

        self.prepared = true;
        Ok(())
    }

    /// Zero the engine state and both delay lines without reallocating.
    /// Used when the host restarts the stream at the same sample rate.
    pub fn reset(&mut self) {
        self.state = EngineState::default();
        self.left.clear();
        self.right.clear();
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    /// Sample rate of the last `configure()` call.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// Process one stereo frame with its own parameter snapshot.
    ///
    /// This is the form to use when parameters change from one sample to
    /// the next within a block.
    pub fn process_frame(
        &mut self,
        left: f32,
        right: f32,
        params: &EffectParameters,
    ) -> Result<(f32, f32), EngineError> {
        if !self.prepared {
            return Err(EngineError::NotPrepared);
        }

        Ok(self.tick(left, right, params))
    }

    /// Process a block in place. The frame count is the length of the
    /// shorter channel; any extra samples in the longer one are left alone.
    ///
    /// Allocation-free and deterministic: the same state, parameters and
    /// input always give bit-identical output.
    pub fn process_block(
        &mut self,
        left: &mut [f32],
        right: &mut [f32],
        params: &EffectParameters,
    ) -> Result<(), EngineError> {
        if !self.prepared {
            return Err(EngineError::NotPrepared);
        }

        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            (*l, *r) = self.tick(*l, *r, params);
        }

        Ok(())
    }

    /// One pass of the per-sample algorithm described in the module docs.
    #[inline]
    fn tick(
        &mut self,
        input_left: f32,
        input_right: f32,
        params: &EffectParameters,
    ) -> (f32, f32) {
        let state = &mut self.state;

        // 1. Feed the delay lines, closing the loop with last sample's feedback.
        self.left.write_and_advance(input_left + state.feedback_left);
        self.right.write_and_advance(input_right + state.feedback_right);

        // 2. Left LFO from the current phase.
        let mut lfo_left = (TAU * state.lfo_phase).sin();

        // 3. Right LFO, offset from the left.
        let phase_offset = state.phase_offset.next(params.phase_offset);
        let phase_right = wrap_phase(state.lfo_phase + phase_offset);
        let mut lfo_right = (TAU * phase_right).sin();

        // 4. Advance the phase for the next sample.
        let rate = state.rate.next(params.rate);
        state.lfo_phase = wrap_phase(state.lfo_phase + rate / self.sample_rate);

        // 5. Depth.
        let depth = state.depth.next(params.depth);
        lfo_left *= depth;
        lfo_right *= depth;

        // 6. LFO → delay in samples.
        let delay_left = params.effect_type.delay_seconds(lfo_left) * self.sample_rate;
        let delay_right = params.effect_type.delay_seconds(lfo_right) * self.sample_rate;

        // 7. Fractional read.
        let wet_left = self.left.read_interpolated(delay_left);
        let wet_right = self.right.read_interpolated(delay_right);

        // 8. Feedback for the next sample's write.
        state.feedback_left = wet_left * params.feedback;
        state.feedback_right = wet_right * params.feedback;

        // 9. Dry/wet mix.
        let dry = 1.0 - params.dry_wet;
        (
            input_left * dry + wet_left * params.dry_wet,
            input_right * dry + wet_right * params.dry_wet,
        )
    }
}

/// Wrap a phase into `[0, 1)`. Phases already in range pass through
/// untouched, and a phase in `[1, 2)` just loses 1.0.
#[inline]
fn wrap_phase(phase: f32) -> f32 {
    if (0.0..1.0).contains(&phase) {
        return phase;
    }

    let wrapped = phase - phase.floor();
    // A tiny negative phase can round up to exactly 1.0.
    if wrapped >= 1.0 {
        0.0
    } else {
        wrapped
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
