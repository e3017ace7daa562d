//! # Plugin Parameters
//!
//! The host owns these values: it automates them, shows them on its
//! generic UI and saves/restores them with the project. The engine never
//! touches this struct directly; once per `process()` call the adapter
//! takes a [`snapshot()`](PluginParams::snapshot) and hands the engine a
//! plain [`EffectParameters`].
//!
//! ## Persisted IDs
//!
//! The `#[id = "..."]` strings are what ends up in saved projects and
//! presets. They are the six names the state has always been stored
//! under (`DryWet`, `Depth`, `Rate`, `Phaseoffset`, `Feedback`, `Type`),
//! so never rename them. The five knobs are stored as floats and `Type`
//! as its integer index (0 = Chorus, 1 = Flanger), which is why
//! [`EffectType`]'s variants have no `#[id]` of their own. Restoring a
//! project just assigns the stored values back; the engine applies no
//! extra transformation.
//!
//! ## No Host-Side Smoothing
//!
//! Unlike most nih-plug plugins, none of these parameters use a
//! `SmoothingStyle`. The engine already glides rate, depth and phase
//! offset with its own one-pole smoother, and that glide is part of the
//! sound; stacking a second smoother on top would change it.

use nih_plug::prelude::*;

use crate::dsp::engine::{EffectParameters, EffectType};

/// All user-facing parameters of the chorus/flanger.
#[derive(Params)]
pub struct PluginParams {
    /// **Dry/Wet**: 0% is the untouched input, 100% only the delayed
    /// signal. A classic chorus sits around 50%.
    #[id = "DryWet"]
    pub dry_wet: FloatParam,

    /// **Depth**: how far the LFO swings the delay time across the
    /// type's range. 0% freezes the delay in the middle of the range.
    #[id = "Depth"]
    pub depth: FloatParam,

    /// **Rate**: LFO speed, 0.1 to 20 Hz.
    #[id = "Rate"]
    pub rate: FloatParam,

    /// **Phase Offset**: how far (in cycles) the right channel's LFO runs
    /// ahead of the left. 0.5 sweeps the two sides in opposite directions
    /// for the widest stereo image.
    #[id = "Phaseoffset"]
    pub phase_offset: FloatParam,

    /// **Feedback**: how much of the delayed signal goes back into the
    /// delay. Capped at 98% so the loop always decays.
    #[id = "Feedback"]
    pub feedback: FloatParam,

    /// **Type**: Chorus (5-30 ms sweep) or Flanger (1-5 ms sweep).
    #[id = "Type"]
    pub effect_type: EnumParam<EffectType>,
}

impl Default for PluginParams {
    fn default() -> Self {
        let defaults = EffectParameters::default();

        Self {
            dry_wet: FloatParam::new(
                "Dry Wet",
                defaults.dry_wet,
                FloatRange::Linear { min: 0.0, max: 1.0 },
            )
            .with_unit("%")
            .with_value_to_string(formatters::v2s_f32_percentage(1))
            .with_string_to_value(formatters::s2v_f32_percentage()),

            depth: FloatParam::new(
                "Depth",
                defaults.depth,
                FloatRange::Linear { min: 0.0, max: 1.0 },
            )
            .with_unit("%")
            .with_value_to_string(formatters::v2s_f32_percentage(1))
            .with_string_to_value(formatters::s2v_f32_percentage()),

            rate: FloatParam::new(
                "Rate",
                defaults.rate,
                FloatRange::Linear {
                    min: 0.1,
                    max: 20.0,
                },
            )
            .with_unit(" Hz")
            .with_value_to_string(formatters::v2s_f32_rounded(2)),

            phase_offset: FloatParam::new(
                "Phase Offset",
                defaults.phase_offset,
                FloatRange::Linear { min: 0.0, max: 1.0 },
            )
            .with_value_to_string(formatters::v2s_f32_rounded(2)),

            feedback: FloatParam::new(
                "Feedback",
                defaults.feedback,
                FloatRange::Linear {
                    min: 0.0,
                    max: 0.98, // Below 1.0 so the loop always decays
                },
            )
            .with_unit("%")
            .with_value_to_string(formatters::v2s_f32_percentage(1))
            .with_string_to_value(formatters::s2v_f32_percentage()),

            effect_type: EnumParam::new("Type", defaults.effect_type),
        }
    }
}

impl PluginParams {
    /// The current values as the engine sees them.
    pub fn snapshot(&self) -> EffectParameters {
        EffectParameters {
            dry_wet: self.dry_wet.value(),
            depth: self.depth.value(),
            rate: self.rate.value(),
            phase_offset: self.phase_offset.value(),
            feedback: self.feedback.value(),
            effect_type: self.effect_type.value(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
