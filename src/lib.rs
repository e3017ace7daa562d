//! # KP Chorus/Flanger: An AU/VST3/CLAP Modulation Plugin
//!
//! A stereo chorus and flanger built with
//! [nih-plug](https://github.com/robbert-vdh/nih-plug). Both effects are
//! the same machine: a short delay line whose delay time is swept by a
//! sine LFO, mixed back against the dry signal. Chorus sweeps a longer
//! delay (5-30 ms) for a thickened, doubled sound; flanger sweeps a very
//! short one (1-5 ms) and, with feedback, turns it into a moving comb
//! filter.
//!
//! ## Signal Flow
//!
//! ```text
//! Input ──┬─────────────────────────────────────── × (1 - dry/wet) ───┐
//!         │                                                           │
//!         │    ┌──────────────────────────────────────────┐           │
//!         │    │              FEEDBACK LOOP               │           │
//!         │    │                                          │           │
//!         └──►(+)──► [Ring Buffer / Delay Line] ──► wet ──┼─ × dry/wet ►(+)──► Output
//!              ▲         read point swept by LFO          │
//!              │                                          │
//!              └───────────── × feedback ◄────────────────┘
//! ```
//!
//! The left and right channels have their own delay lines; the right LFO
//! runs ahead of the left by the phase offset, which spreads the image.
//!
//! ## Layout
//!
//! - [`dsp`]: the engine, independent of any plugin API.
//! - [`params`]: host-visible parameters and their persisted IDs.
//! - This file: the thin nih-plug adapter that wires the two together.

pub mod dsp;
pub mod error;
pub mod params;

use std::num::NonZeroU32;
use std::sync::Arc;

use dsp::engine::{ModulationEngine, MAX_DELAY_SECONDS};
use nih_plug::prelude::*;
use params::PluginParams;

/// The main plugin struct.
///
/// ## Why separate state from parameters?
///
/// Parameters (`PluginParams`) are shared with the host via `Arc` and can
/// be read from any thread. The engine (delay lines, LFO, smoothers) is
/// owned exclusively by the audio thread and only touched in
/// `initialize()`, `reset()` and `process()`, which the host never runs
/// concurrently. No locks needed.
struct KpChorusFlanger {
    params: Arc<PluginParams>,

    /// Allocated in `initialize()` once the sample rate is known.
    engine: ModulationEngine,
}

impl Default for KpChorusFlanger {
    fn default() -> Self {
        Self {
            params: Arc::new(PluginParams::default()),
            // Unprepared until initialize(): processing passes audio
            // through untouched.
            engine: ModulationEngine::new(),
        }
    }
}

impl Plugin for KpChorusFlanger {
    const NAME: &'static str = "KP Chorus Flanger";
    const VENDOR: &'static str = "KP Audio";
    const URL: &'static str = "";
    const EMAIL: &'static str = "";
    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    // Stereo in, stereo out, nothing else. The right channel's LFO is the
    // left one shifted by the phase offset, which only makes sense with
    // exactly two channels.
    const AUDIO_IO_LAYOUTS: &'static [AudioIOLayout] = &[AudioIOLayout {
        main_input_channels: NonZeroU32::new(2),
        main_output_channels: NonZeroU32::new(2),
        aux_input_ports: &[],
        aux_output_ports: &[],
        names: PortNames::const_default(),
    }];

    const MIDI_INPUT: MidiConfig = MidiConfig::None;

    // With sample-accurate automation nih-plug splits the buffer at every
    // automation point, so parameter values are constant within one
    // `process()` call and a single snapshot per call is exact.
    const SAMPLE_ACCURATE_AUTOMATION: bool = true;

    type SysExMessage = ();
    type BackgroundTask = ();

    fn params(&self) -> Arc<dyn Params> {
        self.params.clone()
    }

    /// Called when the plugin is loaded or the audio configuration
    /// changes. This is the only place the delay buffers get allocated.
    ///
    /// Returning `false` tells the host we can't run with this
    /// configuration; the engine stays unprepared.
    fn initialize(
        &mut self,
        _audio_io_layout: &AudioIOLayout,
        buffer_config: &BufferConfig,
        _context: &mut impl InitContext<Self>,
    ) -> bool {
        let sample_rate = buffer_config.sample_rate;

        match self.engine.configure(sample_rate) {
            Ok(()) => {
                nih_log!(
                    "Configured for {sample_rate} Hz with {MAX_DELAY_SECONDS} s of delay history"
                );
                true
            }
            Err(err) => {
                nih_error!("Could not prepare the engine at {sample_rate} Hz: {err}");
                false
            }
        }
    }

    /// Called when playback (re)starts. Clears the delay history, the
    /// feedback and the LFO so nothing from the last run bleeds in.
    fn reset(&mut self) {
        self.engine.reset();
    }

    /// Run the engine over the block, in place.
    ///
    /// The channel slices go straight to the engine; all per-sample work
    /// (LFO, smoothing, delay reads, feedback, mixing) happens there.
    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        _context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        let params = self.params.snapshot();

        let [left, right, ..] = buffer.as_slice() else {
            return ProcessStatus::Normal;
        };

        if self.engine.process_block(left, right, &params).is_err() {
            // Only `NotPrepared` can come back, with the block untouched, so
            // the audio passes through. initialize() has already logged why,
            // and logging here would allocate.
        }

        ProcessStatus::Normal
    }
}

// ─────────────────────────────────────────────────────────────────────
// Plugin format trait implementations
// ─────────────────────────────────────────────────────────────────────

impl ClapPlugin for KpChorusFlanger {
    const CLAP_ID: &'static str = "com.kp-audio.kp-chorus-flanger";
    const CLAP_DESCRIPTION: Option<&'static str> =
        Some("A stereo chorus and flanger with feedback");
    const CLAP_MANUAL_URL: Option<&'static str> = None;
    const CLAP_SUPPORT_URL: Option<&'static str> = None;
    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::AudioEffect,
        ClapFeature::Stereo,
        ClapFeature::Chorus,
        ClapFeature::Flanger,
    ];
}

impl Vst3Plugin for KpChorusFlanger {
    // `*b"..."` turns the 16-character ASCII literal into a `[u8; 16]`.
    const VST3_CLASS_ID: [u8; 16] = *b"KPChorusFlngr001";

    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] =
        &[Vst3SubCategory::Fx, Vst3SubCategory::Modulation];
}

// ─────────────────────────────────────────────────────────────────────
// Export macros
// ─────────────────────────────────────────────────────────────────────
//
// nih_export_clap! exports the `clap_entry` symbol for CLAP hosts.
// nih_export_vst3! exports `GetPluginFactory` for VST3 hosts.
// clap_wrapper re-exports the CLAP entry point as AUv2 so Logic Pro
// (Audio Units only) can load it.

nih_export_clap!(KpChorusFlanger);
nih_export_vst3!(KpChorusFlanger);

clap_wrapper::export_auv2!();
