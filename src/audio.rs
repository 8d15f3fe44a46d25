//! Audio system using Web Audio API
//!
//! Procedural forge sounds, one short oscillator envelope per cue.

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::settings::Settings;
use crate::sim::SoundCue;

/// Audio sink for simulation sound cues
pub struct AudioManager {
    ctx: Option<AudioContext>,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        // May fail outside a secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.master_volume = settings.master_volume.clamp(0.0, 1.0);
        self.sfx_volume = settings.sfx_volume.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play a sound cue (fire and forget)
    pub fn play(&self, cue: SoundCue) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }

        let Some(ctx) = &self.ctx else { return };

        // Browsers keep the context suspended until a gesture
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        match cue {
            SoundCue::AnvilClank => self.play_anvil(ctx, vol),
            SoundCue::MortarGrind => self.play_sweep(ctx, vol * 0.4, 180.0, 90.0, 0.18, OscillatorType::Sawtooth),
            SoundCue::ShovelScoop => self.play_sweep(ctx, vol * 0.4, 220.0, 120.0, 0.12, OscillatorType::Triangle),
            SoundCue::Rip => self.play_sweep(ctx, vol * 0.5, 900.0, 200.0, 0.25, OscillatorType::Sawtooth),
            SoundCue::Whoosh => self.play_sweep(ctx, vol * 0.3, 200.0, 700.0, 0.3, OscillatorType::Sine),
            SoundCue::Thud => self.play_sweep(ctx, vol * 0.6, 120.0, 50.0, 0.12, OscillatorType::Sine),
            SoundCue::HeatUp => self.play_arpeggio(ctx, vol * 0.3, &[330.0, 440.0, 660.0]),
            SoundCue::MoldPress => self.play_arpeggio(ctx, vol * 0.35, &[262.0, 330.0, 392.0, 523.0]),
            SoundCue::LetterLand => self.play_sweep(ctx, vol * 0.15, 1200.0, 900.0, 0.05, OscillatorType::Sine),
            SoundCue::ChipLand => self.play_sweep(ctx, vol * 0.2, 700.0, 1050.0, 0.08, OscillatorType::Triangle),
            SoundCue::Grab => self.play_sweep(ctx, vol * 0.2, 300.0, 260.0, 0.05, OscillatorType::Square),
        }
    }

    // === Sound generators ===

    /// Create an oscillator with gain envelope
    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Anvil - bright metallic strike with an inharmonic overtone
    fn play_anvil(&self, ctx: &AudioContext, vol: f32) {
        let t = ctx.current_time();
        for (freq, level, decay) in [(880.0, 0.5, 0.35), (2350.0, 0.25, 0.2), (110.0, 0.4, 0.1)] {
            let Some((osc, gain)) = self.create_osc(ctx, freq, OscillatorType::Triangle) else {
                return;
            };
            gain.gain().set_value_at_time(vol * level, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.001, t + decay)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + decay + 0.05).ok();
        }
    }

    /// Single pitch sweep with exponential decay
    fn play_sweep(&self, ctx: &AudioContext, vol: f32, from: f32, to: f32, dur: f64, osc_type: OscillatorType) {
        let Some((osc, gain)) = self.create_osc(ctx, from, osc_type) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + dur)
            .ok();
        osc.frequency().set_value_at_time(from, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(to, t + dur)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + dur + 0.02).ok();
    }

    /// Rising notes, 60 ms apart
    fn play_arpeggio(&self, ctx: &AudioContext, vol: f32, notes: &[f32]) {
        let t = ctx.current_time();
        for (i, &freq) in notes.iter().enumerate() {
            let Some((osc, gain)) = self.create_osc(ctx, freq, OscillatorType::Sine) else {
                return;
            };
            let start = t + i as f64 * 0.06;
            gain.gain().set_value_at_time(0.0, t).ok();
            gain.gain().set_value_at_time(vol, start).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, start + 0.15)
                .ok();
            osc.start_with_when(start).ok();
            osc.stop_with_when(start + 0.2).ok();
        }
    }
}
