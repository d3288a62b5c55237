//! Audio cues
//!
//! Every cue is a single enveloped oscillator, synthesized with the Web Audio
//! API on the web. Native builds and tests use a silent or recording sink.
//! Playback failures are swallowed.

use serde::{Deserialize, Serialize};

/// Sound cue types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SoundCue {
    /// Avatar left the ground
    Jump,
    /// Coin picked up
    Coin,
    /// Run ended
    GameOver,
    /// Store purchase went through
    Purchase,
    /// UI button activated
    ButtonClick,
    /// Shield or extra life spent
    PowerUp,
}

/// Oscillator shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Triangle,
    Sawtooth,
    Square,
}

/// Parameters for one cue's oscillator and envelope
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Voice {
    pub waveform: Waveform,
    /// Hz
    pub frequency: f32,
    /// Gain at the end of the attack, before volume scaling
    pub peak: f32,
    /// Seconds
    pub attack: f64,
    /// Seconds from peak to silence
    pub release: f64,
}

impl Voice {
    pub fn duration(&self) -> f64 {
        self.attack + self.release
    }
}

impl SoundCue {
    pub const ALL: [SoundCue; 6] = [
        SoundCue::Jump,
        SoundCue::Coin,
        SoundCue::GameOver,
        SoundCue::Purchase,
        SoundCue::ButtonClick,
        SoundCue::PowerUp,
    ];

    pub fn voice(&self) -> Voice {
        let (waveform, frequency, peak, attack, release) = match self {
            SoundCue::Jump => (Waveform::Sine, 660.0, 0.8, 0.005, 0.15),
            SoundCue::Coin => (Waveform::Triangle, 880.0, 0.7, 0.01, 0.23),
            SoundCue::GameOver => (Waveform::Sawtooth, 220.0, 0.9, 0.02, 0.8),
            SoundCue::Purchase => (Waveform::Square, 988.0, 0.6, 0.01, 0.3),
            SoundCue::ButtonClick => (Waveform::Sine, 523.0, 0.5, 0.001, 0.15),
            SoundCue::PowerUp => (Waveform::Triangle, 1318.0, 0.7, 0.01, 0.35),
        };
        Voice {
            waveform,
            frequency,
            peak,
            attack,
            release,
        }
    }
}

/// Anything that can play cues
pub trait AudioSink {
    /// Play a cue at `volume` (0.0 - 1.0). Never fails.
    fn play(&mut self, cue: SoundCue, volume: f32);

    /// Unlock playback after a user gesture (browsers start suspended)
    fn resume(&mut self) {}
}

/// Discards every cue
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentAudio;

impl AudioSink for SilentAudio {
    fn play(&mut self, _cue: SoundCue, _volume: f32) {}
}

/// Remembers audible cues in order (headless runs and tests)
#[derive(Debug, Clone, Default)]
pub struct CueRecorder {
    pub played: Vec<SoundCue>,
}

impl CueRecorder {
    pub fn count(&self, cue: SoundCue) -> usize {
        self.played.iter().filter(|c| **c == cue).count()
    }
}

impl AudioSink for CueRecorder {
    fn play(&mut self, cue: SoundCue, volume: f32) {
        if volume > 0.0 {
            self.played.push(cue);
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::WebAudio;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, AudioContextState, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioSink, SoundCue, Voice, Waveform};

    /// Web Audio backend
    pub struct WebAudio {
        ctx: Option<AudioContext>,
    }

    impl Default for WebAudio {
        fn default() -> Self {
            Self::new()
        }
    }

    impl WebAudio {
        pub fn new() -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self { ctx }
        }

        fn create_osc(ctx: &AudioContext, voice: &Voice) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(match voice.waveform {
                Waveform::Sine => OscillatorType::Sine,
                Waveform::Triangle => OscillatorType::Triangle,
                Waveform::Sawtooth => OscillatorType::Sawtooth,
                Waveform::Square => OscillatorType::Square,
            });
            osc.frequency().set_value(voice.frequency);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }
    }

    impl AudioSink for WebAudio {
        fn play(&mut self, cue: SoundCue, volume: f32) {
            if volume <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };

            if ctx.state() == AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            let voice = cue.voice();
            let Some((osc, gain)) = Self::create_osc(ctx, &voice) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(0.0001, t).ok();
            gain.gain()
                .linear_ramp_to_value_at_time(voice.peak * volume, t + voice.attack)
                .ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.001, t + voice.duration())
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + voice.duration() + 0.02).ok();
        }

        fn resume(&mut self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }
    }
}
