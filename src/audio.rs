//! Sound effects behind a shared, mute-aware handle
//!
//! The game only decides *which* effect to play. A [`SoundBackend`] turns
//! effects into sound: procedural Web Audio oscillators in the browser,
//! nothing at all natively. One [`AudioController`] is shared (via
//! [`SharedAudio`]) by everything that makes noise, so mute and volume are
//! set in exactly one place.

use std::cell::Cell;
use std::rc::Rc;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    /// Stick growing (looped while the press is held)
    StickGrow,
    /// Stick released and tipping over
    StickHit,
    /// Stick slammed down across the gap
    StickFall,
    /// Player reached the next platform
    PlatformLand,
    /// Stick tip landed in the perfect zone
    PerfectLanding,
    /// Bonus item picked up
    BonusCollect,
    /// Player fell or crashed
    Fall,
    /// UI button
    ButtonClick,
}

/// Something that can actually make sound
pub trait SoundBackend {
    /// Fire-and-forget one-shot
    fn play(&self, effect: SoundEffect, volume: f32);
    /// Start a sustained effect; at most one runs at a time
    fn start_loop(&self, effect: SoundEffect, volume: f32);
    fn stop_loop(&self, effect: SoundEffect);
}

/// Silent backend for native builds and headless runs
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBackend;

impl SoundBackend for NullBackend {
    fn play(&self, _effect: SoundEffect, _volume: f32) {}
    fn start_loop(&self, _effect: SoundEffect, _volume: f32) {}
    fn stop_loop(&self, _effect: SoundEffect) {}
}

/// Handle shared by every consumer of audio
pub type SharedAudio = Rc<AudioController>;

/// Mute state and volume in front of a backend
pub struct AudioController {
    backend: Box<dyn SoundBackend>,
    muted: Cell<bool>,
    volume: Cell<f32>,
    looping: Cell<Option<SoundEffect>>,
}

impl AudioController {
    pub fn new(backend: Box<dyn SoundBackend>) -> Self {
        Self {
            backend,
            muted: Cell::new(false),
            volume: Cell::new(1.0),
            looping: Cell::new(None),
        }
    }

    /// Controller that plays nothing
    pub fn silent() -> Self {
        Self::new(Box::new(NullBackend))
    }

    pub fn shared(self) -> SharedAudio {
        Rc::new(self)
    }

    /// Best available controller for the current platform
    pub fn for_platform() -> Self {
        #[cfg(target_arch = "wasm32")]
        {
            match web::WebAudioBackend::new() {
                Some(backend) => Self::new(Box::new(backend)),
                None => Self::silent(),
            }
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            Self::silent()
        }
    }

    pub fn is_muted(&self) -> bool {
        self.muted.get()
    }

    /// Mute or unmute; muting also silences a running loop
    pub fn set_muted(&self, muted: bool) {
        if muted && !self.muted.get() {
            if let Some(effect) = self.looping.take() {
                self.backend.stop_loop(effect);
            }
        }
        self.muted.set(muted);
        log::debug!("Audio muted: {}", muted);
    }

    /// Flip the mute state and return the new one
    pub fn toggle_muted(&self) -> bool {
        let muted = !self.muted.get();
        self.set_muted(muted);
        muted
    }

    pub fn volume(&self) -> f32 {
        self.volume.get()
    }

    /// Set volume (0.0 - 1.0)
    pub fn set_volume(&self, volume: f32) {
        self.volume.set(volume.clamp(0.0, 1.0));
    }

    fn audible_volume(&self) -> Option<f32> {
        let volume = self.volume.get();
        (!self.muted.get() && volume > 0.0).then_some(volume)
    }

    pub fn play(&self, effect: SoundEffect) {
        if let Some(volume) = self.audible_volume() {
            self.backend.play(effect, volume);
        }
    }

    pub fn start_loop(&self, effect: SoundEffect) {
        let Some(volume) = self.audible_volume() else {
            return;
        };
        if let Some(previous) = self.looping.replace(Some(effect)) {
            self.backend.stop_loop(previous);
        }
        self.backend.start_loop(effect, volume);
    }

    /// Stop `effect` if it is the running loop
    pub fn stop_loop(&self, effect: SoundEffect) {
        if self.looping.get() == Some(effect) {
            self.looping.set(None);
            self.backend.stop_loop(effect);
        }
    }

    pub fn is_looping(&self) -> bool {
        self.looping.get().is_some()
    }
}

#[cfg(target_arch = "wasm32")]
mod web {
    //! Procedurally generated effects through the Web Audio API

    use std::cell::RefCell;

    use web_sys::{AudioContext, AudioContextState, GainNode, OscillatorNode, OscillatorType};

    use super::{SoundBackend, SoundEffect};

    pub struct WebAudioBackend {
        ctx: AudioContext,
        sustained: RefCell<Option<(OscillatorNode, GainNode)>>,
    }

    impl WebAudioBackend {
        pub fn new() -> Option<Self> {
            // Fails outside a secure context
            match AudioContext::new() {
                Ok(ctx) => Some(Self {
                    ctx,
                    sustained: RefCell::new(None),
                }),
                Err(_) => {
                    log::warn!("Failed to create AudioContext - audio disabled");
                    None
                }
            }
        }

        /// Browsers suspend the context until a user gesture
        fn wake(&self) {
            if self.ctx.state() == AudioContextState::Suspended {
                let _ = self.ctx.resume();
            }
        }

        fn create_osc(&self, freq: f32, osc_type: OscillatorType) -> Option<(OscillatorNode, GainNode)> {
            let osc = self.ctx.create_oscillator().ok()?;
            let gain = self.ctx.create_gain().ok()?;
            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&self.ctx.destination()).ok()?;
            Some((osc, gain))
        }

        /// Single tone with an exponential decay and optional pitch sweep
        fn blip(&self, from_hz: f32, to_hz: f32, osc_type: OscillatorType, level: f32, decay: f64) {
            let Some((osc, gain)) = self.create_osc(from_hz, osc_type) else {
                return;
            };
            let t = self.ctx.current_time();
            gain.gain().set_value_at_time(level, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + decay)
                .ok();
            if (from_hz - to_hz).abs() > f32::EPSILON {
                osc.frequency().set_value_at_time(from_hz, t).ok();
                osc.frequency()
                    .exponential_ramp_to_value_at_time(to_hz, t + decay)
                    .ok();
            }
            osc.start().ok();
            osc.stop_with_when(t + decay + 0.05).ok();
        }

        /// Rising arpeggio
        fn chime(&self, notes: &[f32], vol: f32) {
            let t = self.ctx.current_time();
            for (i, &freq) in notes.iter().enumerate() {
                let Some((osc, gain)) = self.create_osc(freq, OscillatorType::Sine) else {
                    continue;
                };
                let start = t + i as f64 * 0.07;
                gain.gain().set_value_at_time(0.0, t).ok();
                gain.gain().set_value_at_time(vol * 0.3, start).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, start + 0.2)
                    .ok();
                osc.start_with_when(start).ok();
                osc.stop_with_when(start + 0.25).ok();
            }
        }
    }

    impl SoundBackend for WebAudioBackend {
        fn play(&self, effect: SoundEffect, vol: f32) {
            self.wake();
            match effect {
                SoundEffect::StickHit => self.blip(220.0, 110.0, OscillatorType::Triangle, vol * 0.4, 0.12),
                SoundEffect::StickFall => self.blip(120.0, 50.0, OscillatorType::Sine, vol * 0.6, 0.15),
                SoundEffect::PlatformLand => self.blip(300.0, 300.0, OscillatorType::Sine, vol * 0.3, 0.08),
                SoundEffect::PerfectLanding => self.chime(&[523.0, 659.0, 784.0, 1047.0], vol),
                SoundEffect::BonusCollect => self.chime(&[880.0, 1320.0], vol),
                SoundEffect::Fall => self.blip(400.0, 60.0, OscillatorType::Sawtooth, vol * 0.35, 0.6),
                SoundEffect::ButtonClick => self.blip(600.0, 600.0, OscillatorType::Square, vol * 0.15, 0.04),
                SoundEffect::StickGrow => self.blip(200.0, 200.0, OscillatorType::Triangle, vol * 0.2, 0.1),
            }
        }

        fn start_loop(&self, effect: SoundEffect, vol: f32) {
            self.wake();
            self.stop_loop(effect);
            // Rising hum while the stick grows
            let Some((osc, gain)) = self.create_osc(180.0, OscillatorType::Triangle) else {
                return;
            };
            let t = self.ctx.current_time();
            gain.gain().set_value_at_time(vol * 0.15, t).ok();
            osc.frequency()
                .linear_ramp_to_value_at_time(900.0, t + 6.0)
                .ok();
            osc.start().ok();
            *self.sustained.borrow_mut() = Some((osc, gain));
        }

        fn stop_loop(&self, _effect: SoundEffect) {
            if let Some((osc, _gain)) = self.sustained.borrow_mut().take() {
                osc.stop().ok();
            }
        }
    }
}
