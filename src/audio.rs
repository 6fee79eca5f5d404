//! Audio cues
//!
//! Which sound goes with which game event is decided here for every target;
//! playback is procedurally generated with the Web Audio API on wasm, so no
//! sound files are needed.

use crate::sim::GameEvent;

/// Sound cue types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCue {
    /// Looping ambience while playing
    Background,
    /// Stone picked up or dropped into the pitcher
    Hit,
    /// Pitcher full
    Success,
}

/// Cue to play for an event, if any
pub fn cue_for_event(event: &GameEvent) -> Option<AudioCue> {
    match event {
        GameEvent::StonePickedUp { .. } | GameEvent::StoneDropped { .. } => Some(AudioCue::Hit),
        GameEvent::GameCompleted { .. } => Some(AudioCue::Success),
        GameEvent::TutorialCompleted => Some(AudioCue::Background),
        GameEvent::GameStarted | GameEvent::StoryAdvanced(_) | GameEvent::GameReset => None,
    }
}

/// The background loop only runs while playing
pub fn ends_background(event: &GameEvent) -> bool {
    matches!(event, GameEvent::GameCompleted { .. } | GameEvent::GameReset)
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, AudioContextState, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioCue, cue_for_event, ends_background};
    use crate::settings::Settings;
    use crate::sim::GameEvent;

    /// Background drone voices (Hz)
    const BACKGROUND_VOICES: [f32; 2] = [110.0, 164.8];
    /// Peak gains relative to the effective volume
    const BACKGROUND_GAIN: f32 = 0.25;
    const HIT_GAIN: f32 = 0.5;
    const SUCCESS_GAIN: f32 = 0.6;

    /// Audio manager for the game
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        settings: Settings,
        background: Option<(Vec<OscillatorNode>, GainNode)>,
        /// Background was requested while the context was suspended
        pending_background: bool,
    }

    impl AudioManager {
        pub fn new(settings: &Settings) -> Self {
            // Fails outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                settings: settings.clone(),
                background: None,
                pending_background: false,
            }
        }

        /// Mute/unmute all audio
        pub fn set_muted(&mut self, muted: bool) {
            self.settings.muted = muted;
            if let Some((_, gain)) = &self.background {
                gain.gain().set_value(self.music_level());
            }
        }

        pub fn is_muted(&self) -> bool {
            self.settings.muted
        }

        /// Play cues for an event and stop the background when a run ends
        pub fn handle_event(&mut self, event: &GameEvent) {
            if ends_background(event) {
                self.stop_background();
            }
            if let Some(cue) = cue_for_event(event) {
                self.play(cue);
            }
        }

        /// Play a cue
        pub fn play(&mut self, cue: AudioCue) {
            let Some(ctx) = self.ctx.clone() else { return };

            match cue {
                AudioCue::Background => {
                    if ctx.state() == AudioContextState::Suspended {
                        // Autoplay policy: wait for the next user gesture
                        log::info!("Audio context suspended, background deferred");
                        self.pending_background = true;
                        return;
                    }
                    self.start_background(&ctx);
                }
                AudioCue::Hit => self.play_hit(&ctx),
                AudioCue::Success => self.play_success(&ctx),
            }
        }

        /// Resume the context and retry a deferred background once
        pub fn on_user_gesture(&mut self) {
            let Some(ctx) = self.ctx.clone() else { return };

            if ctx.state() == AudioContextState::Suspended {
                if let Err(e) = ctx.resume() {
                    log::warn!("Failed to resume audio: {:?}", e);
                }
            }
            if std::mem::take(&mut self.pending_background) {
                self.start_background(&ctx);
            }
        }

        pub fn stop_background(&mut self) {
            self.pending_background = false;
            if let Some((voices, _)) = self.background.take() {
                for osc in voices {
                    if let Err(e) = osc.stop() {
                        log::warn!("Failed to stop background: {:?}", e);
                    }
                }
            }
        }

        // === Sound generators ===

        /// Create an oscillator with gain envelope
        fn create_osc(
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

        fn sfx_level(&self) -> f32 {
            self.settings.effective_sfx_volume()
        }

        fn music_level(&self) -> f32 {
            self.settings.effective_music_volume() * BACKGROUND_GAIN
        }

        /// Soft two-voice drone, fades in and loops until stopped
        fn start_background(&mut self, ctx: &AudioContext) {
            if self.background.is_some() {
                return;
            }
            let Ok(gain) = ctx.create_gain() else {
                log::warn!("Failed to create background gain");
                return;
            };
            if gain.connect_with_audio_node(&ctx.destination()).is_err() {
                log::warn!("Failed to connect background gain");
                return;
            }

            let level = self.music_level();
            let t = ctx.current_time();
            gain.gain().set_value_at_time(0.0, t).ok();
            gain.gain().linear_ramp_to_value_at_time(level, t + 1.5).ok();

            let mut voices = Vec::with_capacity(BACKGROUND_VOICES.len());
            for freq in BACKGROUND_VOICES {
                let Ok(osc) = ctx.create_oscillator() else { continue };
                osc.set_type(OscillatorType::Sine);
                osc.frequency().set_value(freq);
                if osc.connect_with_audio_node(&gain).is_ok() && osc.start().is_ok() {
                    voices.push(osc);
                }
            }

            if voices.is_empty() {
                log::warn!("Background audio failed to start");
                return;
            }
            self.background = Some((voices, gain));
        }

        /// Stone knock - short wooden thump
        fn play_hit(&self, ctx: &AudioContext) {
            let vol = self.sfx_level();
            if vol <= 0.0 {
                return;
            }
            let Some((osc, gain)) = Self::create_osc(ctx, 220.0, OscillatorType::Triangle) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * HIT_GAIN, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.12)
                .ok();
            osc.frequency().set_value_at_time(220.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(90.0, t + 0.1)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.15).ok();
        }

        /// Pitcher full - rising major arpeggio
        fn play_success(&self, ctx: &AudioContext) {
            let vol = self.sfx_level();
            if vol <= 0.0 {
                return;
            }
            for (i, freq) in [523.25, 659.25, 783.99, 1046.5].iter().enumerate() {
                let delay = i as f64 * 0.12;
                if let Some((osc, gain)) = Self::create_osc(ctx, *freq, OscillatorType::Sine) {
                    let t = ctx.current_time() + delay;
                    gain.gain().set_value_at_time(0.0, ctx.current_time()).ok();
                    gain.gain().set_value_at_time(vol * SUCCESS_GAIN * 0.5, t).ok();
                    gain.gain()
                        .exponential_ramp_to_value_at_time(0.01, t + 0.4)
                        .ok();
                    osc.start_with_when(t).ok();
                    osc.stop_with_when(t + 0.45).ok();
                }
            }
        }
    }

    impl Drop for AudioManager {
        fn drop(&mut self) {
            self.stop_background();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{StoneSize, StoryId};

    #[test]
    fn test_cues() {
        let pickup = GameEvent::StonePickedUp {
            id: 1,
            size: StoneSize::Small,
        };
        let dropped = GameEvent::StoneDropped {
            id: 1,
            size: StoneSize::Small,
            water_level: 0.65,
        };
        let done = GameEvent::GameCompleted {
            score: 900,
            elapsed_ms: 10_000.0,
        };

        assert_eq!(cue_for_event(&pickup), Some(AudioCue::Hit));
        assert_eq!(cue_for_event(&dropped), Some(AudioCue::Hit));
        assert_eq!(cue_for_event(&done), Some(AudioCue::Success));
        assert_eq!(cue_for_event(&GameEvent::TutorialCompleted), Some(AudioCue::Background));
        assert_eq!(cue_for_event(&GameEvent::GameStarted), None);
        assert_eq!(cue_for_event(&GameEvent::StoryAdvanced(StoryId::Halfway)), None);
    }

    #[test]
    fn test_background_ends_with_the_run() {
        assert!(ends_background(&GameEvent::GameReset));
        assert!(ends_background(&GameEvent::GameCompleted {
            score: 0,
            elapsed_ms: 0.0
        }));
        assert!(!ends_background(&GameEvent::TutorialCompleted));
    }

    #[test]
    fn test_full_run_cue_sequence() {
        let mut state = crate::sim::GameState::new(3);
        state.start_game(0.0);
        state.complete_tutorial();
        let id = state.stones().iter().find(|s| s.size == StoneSize::Large).unwrap().id;
        state.pick_up_stone(id);
        state.drop_stone(5_000.0);

        let cues: Vec<_> = state.drain_events().iter().filter_map(cue_for_event).collect();
        assert_eq!(
            cues,
            vec![AudioCue::Background, AudioCue::Hit, AudioCue::Hit, AudioCue::Success]
        );
    }
}
