//! Player preferences
//!
//! Persisted separately from progress, under its own storage key.

use serde::{Deserialize, Serialize};

use crate::audio::AudioController;
use crate::error::StoreError;
use crate::persistence::{KeyValueStore, keys, load_json, save_json};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Mute all audio
    pub muted: bool,
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            muted: false,
            master_volume: 0.8,
            sfx_volume: 1.0,
        }
    }
}

impl Settings {
    /// Effect volume, ignoring mute
    pub fn effective_volume(&self) -> f32 {
        (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
    }

    /// Push mute and volume into the audio controller
    pub fn apply(&self, audio: &AudioController) {
        audio.set_volume(self.effective_volume());
        audio.set_muted(self.muted);
    }

    /// Load settings; absent or unreadable data falls back to defaults
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match load_json(store, keys::SETTINGS) {
            Ok(Some(settings)) => {
                log::info!("Loaded settings");
                settings
            }
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Ignoring stored settings: {}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StoreError> {
        save_json(store, keys::SETTINGS, self)?;
        log::info!("Settings saved");
        Ok(())
    }
}
