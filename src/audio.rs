//! Fire-and-forget sound effects and a single background music slot.
//!
//! The manager only decides *whether* and *what* to play. Decoding and output belong to an
//! [`AudioBackend`]; a backend that cannot play something should log and move on.

use std::sync::Arc;

use bitflags::bitflags;
use parking_lot::Mutex;
use strum::EnumCount;
use strum_macros::{Display, EnumCount, EnumIter, IntoStaticStr};
use tracing::{debug, trace};

const DEFAULT_VOLUME: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumCount, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Sound {
    Eat,
    Hit,
    Push,
    Steal,
    Warning,
    Escort,
    Kill,
    Portal,
    Lose,
    Win,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Music {
    Collection,
    Escort,
}

bitflags! {
    #[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Mute: u8 {
        const SOUND = 1 << 0;
        const MUSIC = 1 << 1;
    }
}

pub trait AudioBackend {
    fn play_sound(&mut self, name: &str, volume: f32);
    fn play_music(&mut self, name: &str);
    fn stop_music(&mut self);
}

/// Plays nothing.
#[derive(Debug, Default)]
pub struct NullBackend;

impl AudioBackend for NullBackend {
    fn play_sound(&mut self, _name: &str, _volume: f32) {}
    fn play_music(&mut self, _name: &str) {}
    fn stop_music(&mut self) {}
}

#[derive(Debug, Clone, PartialEq)]
pub enum AudioCall {
    Sound { name: String, volume: f32 },
    Music(String),
    StopMusic,
}

/// Remembers every call it receives. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    calls: Arc<Mutex<Vec<AudioCall>>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<AudioCall> {
        self.calls.lock().clone()
    }

    pub fn sounds(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                AudioCall::Sound { name, .. } => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

impl AudioBackend for RecordingBackend {
    fn play_sound(&mut self, name: &str, volume: f32) {
        self.calls.lock().push(AudioCall::Sound {
            name: name.to_string(),
            volume,
        });
    }

    fn play_music(&mut self, name: &str) {
        self.calls.lock().push(AudioCall::Music(name.to_string()));
    }

    fn stop_music(&mut self) {
        self.calls.lock().push(AudioCall::StopMusic);
    }
}

pub struct AudioManager {
    backend: Box<dyn AudioBackend>,
    volumes: micromap::Map<Sound, f32, { Sound::COUNT }>,
    mute: Mute,
    /// The track that should be playing when music is not muted.
    track: Option<Music>,
}

impl AudioManager {
    pub fn new(backend: Box<dyn AudioBackend>) -> Self {
        let mut volumes = micromap::Map::new();
        for sound in <Sound as strum::IntoEnumIterator>::iter() {
            let volume = match sound {
                Sound::Eat | Sound::Push => DEFAULT_VOLUME * 0.6,
                Sound::Lose | Sound::Win | Sound::Warning => DEFAULT_VOLUME * 1.4,
                _ => DEFAULT_VOLUME,
            };
            volumes.insert(sound, volume);
        }
        Self {
            backend,
            volumes,
            mute: Mute::empty(),
            track: None,
        }
    }

    pub fn silent() -> Self {
        Self::new(Box::new(NullBackend))
    }

    pub fn play(&mut self, sound: Sound) {
        if self.mute.contains(Mute::SOUND) {
            return;
        }
        let volume = self.volumes.get(&sound).copied().unwrap_or(DEFAULT_VOLUME);
        trace!(%sound, volume, "Playing sound");
        self.backend.play_sound(sound.into(), volume);
    }

    /// Swaps the background track. Replaying the current track is a no-op.
    pub fn play_music(&mut self, music: Music) {
        if self.track == Some(music) {
            return;
        }
        self.track = Some(music);
        if !self.mute.contains(Mute::MUSIC) {
            debug!(%music, "Switching music");
            self.backend.play_music(music.into());
        }
    }

    pub fn stop_music(&mut self) {
        if self.track.take().is_some() && !self.mute.contains(Mute::MUSIC) {
            self.backend.stop_music();
        }
    }

    pub fn mute(&self) -> Mute {
        self.mute
    }

    pub fn set_mute(&mut self, mute: Mute) {
        let was_music_muted = self.mute.contains(Mute::MUSIC);
        self.mute = mute;
        match (was_music_muted, mute.contains(Mute::MUSIC), self.track) {
            (false, true, Some(_)) => self.backend.stop_music(),
            (true, false, Some(track)) => self.backend.play_music(track.into()),
            _ => {}
        }
    }

    pub fn toggle(&mut self, flag: Mute) {
        self.set_mute(self.mute ^ flag);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sound_mute_suppresses_effects_only() {
        let recorder = RecordingBackend::new();
        let mut audio = AudioManager::new(Box::new(recorder.clone()));
        audio.toggle(Mute::SOUND);
        audio.play(Sound::Eat);
        audio.play_music(Music::Escort);
        assert_eq!(recorder.calls(), vec![AudioCall::Music("escort".into())]);
    }

    #[test]
    fn test_music_mute_round_trip_resumes_track() {
        let recorder = RecordingBackend::new();
        let mut audio = AudioManager::new(Box::new(recorder.clone()));
        audio.play_music(Music::Collection);
        audio.toggle(Mute::MUSIC);
        audio.toggle(Mute::MUSIC);
        assert_eq!(
            recorder.calls(),
            vec![
                AudioCall::Music("collection".into()),
                AudioCall::StopMusic,
                AudioCall::Music("collection".into()),
            ]
        );
    }

    #[test]
    fn test_replaying_same_track_is_ignored() {
        let recorder = RecordingBackend::new();
        let mut audio = AudioManager::new(Box::new(recorder.clone()));
        audio.play_music(Music::Escort);
        audio.play_music(Music::Escort);
        assert_eq!(recorder.calls().len(), 1);
    }
}
