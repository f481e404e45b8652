//! Sound backends for the terminal host.
//!
//! [`HostSoundBackend::detect`] plays through the default output device
//! and falls back to the terminal bell when none can be opened.

pub mod clip;
pub mod speaker;
pub mod terminal;

use std::io::{self, Write};

use elevator_core::elevator::{BundledSound, Playable, SoundBackend, SoundSource};
use elevator_core::Result;

pub use clip::{Clip, Pcm};
pub use speaker::{SpeakerBackend, SpeakerSound};
pub use terminal::{TerminalSound, TerminalSoundBackend};

pub enum HostSoundBackend<W: Write = io::Stderr> {
    Speaker(SpeakerBackend),
    Terminal(TerminalSoundBackend<W>),
}

impl<W: Write> HostSoundBackend<W> {
    /// Open the default output device, or ring `bell` if there is none
    pub fn detect(bell: W) -> Self {
        match SpeakerBackend::open() {
            Ok(speaker) => HostSoundBackend::Speaker(speaker),
            Err(e) => {
                tracing::warn!("No audio output ({}), using the terminal bell", e);
                HostSoundBackend::Terminal(TerminalSoundBackend::new(bell))
            }
        }
    }

    /// Where sound goes, for display
    pub fn describe(&self) -> String {
        match self {
            HostSoundBackend::Speaker(speaker) => speaker.device_name().to_string(),
            HostSoundBackend::Terminal(_) => "terminal bell".to_string(),
        }
    }
}

impl<W: Write> SoundBackend for HostSoundBackend<W> {
    type Handle = HostSound<W>;

    fn load(&mut self, source: &SoundSource, slot: BundledSound) -> Result<HostSound<W>> {
        match self {
            HostSoundBackend::Speaker(backend) => {
                backend.load(source, slot).map(HostSound::Speaker)
            }
            HostSoundBackend::Terminal(backend) => {
                backend.load(source, slot).map(HostSound::Terminal)
            }
        }
    }
}

pub enum HostSound<W: Write> {
    Speaker(SpeakerSound),
    Terminal(TerminalSound<W>),
}

impl<W: Write> HostSound<W> {
    fn playable(&mut self) -> &mut dyn Playable {
        match self {
            HostSound::Speaker(sound) => sound,
            HostSound::Terminal(sound) => sound,
        }
    }
}

impl<W: Write> Playable for HostSound<W> {
    fn preload(&mut self) -> Result<()> {
        self.playable().preload()
    }

    fn rewind(&mut self) {
        self.playable().rewind();
    }

    fn set_volume(&mut self, volume: f32) {
        self.playable().set_volume(volume);
    }

    fn play(&mut self) -> Result<()> {
        self.playable().play()
    }

    fn pause(&mut self) {
        self.playable().pause();
    }

    fn is_playing(&self) -> bool {
        match self {
            HostSound::Speaker(sound) => sound.is_playing(),
            HostSound::Terminal(sound) => sound.is_playing(),
        }
    }
}
