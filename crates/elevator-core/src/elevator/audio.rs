//! Elevator music and the arrival ding.
//!
//! [`AudioManager`] owns exactly two playback handles, built lazily through
//! a [`SoundBackend`]. It has no timing logic of its own; the controller
//! tells it when to start, ding and stop.
//!
//! Every playback failure is logged and swallowed. Sound is decoration and
//! must never stop the scroll.

use std::fmt;
use std::path::PathBuf;

use url::Url;

use crate::{Error, Result};

/// Sounds shipped with the library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BundledSound {
    /// Elevator music, played for the whole ride
    Ambient,
    /// Arrival ding
    Chime,
}

impl BundledSound {
    pub fn file_name(self) -> &'static str {
        match self {
            BundledSound::Ambient => "elevator.wav",
            BundledSound::Chime => "ding.wav",
        }
    }

    /// The encoded audio, embedded in the binary
    pub fn bytes(self) -> &'static [u8] {
        match self {
            BundledSound::Ambient => include_bytes!("../../assets/elevator.wav"),
            BundledSound::Chime => include_bytes!("../../assets/ding.wav"),
        }
    }
}

/// Where a handle's audio comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoundSource {
    Bundled(BundledSound),
    /// User supplied path or URL
    Custom(String),
}

impl SoundSource {
    /// Resolve a custom source to a local file.
    ///
    /// Accepts plain paths and `file://` URLs. Bundled sources have no
    /// path and return `Ok(None)`.
    pub fn local_path(&self) -> Result<Option<PathBuf>> {
        let SoundSource::Custom(raw) = self else {
            return Ok(None);
        };

        if !raw.contains("://") {
            return Ok(Some(PathBuf::from(raw)));
        }

        let url = Url::parse(raw)?;
        if url.scheme() != "file" {
            return Err(Error::Audio(format!(
                "unsupported scheme '{}' in {}",
                url.scheme(),
                raw
            )));
        }
        url.to_file_path()
            .map(Some)
            .map_err(|_| Error::Audio(format!("not a local file: {}", raw)))
    }

    /// Short name for display: the file name without its directory
    pub fn label(&self) -> String {
        match self {
            SoundSource::Bundled(sound) => sound.file_name().to_string(),
            SoundSource::Custom(raw) => raw
                .rsplit(['/', '\\'])
                .find(|part| !part.is_empty())
                .unwrap_or(raw)
                .to_string(),
        }
    }
}

impl fmt::Display for SoundSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SoundSource::Bundled(sound) => write!(f, "bundled:{}", sound.file_name()),
            SoundSource::Custom(raw) => f.write_str(raw),
        }
    }
}

/// One loaded sound
pub trait Playable {
    /// Warm up so that `play` starts without delay
    fn preload(&mut self) -> Result<()>;

    /// Seek back to the beginning
    fn rewind(&mut self);

    /// 0.0 to 1.0
    fn set_volume(&mut self, volume: f32);

    /// Start playback. May be refused by the platform.
    fn play(&mut self) -> Result<()>;

    fn pause(&mut self);

    fn is_playing(&self) -> bool;
}

/// Builds playback handles
pub trait SoundBackend {
    type Handle: Playable;

    /// Build a handle for `source`. `slot` names the bundled sound it
    /// stands in for, so backends can treat the music and the ding apart.
    fn load(&mut self, source: &SoundSource, slot: BundledSound) -> Result<Self::Handle>;
}

struct Track<H> {
    source: SoundSource,
    handle: H,
}

impl<H: Playable> Track<H> {
    fn stop(&mut self) {
        self.handle.pause();
        self.handle.rewind();
    }

    fn play_from_start(&mut self) {
        self.handle.rewind();
        self.handle.set_volume(1.0);
        if let Err(e) = self.handle.play() {
            tracing::debug!("Audio playback prevented for {}: {}", self.source, e);
        }
    }
}

/// Owner of the ambient track and the completion chime
pub struct AudioManager<B: SoundBackend> {
    backend: B,
    ambient: Option<Track<B::Handle>>,
    chime: Option<Track<B::Handle>>,
    enabled: bool,
}

impl<B: SoundBackend> AudioManager<B> {
    /// Create a manager and build its sounds right away
    pub fn new(
        backend: B,
        enabled: bool,
        ambient_source: Option<&str>,
        completion_source: Option<&str>,
    ) -> Self {
        let mut manager = Self {
            backend,
            ambient: None,
            chime: None,
            enabled,
        };
        manager.configure(enabled, ambient_source, completion_source);
        manager
    }

    /// Apply new settings.
    ///
    /// Disabling drops both handles. When enabled, a track is rebuilt only
    /// if an explicit source differs from the one it was built from; with
    /// no explicit source an existing handle is kept and a missing one is
    /// built from the bundled default. If any handle fails to build, audio
    /// falls back to disabled.
    pub fn configure(
        &mut self,
        enabled: bool,
        ambient_source: Option<&str>,
        completion_source: Option<&str>,
    ) {
        if !enabled {
            self.release();
            self.enabled = false;
            tracing::debug!("Audio disabled");
            return;
        }

        self.enabled = true;

        let result = refresh_track(
            &mut self.backend,
            &mut self.ambient,
            BundledSound::Ambient,
            ambient_source,
        )
        .and_then(|_| {
            refresh_track(
                &mut self.backend,
                &mut self.chime,
                BundledSound::Chime,
                completion_source,
            )
        });

        if let Err(e) = result {
            tracing::error!("Error initializing audio, continuing without sound: {}", e);
            self.release();
            self.enabled = false;
        }
    }

    /// Start the elevator music from the top
    pub fn start(&mut self) {
        if !self.enabled {
            return;
        }
        if let Some(track) = self.ambient.as_mut() {
            track.play_from_start();
        }
    }

    /// Stop the music and ding
    pub fn play_completion(&mut self) {
        if !self.enabled {
            return;
        }
        if let Some(track) = self.ambient.as_mut() {
            track.stop();
        }
        if let Some(track) = self.chime.as_mut() {
            track.play_from_start();
        }
    }

    /// Pause and rewind both sounds. Safe to call repeatedly.
    pub fn stop_all(&mut self) {
        if let Some(track) = self.ambient.as_mut() {
            track.stop();
        }
        if let Some(track) = self.chime.as_mut() {
            track.stop();
        }
    }

    /// Stop everything and drop both handles
    pub fn release(&mut self) {
        self.stop_all();
        self.ambient = None;
        self.chime = None;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_ambient_playing(&self) -> bool {
        self.ambient
            .as_ref()
            .is_some_and(|track| track.handle.is_playing())
    }

    pub fn ambient_source(&self) -> Option<&SoundSource> {
        self.ambient.as_ref().map(|track| &track.source)
    }

    pub fn completion_source(&self) -> Option<&SoundSource> {
        self.chime.as_ref().map(|track| &track.source)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

fn refresh_track<B: SoundBackend>(
    backend: &mut B,
    slot: &mut Option<Track<B::Handle>>,
    default: BundledSound,
    source: Option<&str>,
) -> Result<()> {
    let wanted = match source {
        Some(raw) => SoundSource::Custom(raw.to_string()),
        None if slot.is_some() => return Ok(()),
        None => SoundSource::Bundled(default),
    };

    if slot.as_ref().is_some_and(|track| track.source == wanted) {
        return Ok(());
    }

    if let Some(mut stale) = slot.take() {
        stale.stop();
    }

    let mut handle = backend.load(&wanted, default)?;
    handle.preload()?;
    tracing::debug!("Loaded sound {}", wanted);

    *slot = Some(Track {
        source: wanted,
        handle,
    });
    Ok(())
}
