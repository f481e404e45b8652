//! Fallback for machines without an output device.
//!
//! Sources are still probed and decoded, so a bad file fails the same way
//! it would on a speaker. The music only keeps time (it "plays" for as
//! long as the decoded clip lasts) and the ding rings the terminal bell.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;
use std::time::{Duration, Instant};

use elevator_core::elevator::{BundledSound, Playable, SoundBackend, SoundSource};
use elevator_core::{Error, Result};

use super::clip::Clip;

const BELL: &[u8] = b"\x07";

pub struct TerminalSoundBackend<W: Write = io::Stderr> {
    bell: Rc<RefCell<W>>,
}

impl TerminalSoundBackend<io::Stderr> {
    /// Ring the bell on stderr so it never lands in the drawn frame
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write> TerminalSoundBackend<W> {
    pub fn new(bell: W) -> Self {
        Self {
            bell: Rc::new(RefCell::new(bell)),
        }
    }

    /// The bell output, for inspection
    pub fn bell(&self) -> Rc<RefCell<W>> {
        self.bell.clone()
    }
}

impl<W: Write> SoundBackend for TerminalSoundBackend<W> {
    type Handle = TerminalSound<W>;

    fn load(&mut self, source: &SoundSource, slot: BundledSound) -> Result<TerminalSound<W>> {
        let clip = Clip::open(source)?;
        Ok(TerminalSound {
            label: clip.label().to_string(),
            clip: Some(clip),
            length: None,
            slot,
            bell: self.bell.clone(),
            volume: 1.0,
            started: None,
        })
    }
}

pub struct TerminalSound<W: Write> {
    label: String,
    /// Until preloaded
    clip: Option<Clip>,
    length: Option<Duration>,
    slot: BundledSound,
    bell: Rc<RefCell<W>>,
    volume: f32,
    started: Option<Instant>,
}

impl<W: Write> TerminalSound<W> {
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl<W: Write> Playable for TerminalSound<W> {
    fn preload(&mut self) -> Result<()> {
        if self.length.is_some() {
            return Ok(());
        }
        let clip = self
            .clip
            .take()
            .ok_or_else(|| Error::Audio(format!("{} has nothing to decode", self.label)))?;
        let pcm = clip.decode()?;
        self.length = Some(Duration::from_secs_f64(pcm.duration_secs()));
        Ok(())
    }

    fn rewind(&mut self) {
        if self.started.is_some() {
            self.started = Some(Instant::now());
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn play(&mut self) -> Result<()> {
        self.preload()?;
        match self.slot {
            BundledSound::Ambient => self.started = Some(Instant::now()),
            // A ding is over as soon as it starts
            BundledSound::Chime => {
                if self.volume > 0.0 {
                    let mut bell = self.bell.borrow_mut();
                    bell.write_all(BELL)?;
                    bell.flush()?;
                }
            }
        }
        Ok(())
    }

    fn pause(&mut self) {
        self.started = None;
    }

    fn is_playing(&self) -> bool {
        match (self.started, self.length) {
            (Some(started), Some(length)) => started.elapsed() < length,
            _ => false,
        }
    }
}
