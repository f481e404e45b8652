//! Headless host: a virtual frame clock and an in-memory page.
//!
//! Used by `elevator simulate` and throughout the controller tests.

use std::cell::RefCell;
use std::rc::Rc;

use super::audio::{BundledSound, Playable, SoundBackend, SoundSource};
use super::host::{FocusSignal, FrameClock, FrameHandle, Viewport};
use crate::{Error, Result};

/// Frame clock that advances a fixed step per delivered frame.
#[derive(Debug, Clone)]
pub struct StepClock {
    now: f64,
    step: f64,
    next_id: u64,
    pending: Option<FrameHandle>,
    requested: usize,
    cancelled: Vec<FrameHandle>,
}

impl StepClock {
    /// `step_ms` is the virtual time between frames (16.0 for ~60fps)
    pub fn new(step_ms: f64) -> Self {
        Self {
            now: 0.0,
            step: step_ms,
            next_id: 1,
            pending: None,
            requested: 0,
            cancelled: Vec::new(),
        }
    }

    /// Fire the pending request, if any, one step later than the last frame
    pub fn advance(&mut self) -> Option<(FrameHandle, f64)> {
        let handle = self.pending.take()?;
        self.now += self.step;
        Some((handle, self.now))
    }

    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }

    /// Total number of frame requests seen
    pub fn requested(&self) -> usize {
        self.requested
    }

    pub fn cancelled(&self) -> &[FrameHandle] {
        &self.cancelled
    }
}

impl Default for StepClock {
    fn default() -> Self {
        Self::new(16.0)
    }
}

impl FrameClock for StepClock {
    fn request_frame(&mut self) -> FrameHandle {
        let handle = FrameHandle(self.next_id);
        self.next_id += 1;
        if let Some(previous) = self.pending.replace(handle) {
            tracing::warn!("{} requested while {} still pending", handle, previous);
        }
        self.requested += 1;
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
        self.cancelled.push(handle);
    }
}

#[derive(Debug, Clone)]
struct FlatElement {
    id: String,
    offset_top: f64,
    parent: Option<usize>,
}

/// In-memory page that records every scroll write.
#[derive(Debug, Clone, Default)]
pub struct FlatViewport {
    offset: f64,
    elements: Vec<FlatElement>,
    writes: Vec<f64>,
}

impl FlatViewport {
    pub fn new(offset: f64) -> Self {
        Self {
            offset,
            elements: Vec::new(),
            writes: Vec::new(),
        }
    }

    /// Add an element and return its index for use as a parent
    pub fn add_element(&mut self, id: &str, offset_top: f64, parent: Option<usize>) -> usize {
        self.elements.push(FlatElement {
            id: id.to_string(),
            offset_top,
            parent,
        });
        self.elements.len() - 1
    }

    pub fn set_parent(&mut self, element: usize, parent: Option<usize>) {
        if let Some(el) = self.elements.get_mut(element) {
            el.parent = parent;
        }
    }

    /// Every offset written through `set_scroll_offset`, in order
    pub fn writes(&self) -> &[f64] {
        &self.writes
    }

    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }
}

impl Viewport for FlatViewport {
    type Element = usize;

    fn scroll_offset(&self) -> f64 {
        self.offset
    }

    fn set_scroll_offset(&mut self, offset: f64) {
        self.offset = offset;
        self.writes.push(offset);
    }

    fn element_by_id(&self, id: &str) -> Option<usize> {
        self.elements.iter().position(|el| el.id == id)
    }

    fn offset_top(&self, element: usize) -> f64 {
        self.elements.get(element).map_or(0.0, |el| el.offset_top)
    }

    fn offset_parent(&self, element: usize) -> Option<usize> {
        self.elements.get(element).and_then(|el| el.parent)
    }
}

/// Focus signal that only remembers whether anyone is listening.
#[derive(Debug, Clone, Copy, Default)]
pub struct FocusFlag {
    subscribed: bool,
}

impl FocusFlag {
    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }
}

impl FocusSignal for FocusFlag {
    fn subscribe(&mut self) {
        self.subscribed = true;
    }

    fn unsubscribe(&mut self) {
        self.subscribed = false;
    }
}

/// Something a [`RecordingSound`] was asked to do
#[derive(Debug, Clone, PartialEq)]
pub enum SoundEvent {
    Loaded(SoundSource),
    Preloaded(SoundSource),
    Rewound(SoundSource),
    Volume(SoundSource, f32),
    Played(SoundSource),
    Paused(SoundSource),
}

/// Shared, ordered log of sound events
#[derive(Debug, Clone, Default)]
pub struct SoundLog(Rc<RefCell<Vec<SoundEvent>>>);

impl SoundLog {
    fn push(&self, event: SoundEvent) {
        self.0.borrow_mut().push(event);
    }

    pub fn events(&self) -> Vec<SoundEvent> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    pub fn played(&self) -> usize {
        self.0
            .borrow()
            .iter()
            .filter(|event| matches!(event, SoundEvent::Played(_)))
            .count()
    }
}

/// Sound backend that plays nothing and writes everything down.
#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    log: SoundLog,
    fail_load: bool,
    fail_play: bool,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `load` fails, as if the audio device were missing
    pub fn failing_load(mut self) -> Self {
        self.fail_load = true;
        self
    }

    /// Every `play` is refused, as if autoplay were blocked
    pub fn failing_play(mut self) -> Self {
        self.fail_play = true;
        self
    }

    pub fn log(&self) -> SoundLog {
        self.log.clone()
    }
}

impl SoundBackend for RecordingBackend {
    type Handle = RecordingSound;

    fn load(&mut self, source: &SoundSource, _slot: BundledSound) -> Result<RecordingSound> {
        if self.fail_load {
            return Err(Error::Audio(format!("no audio device for {}", source)));
        }
        self.log.push(SoundEvent::Loaded(source.clone()));
        Ok(RecordingSound {
            source: source.clone(),
            log: self.log.clone(),
            playing: false,
            fail_play: self.fail_play,
        })
    }
}

#[derive(Debug)]
pub struct RecordingSound {
    source: SoundSource,
    log: SoundLog,
    playing: bool,
    fail_play: bool,
}

impl Playable for RecordingSound {
    fn preload(&mut self) -> Result<()> {
        self.log.push(SoundEvent::Preloaded(self.source.clone()));
        Ok(())
    }

    fn rewind(&mut self) {
        self.log.push(SoundEvent::Rewound(self.source.clone()));
    }

    fn set_volume(&mut self, volume: f32) {
        self.log.push(SoundEvent::Volume(self.source.clone(), volume));
    }

    fn play(&mut self) -> Result<()> {
        if self.fail_play {
            return Err(Error::Audio("playback refused".to_string()));
        }
        self.playing = true;
        self.log.push(SoundEvent::Played(self.source.clone()));
        Ok(())
    }

    fn pause(&mut self) {
        self.playing = false;
        self.log.push(SoundEvent::Paused(self.source.clone()));
    }

    fn is_playing(&self) -> bool {
        self.playing
    }
}
