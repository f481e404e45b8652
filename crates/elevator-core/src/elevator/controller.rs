//! The elevation controller.
//!
//! Two states: idle and elevating. A ride starts with [`Elevator::trigger`],
//! advances one step per [`Elevator::on_frame`] and ends either naturally
//! (ding, `on_end`) or early on [`Elevator::focus_lost`] (snap to the
//! destination, no `on_end`).

use super::audio::{AudioManager, SoundBackend};
use super::easing::ease_in_out_quad;
use super::geometry::resolve_target_offset;
use super::host::{FocusSignal, FrameClock, FrameHandle, Viewport};
use super::options::ElevatorOptions;
use super::timing::resolve_duration;

/// No-argument notification hook
pub type Callback = Box<dyn FnMut()>;

/// One ride in flight
#[derive(Debug, Clone, Copy, PartialEq)]
struct Session {
    start_position: f64,
    end_position: f64,
    /// Timestamp of the first frame, fixed once seen
    start_time: Option<f64>,
    /// The one outstanding frame request
    frame: Option<FrameHandle>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    Elevating(Session),
}

/// Builder for [`Elevator`], mainly to attach callbacks
pub struct ElevatorBuilder {
    options: ElevatorOptions,
    on_start: Option<Callback>,
    on_end: Option<Callback>,
}

impl ElevatorBuilder {
    pub fn new(options: ElevatorOptions) -> Self {
        Self {
            options,
            on_start: None,
            on_end: None,
        }
    }

    /// Called when a ride begins
    pub fn on_start(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_start = Some(Box::new(callback));
        self
    }

    /// Called when a ride arrives (not when it is interrupted)
    pub fn on_end(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_end = Some(Box::new(callback));
        self
    }

    pub fn build<V, C, F, B>(
        self,
        viewport: V,
        clock: C,
        mut focus: F,
        backend: B,
    ) -> Elevator<V, C, F, B>
    where
        V: Viewport,
        C: FrameClock,
        F: FocusSignal,
        B: SoundBackend,
    {
        let audio = AudioManager::new(
            backend,
            self.options.audio_enabled,
            self.options.ambient_audio_source.as_deref(),
            self.options.completion_audio_source.as_deref(),
        );
        focus.subscribe();

        Elevator {
            options: self.options,
            viewport,
            clock,
            focus,
            audio,
            on_start: self.on_start,
            on_end: self.on_end,
            phase: Phase::Idle,
        }
    }
}

/// Scroll-to-target controller with elevator music.
///
/// Owns its host collaborators and the [`AudioManager`]. Dropping the
/// controller cancels any pending frame and unsubscribes from focus loss.
pub struct Elevator<V, C, F, B>
where
    V: Viewport,
    C: FrameClock,
    F: FocusSignal,
    B: SoundBackend,
{
    options: ElevatorOptions,
    viewport: V,
    clock: C,
    focus: F,
    audio: AudioManager<B>,
    on_start: Option<Callback>,
    on_end: Option<Callback>,
    phase: Phase,
}

impl<V, C, F, B> Elevator<V, C, F, B>
where
    V: Viewport,
    C: FrameClock,
    F: FocusSignal,
    B: SoundBackend,
{
    /// Check if a ride is in progress
    #[inline]
    pub fn is_active(&self) -> bool {
        matches!(self.phase, Phase::Elevating(_))
    }

    /// Where the current ride ends, if one is in progress
    pub fn destination(&self) -> Option<f64> {
        match self.phase {
            Phase::Elevating(session) => Some(session.end_position),
            Phase::Idle => None,
        }
    }

    /// Start a ride. Ignored while one is already in progress.
    pub fn trigger(&mut self) {
        if self.is_active() {
            tracing::debug!("Elevator already moving, ignoring trigger");
            return;
        }

        if self.options.audio_enabled {
            self.audio.start();
        }

        let padding = self.options.vertical_padding;
        let end_position = match self.options.target_element.as_deref() {
            Some(id) => resolve_target_offset(&self.viewport, id, padding),
            None => padding,
        };
        let start_position = self.viewport.scroll_offset();

        let frame = self.clock.request_frame();
        self.phase = Phase::Elevating(Session {
            start_position,
            end_position,
            start_time: None,
            frame: Some(frame),
        });
        tracing::debug!(
            "Elevating from {:.1} to {:.1} ({})",
            start_position,
            end_position,
            frame
        );

        if let Some(on_start) = self.on_start.as_mut() {
            on_start();
        }
    }

    /// Advance the ride. The host calls this when a requested frame is due.
    ///
    /// Frames that do not belong to the current ride (cancelled, or
    /// delivered after the ride ended) are ignored.
    pub fn on_frame(&mut self, handle: FrameHandle, timestamp: f64) {
        let Phase::Elevating(mut session) = self.phase else {
            tracing::trace!("Ignoring {} while idle", handle);
            return;
        };
        if session.frame != Some(handle) {
            tracing::debug!("Ignoring stale {}", handle);
            return;
        }
        session.frame = None;

        if !session.start_position.is_finite() || !session.end_position.is_finite() {
            tracing::error!(
                "Ride positions unusable (from {} to {}), aborting",
                session.start_position,
                session.end_position
            );
            self.phase = Phase::Idle;
            self.audio.stop_all();
            return;
        }

        let start_time = *session.start_time.get_or_insert(timestamp);
        let elapsed = timestamp - start_time;
        let delta = session.end_position - session.start_position;
        let duration = resolve_duration(delta.abs(), self.options.duration);

        // Land exactly on the destination instead of wherever the curve
        // evaluates past `duration`
        let position = if elapsed < duration {
            ease_in_out_quad(elapsed, session.start_position, delta, duration)
        } else {
            session.end_position
        };
        self.viewport.set_scroll_offset(position);

        if elapsed < duration {
            session.frame = Some(self.clock.request_frame());
            self.phase = Phase::Elevating(session);
        } else {
            self.arrive(session);
        }
    }

    /// Interrupt the ride: snap to the destination without the ding or `on_end`.
    ///
    /// The host calls this when its window or terminal loses focus.
    pub fn focus_lost(&mut self) {
        let Phase::Elevating(session) = std::mem::replace(&mut self.phase, Phase::Idle) else {
            return;
        };

        if let Some(frame) = session.frame {
            self.clock.cancel_frame(frame);
        }
        self.audio.stop_all();

        if session.end_position.is_finite() {
            self.viewport.set_scroll_offset(session.end_position);
        }
        tracing::debug!("Focus lost, jumped to {:.1}", session.end_position);
    }

    /// Replace the options. Audio handles are rebuilt only where sources changed.
    ///
    /// A ride in progress keeps its destination.
    pub fn reconfigure(&mut self, options: ElevatorOptions) {
        self.audio.configure(
            options.audio_enabled,
            options.ambient_audio_source.as_deref(),
            options.completion_audio_source.as_deref(),
        );
        self.options = options;
    }

    /// Finish a ride whose last frame was just delivered, so nothing is pending
    fn arrive(&mut self, session: Session) {
        if self.options.audio_enabled {
            self.audio.play_completion();
        }
        if let Some(on_end) = self.on_end.as_mut() {
            on_end();
        }

        self.phase = Phase::Idle;
        tracing::debug!("Arrived at {:.1}", session.end_position);
    }

    pub fn options(&self) -> &ElevatorOptions {
        &self.options
    }

    pub fn audio(&self) -> &AudioManager<B> {
        &self.audio
    }

    pub fn viewport(&self) -> &V {
        &self.viewport
    }

    /// Mutable access for host-driven scrolling between rides
    pub fn viewport_mut(&mut self) -> &mut V {
        &mut self.viewport
    }

    pub fn frame_clock(&self) -> &C {
        &self.clock
    }

    pub fn frame_clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn focus_signal(&self) -> &F {
        &self.focus
    }
}

impl<V, C, F, B> Drop for Elevator<V, C, F, B>
where
    V: Viewport,
    C: FrameClock,
    F: FocusSignal,
    B: SoundBackend,
{
    fn drop(&mut self) {
        if let Phase::Elevating(Session {
            frame: Some(frame), ..
        }) = self.phase
        {
            self.clock.cancel_frame(frame);
        }
        self.phase = Phase::Idle;
        self.focus.unsubscribe();
        self.audio.release();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::elevator::sim::{
        FlatViewport, FocusFlag, RecordingBackend, SoundEvent, SoundLog, StepClock,
    };

    type TestElevator<'a> =
        Elevator<&'a mut FlatViewport, &'a mut StepClock, FocusFlag, RecordingBackend>;

    fn counter() -> (Rc<Cell<usize>>, impl FnMut() + 'static) {
        let count = Rc::new(Cell::new(0));
        let inner = count.clone();
        (count, move || inner.set(inner.get() + 1))
    }

    /// Deliver frames until the clock has nothing pending
    fn run(elevator: &mut TestElevator<'_>) -> usize {
        let mut frames = 0;
        while let Some((handle, ts)) = elevator.frame_clock_mut().advance() {
            elevator.on_frame(handle, ts);
            frames += 1;
        }
        frames
    }

    fn page_with_sections(offset: f64) -> FlatViewport {
        let mut page = FlatViewport::new(offset);
        let container = page.add_element("page", 200.0, None);
        page.add_element("section-1", 0.0, Some(container));
        page.add_element("section-2", 600.0, Some(container));
        page
    }

    fn build<'a>(
        page: &'a mut FlatViewport,
        clock: &'a mut StepClock,
        options: ElevatorOptions,
    ) -> (TestElevator<'a>, SoundLog) {
        let backend = RecordingBackend::new();
        let log = backend.log();
        let elevator =
            ElevatorBuilder::new(options).build(page, clock, FocusFlag::default(), backend);
        (elevator, log)
    }

    #[test]
    fn test_starts_idle() {
        let mut page = FlatViewport::new(100.0);
        let mut clock = StepClock::default();
        let (elevator, _) = build(&mut page, &mut clock, ElevatorOptions::default());

        assert!(!elevator.is_active());
        assert!(elevator.destination().is_none());
        assert!(elevator.focus_signal().is_subscribed());
    }

    #[test]
    fn test_ride_to_top_is_strictly_decreasing() {
        let mut page = FlatViewport::new(5000.0);
        let mut clock = StepClock::new(16.0);
        let (end_count, on_end) = counter();
        let backend = RecordingBackend::new();
        let mut elevator = ElevatorBuilder::new(ElevatorOptions::default().with_audio(false))
            .on_end(on_end)
            .build(&mut page, &mut clock, FocusFlag::default(), backend);

        elevator.trigger();
        assert!(elevator.is_active());
        assert_eq!(elevator.destination(), Some(0.0));

        while let Some((handle, ts)) = elevator.frame_clock_mut().advance() {
            assert!(elevator.is_active());
            assert_eq!(end_count.get(), 0);
            elevator.on_frame(handle, ts);
        }

        assert!(!elevator.is_active());
        assert_eq!(end_count.get(), 1);
        drop(elevator);

        let writes = page.writes();
        assert_eq!(writes.first(), Some(&5000.0));
        assert_eq!(writes.last(), Some(&0.0));
        for pair in writes.windows(2) {
            assert!(pair[1] < pair[0], "{} then {}", pair[0], pair[1]);
        }
        // 2000ms auto duration at 16ms per frame, plus the landing frame
        assert_eq!(writes.len(), 126);
    }

    #[test]
    fn test_double_trigger_is_single_ride() {
        let mut page = FlatViewport::new(800.0);
        let mut clock = StepClock::default();
        let (start_count, on_start) = counter();
        let backend = RecordingBackend::new();
        let mut elevator = ElevatorBuilder::new(ElevatorOptions::default())
            .on_start(on_start)
            .build(&mut page, &mut clock, FocusFlag::default(), backend);

        elevator.trigger();
        elevator.trigger();

        assert!(elevator.is_active());
        assert_eq!(start_count.get(), 1);
        assert_eq!(elevator.frame_clock().requested(), 1);
    }

    #[test]
    fn test_trigger_mid_ride_keeps_destination() {
        let mut page = FlatViewport::new(800.0);
        let mut clock = StepClock::default();
        let (mut elevator, _) = build(&mut page, &mut clock, ElevatorOptions::default());

        elevator.trigger();
        let (handle, ts) = elevator.frame_clock_mut().advance().unwrap();
        elevator.on_frame(handle, ts);
        elevator.viewport_mut().set_scroll_offset(10_000.0);
        elevator.trigger();

        assert_eq!(elevator.destination(), Some(0.0));
        assert_eq!(elevator.frame_clock().requested(), 2);
    }

    #[test]
    fn test_audio_start_and_ding() {
        let mut page = FlatViewport::new(300.0);
        let mut clock = StepClock::default();
        let (mut elevator, log) = build(&mut page, &mut clock, ElevatorOptions::default());
        log.clear();

        elevator.trigger();
        assert!(elevator.audio().is_ambient_playing());
        assert_eq!(log.played(), 1);

        run(&mut elevator);

        assert!(!elevator.audio().is_ambient_playing());
        assert_eq!(log.played(), 2);
        assert!(matches!(log.events().last(), Some(SoundEvent::Played(_))));
    }

    #[test]
    fn test_audio_disabled_never_plays() {
        let mut page = FlatViewport::new(300.0);
        let mut clock = StepClock::default();
        let (end_count, on_end) = counter();
        let backend = RecordingBackend::new();
        let log = backend.log();
        let mut elevator = ElevatorBuilder::new(ElevatorOptions::default().with_audio(false))
            .on_end(on_end)
            .build(&mut page, &mut clock, FocusFlag::default(), backend);

        elevator.trigger();
        run(&mut elevator);

        assert!(log.events().is_empty());
        assert_eq!(end_count.get(), 1);
        assert!(!elevator.is_active());
        drop(elevator);
        assert_eq!(page.scroll_offset(), 0.0);
    }

    #[test]
    fn test_focus_lost_jumps_to_destination() {
        let mut page = FlatViewport::new(5000.0);
        let mut clock = StepClock::default();
        let (end_count, on_end) = counter();
        let backend = RecordingBackend::new();
        let log = backend.log();
        let mut elevator = ElevatorBuilder::new(ElevatorOptions::default().with_padding(12.0))
            .on_end(on_end)
            .build(&mut page, &mut clock, FocusFlag::default(), backend);

        elevator.trigger();
        for _ in 0..10 {
            let (handle, ts) = elevator.frame_clock_mut().advance().unwrap();
            elevator.on_frame(handle, ts);
        }
        let pending = elevator.frame_clock().pending().unwrap();
        elevator.viewport_mut().clear_writes();

        elevator.focus_lost();

        assert!(!elevator.is_active());
        assert_eq!(end_count.get(), 0);
        assert!(!elevator.audio().is_ambient_playing());
        assert_eq!(elevator.viewport().writes(), &[12.0]);
        assert!(elevator.frame_clock().pending().is_none());
        assert_eq!(elevator.frame_clock().cancelled(), &[pending]);
        // The chime never played
        assert_eq!(log.played(), 1);
    }

    #[test]
    fn test_focus_lost_while_idle_is_noop() {
        let mut page = FlatViewport::new(250.0);
        let mut clock = StepClock::default();
        let (mut elevator, _) = build(&mut page, &mut clock, ElevatorOptions::default());

        elevator.focus_lost();

        assert!(elevator.viewport().writes().is_empty());
        assert!(elevator.frame_clock().cancelled().is_empty());
    }

    #[test]
    fn test_stale_frame_is_ignored() {
        let mut page = FlatViewport::new(250.0);
        let mut clock = StepClock::default();
        let (mut elevator, _) = build(&mut page, &mut clock, ElevatorOptions::default());

        elevator.trigger();
        let (handle, ts) = elevator.frame_clock_mut().advance().unwrap();
        elevator.on_frame(handle, ts);
        elevator.on_frame(handle, ts + 16.0);

        assert_eq!(elevator.viewport().writes().len(), 1);
        assert!(elevator.is_active());
    }

    #[test]
    fn test_drop_cancels_pending_frame() {
        let mut page = FlatViewport::new(900.0);
        let mut clock = StepClock::default();
        let mut focus = FocusFlag::default();
        {
            let mut elevator = ElevatorBuilder::new(ElevatorOptions::default()).build(
                &mut page,
                &mut clock,
                &mut focus,
                RecordingBackend::new(),
            );
            elevator.trigger();
            let (handle, ts) = elevator.frame_clock_mut().advance().unwrap();
            elevator.on_frame(handle, ts);
            assert!(elevator.focus_signal().is_subscribed());
        }

        let writes = page.writes().len();
        assert!(clock.pending().is_none());
        assert_eq!(clock.cancelled().len(), 1);
        assert!(clock.advance().is_none());
        assert_eq!(page.writes().len(), writes);
        assert!(!focus.is_subscribed());
    }

    #[test]
    fn test_drop_while_idle_cancels_nothing() {
        let mut page = FlatViewport::new(0.0);
        let mut clock = StepClock::default();
        {
            let _elevator = build(&mut page, &mut clock, ElevatorOptions::default());
        }
        assert!(clock.cancelled().is_empty());
    }

    #[test]
    fn test_rides_to_target_with_padding() {
        let mut page = page_with_sections(0.0);
        let mut clock = StepClock::default();
        let options = ElevatorOptions::default()
            .with_target("section-2")
            .with_padding(50.0);
        let (mut elevator, _) = build(&mut page, &mut clock, options);

        elevator.trigger();
        assert_eq!(elevator.destination(), Some(750.0));
        run(&mut elevator);

        assert_eq!(elevator.viewport().scroll_offset(), 750.0);
        let writes = elevator.viewport().writes();
        for pair in writes.windows(2) {
            assert!(pair[1] > pair[0]);
        }
    }

    #[test]
    fn test_missing_target_goes_to_padding() {
        let mut page = page_with_sections(400.0);
        let mut clock = StepClock::default();
        let options = ElevatorOptions::default()
            .with_target("section-99")
            .with_padding(5.0);
        let (mut elevator, _) = build(&mut page, &mut clock, options);

        elevator.trigger();
        run(&mut elevator);

        assert_eq!(elevator.viewport().scroll_offset(), 5.0);
    }

    #[test]
    fn test_explicit_duration_sets_frame_count() {
        let mut page = FlatViewport::new(100.0);
        let mut clock = StepClock::new(10.0);
        let (mut elevator, _) = build(
            &mut page,
            &mut clock,
            ElevatorOptions::default().with_duration(500.0),
        );

        elevator.trigger();
        let frames = run(&mut elevator);

        // elapsed 0, 10, ..., 500
        assert_eq!(frames, 51);
    }

    #[test]
    fn test_already_there_lands_in_one_frame() {
        let mut page = FlatViewport::new(0.0);
        let mut clock = StepClock::default();
        let (end_count, on_end) = counter();
        let mut elevator = ElevatorBuilder::new(ElevatorOptions::default())
            .on_end(on_end)
            .build(&mut page, &mut clock, FocusFlag::default(), RecordingBackend::new());

        elevator.trigger();
        let frames = run(&mut elevator);

        assert_eq!(frames, 1);
        assert_eq!(end_count.get(), 1);
        assert_eq!(elevator.viewport().writes(), &[0.0]);
    }

    #[test]
    fn test_unusable_positions_abort_without_on_end() {
        let mut page = FlatViewport::new(f64::NAN);
        let mut clock = StepClock::default();
        let (end_count, on_end) = counter();
        let mut elevator = ElevatorBuilder::new(ElevatorOptions::default())
            .on_end(on_end)
            .build(&mut page, &mut clock, FocusFlag::default(), RecordingBackend::new());

        elevator.trigger();
        run(&mut elevator);

        assert!(!elevator.is_active());
        assert_eq!(end_count.get(), 0);
        assert!(elevator.viewport().writes().is_empty());
    }

    #[test]
    fn test_arrival_leaves_no_frame_to_cancel() {
        let mut page = FlatViewport::new(400.0);
        let mut clock = StepClock::default();
        let (mut elevator, _) = build(&mut page, &mut clock, ElevatorOptions::default());

        elevator.trigger();
        let frames = run(&mut elevator);
        assert!(!elevator.is_active());
        assert!(elevator.frame_clock().pending().is_none());
        drop(elevator);

        assert_eq!(clock.requested(), frames);
        assert!(clock.cancelled().is_empty());
    }

    #[test]
    fn test_can_ride_again_after_arrival() {
        let mut page = FlatViewport::new(300.0);
        let mut clock = StepClock::default();
        let (start_count, on_start) = counter();
        let mut elevator = ElevatorBuilder::new(ElevatorOptions::default())
            .on_start(on_start)
            .build(&mut page, &mut clock, FocusFlag::default(), RecordingBackend::new());

        elevator.trigger();
        run(&mut elevator);
        elevator.viewport_mut().set_scroll_offset(600.0);
        elevator.trigger();

        assert!(elevator.is_active());
        assert_eq!(start_count.get(), 2);
    }

    #[test]
    fn test_reconfigure_mid_ride_keeps_riding() {
        let mut page = FlatViewport::new(600.0);
        let mut clock = StepClock::default();
        let (mut elevator, log) = build(&mut page, &mut clock, ElevatorOptions::default());

        elevator.trigger();
        let (handle, ts) = elevator.frame_clock_mut().advance().unwrap();
        elevator.on_frame(handle, ts);

        elevator.reconfigure(ElevatorOptions::default().with_audio(false));
        assert!(!elevator.audio().is_enabled());
        log.clear();

        run(&mut elevator);

        assert!(!elevator.is_active());
        assert_eq!(elevator.viewport().scroll_offset(), 0.0);
        assert_eq!(log.played(), 0);
    }
}
