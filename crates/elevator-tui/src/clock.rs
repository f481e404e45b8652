use std::time::Instant;

use elevator_core::elevator::{FrameClock, FrameHandle};

/// Frame clock driven by the event loop.
///
/// A requested frame is due on the next loop iteration. Timestamps are
/// milliseconds since the clock was created.
#[derive(Debug)]
pub struct TickClock {
    origin: Instant,
    next_id: u64,
    pending: Option<FrameHandle>,
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TickClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            next_id: 1,
            pending: None,
        }
    }

    /// Take the pending frame, stamped with the current time
    pub fn take_due(&mut self) -> Option<(FrameHandle, f64)> {
        let handle = self.pending.take()?;
        Some((handle, self.now_ms()))
    }

    /// Whether the loop should run at animation speed
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

impl FrameClock for TickClock {
    fn request_frame(&mut self) -> FrameHandle {
        let handle = FrameHandle(self.next_id);
        self.next_id += 1;
        self.pending = Some(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
    }
}
