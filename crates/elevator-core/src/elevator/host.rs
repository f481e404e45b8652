//! Host collaborators.
//!
//! The controller never touches a real display. Whatever draws the page
//! implements these three traits and hands them to [`Elevator`].
//!
//! [`Elevator`]: super::Elevator

use std::fmt;

/// A scrollable surface with addressable elements.
pub trait Viewport {
    /// Opaque element reference returned by [`Viewport::element_by_id`]
    type Element: Copy;

    /// Current vertical scroll offset
    fn scroll_offset(&self) -> f64;

    /// Scroll to `offset`
    fn set_scroll_offset(&mut self, offset: f64);

    /// Look up an element by its id
    fn element_by_id(&self, id: &str) -> Option<Self::Element>;

    /// Offset of `element` from the top of its offset parent
    fn offset_top(&self, element: Self::Element) -> f64;

    /// The element's offset parent, `None` at the document root
    fn offset_parent(&self, element: Self::Element) -> Option<Self::Element>;
}

/// Identifies one pending frame request. Also the cancellation token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

impl fmt::Display for FrameHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame#{}", self.0)
    }
}

/// "Call me before the next repaint."
///
/// The clock only records requests. When a frame comes due the host calls
/// [`Elevator::on_frame`] with the handle and a millisecond timestamp.
///
/// [`Elevator::on_frame`]: super::Elevator::on_frame
pub trait FrameClock {
    fn request_frame(&mut self) -> FrameHandle;

    /// Cancel a pending request. Unknown or already-fired handles are ignored.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Subscription to the host's "lost focus" notification.
///
/// While subscribed the host forwards focus loss to
/// [`Elevator::focus_lost`](super::Elevator::focus_lost).
pub trait FocusSignal {
    fn subscribe(&mut self);

    fn unsubscribe(&mut self);
}

impl<T: Viewport + ?Sized> Viewport for &mut T {
    type Element = T::Element;

    fn scroll_offset(&self) -> f64 {
        (**self).scroll_offset()
    }

    fn set_scroll_offset(&mut self, offset: f64) {
        (**self).set_scroll_offset(offset)
    }

    fn element_by_id(&self, id: &str) -> Option<Self::Element> {
        (**self).element_by_id(id)
    }

    fn offset_top(&self, element: Self::Element) -> f64 {
        (**self).offset_top(element)
    }

    fn offset_parent(&self, element: Self::Element) -> Option<Self::Element> {
        (**self).offset_parent(element)
    }
}

impl<T: FrameClock + ?Sized> FrameClock for &mut T {
    fn request_frame(&mut self) -> FrameHandle {
        (**self).request_frame()
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        (**self).cancel_frame(handle)
    }
}

impl<T: FocusSignal + ?Sized> FocusSignal for &mut T {
    fn subscribe(&mut self) {
        (**self).subscribe()
    }

    fn unsubscribe(&mut self) {
        (**self).unsubscribe()
    }
}
