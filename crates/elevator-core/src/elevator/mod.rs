//! Elevator scrolling: an eased scroll back to the top (or to a target
//! element) with elevator music while it runs and a ding on arrival.
//!
//! # Architecture
//!
//! ## Pure helpers
//! - `easing` - Quadratic ease-in-out curve
//! - `timing` - Distance-based duration with a hard ceiling
//! - `geometry` - Target offset through the offset-parent chain
//!
//! ## Collaborators
//! - `host` - `Viewport`, `FrameClock` and `FocusSignal` traits the host implements
//! - `audio` - `AudioManager` over a pluggable `SoundBackend`
//! - `sim` - Virtual clock and flat viewport for headless runs
//!
//! ## Controller
//! - `controller` - `Elevator`, the idle/elevating state machine
//!
//! # Usage
//!
//! ```ignore
//! use elevator_core::elevator::{ElevatorBuilder, ElevatorOptions};
//!
//! let mut elevator = ElevatorBuilder::new(ElevatorOptions::default())
//!     .on_end(|| tracing::info!("arrived"))
//!     .build(viewport, clock, focus, backend);
//!
//! elevator.trigger();
//!
//! // Host loop: deliver due frames back to the controller
//! if let Some((handle, timestamp)) = due_frame {
//!     elevator.on_frame(handle, timestamp);
//! }
//! ```

pub mod audio;
pub mod controller;
pub mod easing;
pub mod geometry;
pub mod host;
pub mod options;
pub mod sim;
pub mod timing;

pub use audio::{AudioManager, BundledSound, Playable, SoundBackend, SoundSource};
pub use controller::{Elevator, ElevatorBuilder};
pub use easing::ease_in_out_quad;
pub use geometry::resolve_target_offset;
pub use host::{FocusSignal, FrameClock, FrameHandle, Viewport};
pub use options::ElevatorOptions;
pub use timing::resolve_duration;
