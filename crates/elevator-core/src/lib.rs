pub mod config;
pub mod elevator;
pub mod error;

pub use config::AppConfig;
pub use elevator::{
    ease_in_out_quad, resolve_duration, resolve_target_offset, AudioManager, Elevator,
    ElevatorBuilder, ElevatorOptions,
};
pub use error::{Error, Result};
