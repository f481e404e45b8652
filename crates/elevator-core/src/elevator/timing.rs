//! Ride duration.

/// Milliseconds of ride per unit of scroll distance
const MS_PER_UNIT: f64 = 1.5;

/// Longest automatic ride, however tall the page
pub const MAX_AUTO_DURATION_MS: f64 = 2000.0;

/// Duration of a ride over `distance`.
///
/// An explicit non-zero duration always wins. Otherwise the ride takes
/// 1.5 ms per unit of distance, capped at [`MAX_AUTO_DURATION_MS`].
#[inline]
pub fn resolve_duration(distance: f64, explicit: Option<f64>) -> f64 {
    match explicit {
        Some(duration) if duration != 0.0 => duration,
        _ => (distance.abs() * MS_PER_UNIT).min(MAX_AUTO_DURATION_MS),
    }
}
