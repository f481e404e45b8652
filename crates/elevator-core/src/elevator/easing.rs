//! Quadratic ease-in-out for the elevator ride.
//!
//! Unlike a normalized `[0, 1] -> [0, 1]` curve this works directly in
//! scroll units: it takes the elapsed time, the start offset, the total
//! change and the duration, and returns the offset for that instant.

/// Quadratic ease-in-out.
///
/// Accelerates over the first half of `duration` and decelerates
/// symmetrically over the second half.
///
/// # Arguments
/// * `elapsed` - Time since the first frame
/// * `start` - Scroll offset at the start of the ride
/// * `delta` - Total change in offset (`end - start`)
/// * `duration` - Total ride time, same unit as `elapsed`
#[inline]
pub fn ease_in_out_quad(elapsed: f64, start: f64, delta: f64, duration: f64) -> f64 {
    let t = elapsed / (duration / 2.0);
    if t < 1.0 {
        return delta / 2.0 * t * t + start;
    }
    let t = t - 1.0;
    -delta / 2.0 * (t * (t - 2.0) - 1.0) + start
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_boundaries() {
        let cases = [
            (5000.0, -5000.0, 2000.0),
            (0.0, 300.0, 450.0),
            (12.0, 7.5, 16.0),
        ];
        for (start, delta, duration) in cases {
            let first = ease_in_out_quad(0.0, start, delta, duration);
            let last = ease_in_out_quad(duration, start, delta, duration);
            assert!((first - start).abs() < EPS);
            assert!((last - (start + delta)).abs() < EPS);
        }
    }

    #[test]
    fn test_midpoint_is_half_way() {
        let v = ease_in_out_quad(1000.0, 100.0, 800.0, 2000.0);
        assert!((v - 500.0).abs() < EPS);
    }

    #[test]
    fn test_monotonic_for_positive_delta() {
        let mut prev = f64::NEG_INFINITY;
        for i in 0..=200 {
            let elapsed = i as f64 * 10.0;
            let v = ease_in_out_quad(elapsed, 0.0, 1234.0, 2000.0);
            assert!(v >= prev, "not monotonic at elapsed={}", elapsed);
            prev = v;
        }
    }

    #[test]
    fn test_symmetric_around_midpoint() {
        let (start, delta, duration) = (0.0, 1000.0, 2000.0);
        for i in 0..=10 {
            let dt = i as f64 * 100.0;
            let before = ease_in_out_quad(duration / 2.0 - dt, start, delta, duration) - start;
            let after = ease_in_out_quad(duration / 2.0 + dt, start, delta, duration) - start;
            assert!((before + after - delta).abs() < 1e-6, "asymmetric at dt={}", dt);
        }
    }

    #[test]
    fn test_quarter_point_matches_quadratic() {
        // t = 0.5 in the first half: delta/2 * 0.25
        let v = ease_in_out_quad(500.0, 0.0, 1000.0, 2000.0);
        assert!((v - 125.0).abs() < EPS);
        // Mirror point in the second half
        let v = ease_in_out_quad(1500.0, 0.0, 1000.0, 2000.0);
        assert!((v - 875.0).abs() < EPS);
    }
}
