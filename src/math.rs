//! Math types for AudioNest

pub use glam::Vec3;

/// Maps `value` linearly from the interval `(in_start, in_stop)` to `(out_start, out_stop)`.
///
/// No clamping is applied, so values outside the input interval extrapolate.
pub fn map_range(value: f32, in_start: f32, in_stop: f32, out_start: f32, out_stop: f32) -> f32 {
    out_start + (out_stop - out_start) * ((value - in_start) / (in_stop - in_start))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_range() {
        assert_eq!(map_range(5.0, 0.0, 10.0, 0.0, 1.0), 0.5);
        assert_eq!(map_range(2.0, 2.0, 4.0, 10.0, 20.0), 10.0);
        assert_eq!(map_range(4.0, 2.0, 4.0, 10.0, 20.0), 20.0);
    }

    #[test]
    fn test_map_range_extrapolates() {
        assert_eq!(map_range(15.0, 0.0, 10.0, 0.0, 1.0), 1.5);
        assert_eq!(map_range(-5.0, 0.0, 10.0, 0.0, 1.0), -0.5);
    }
}
