//! Distance-based detection loudness.
//!
//! Audibility is the gameplay-facing loudness of a playing sound as heard by a listener, used
//! by detection logic rather than by the mixer. Aggregation across entries and containers
//! always takes the loudest value; simultaneous sounds never stack.

use crate::config::DetectionSettings;
use crate::math::{Vec3, map_range};

/// Detection loudness of a playing sound at `distance` from the listener.
///
/// The normalization range is `[min(inner, distance), max(outer, distance)]`, so without a
/// cutoff a listener inside the inner radius lands at 0 and one beyond the outer radius
/// lands at 1 of a range stretched to include it.
pub fn loudness_at_distance(settings: &DetectionSettings, distance: f32) -> f32 {
    if (settings.cut_on_min && distance < settings.inner_radius)
        || (settings.cut_on_max && distance > settings.outer_radius)
    {
        return 0.0;
    }

    let low = if settings.inner_radius < distance {
        settings.inner_radius
    } else {
        distance
    };
    let high = if settings.outer_radius > distance {
        settings.outer_radius
    } else {
        distance
    };

    // degenerate range, e.g. inner == outer == distance
    let relative = if high <= low {
        0.0
    } else {
        map_range(distance, low, high, 0.0, 1.0)
    };

    settings.loudness * settings.response.evaluate(relative)
}

/// Detection loudness of a playing sound at `source` heard from `listener`.
pub fn loudness_between(settings: &DetectionSettings, source: Vec3, listener: Vec3) -> f32 {
    loudness_at_distance(settings, source.distance(listener))
}

/// Loudest of `values`, floored at 0. NaN values are ignored.
pub fn loudest(values: impl IntoIterator<Item = f32>) -> f32 {
    values.into_iter().fold(0.0, f32::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::ResponseCurve;

    fn settings(inner: f32, outer: f32, cut_on_min: bool, cut_on_max: bool) -> DetectionSettings {
        DetectionSettings {
            loudness: 100.0,
            inner_radius: inner,
            outer_radius: outer,
            cut_on_min,
            cut_on_max,
            response: ResponseCurve::falloff(),
        }
    }

    #[test]
    fn test_cut_on_max() {
        let s = settings(0.0, 10.0, false, true);
        assert_eq!(loudness_at_distance(&s, 15.0), 0.0);
        assert!((loudness_at_distance(&s, 5.0) - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_cut_on_min() {
        let s = settings(2.0, 10.0, true, true);
        assert_eq!(loudness_at_distance(&s, 1.0), 0.0);
        assert!(loudness_at_distance(&s, 2.0) > 0.0);
    }

    #[test]
    fn test_inside_inner_radius_without_cutoff_widens_range() {
        let s = settings(2.0, 10.0, false, true);
        // low = distance = 1, high = 10 -> relative 0 -> full response
        let inside = loudness_at_distance(&s, 1.0);
        assert!(inside > 0.0);
        assert!((inside - 100.0).abs() < 1e-4);

        // just past the inner radius the fixed range applies
        let past = loudness_at_distance(&s, 6.0);
        assert!((past - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_beyond_outer_radius_without_cutoff() {
        let s = settings(0.0, 10.0, false, false);
        // high = distance -> relative 1 -> tail of the curve
        assert_eq!(loudness_at_distance(&s, 40.0), 0.0);

        let mut flat_tail = s.clone();
        flat_tail.response = ResponseCurve::linear(0.0, 1.0, 1.0, 0.2);
        assert!((loudness_at_distance(&flat_tail, 40.0) - 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_degenerate_range_is_finite() {
        let s = settings(5.0, 5.0, false, false);
        let value = loudness_at_distance(&s, 5.0);
        assert!(value.is_finite());
        assert_eq!(value, 100.0);
    }

    #[test]
    fn test_tiny_range_still_normalizes() {
        let s = settings(0.0, 1e-8, false, false);
        assert_eq!(loudness_at_distance(&s, 1e-8), 0.0);
        assert!((loudness_at_distance(&s, 5e-9) - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_loudness_between_positions() {
        let s = settings(0.0, 10.0, false, true);
        let source = Vec3::new(3.0, 0.0, 0.0);
        let listener = Vec3::new(3.0, 4.0, 3.0);
        assert!((loudness_between(&s, source, listener) - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_loudest_is_max_not_sum() {
        assert_eq!(loudest([10.0, 30.0, 20.0]), 30.0);
        assert_eq!(loudest([f32::NAN, 5.0]), 5.0);
        assert_eq!(loudest(Vec::<f32>::new()), 0.0);
    }
}
