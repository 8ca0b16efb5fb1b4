//! Keyframed response curves.
//!
//! A [`ResponseCurve`] shapes a normalized input in `[0, 1]` into a scalar. It is used for
//! both the detection loudness falloff and the 3D volume rolloff of a sound entry.

/// Interpolation used between a key and the key that follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyShape {
    /// Straight line to the next key
    #[default]
    Linear,
    /// Smoothstep ease-in/ease-out to the next key
    Smooth,
    /// Hold this key's value until the next key
    Constant,
}

/// A single curve key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveKey {
    pub time: f32,
    pub value: f32,
    pub shape: KeyShape,
}

impl CurveKey {
    pub fn new(time: f32, value: f32) -> Self {
        Self {
            time,
            value,
            shape: KeyShape::Linear,
        }
    }

    pub fn with_shape(mut self, shape: KeyShape) -> Self {
        self.shape = shape;
        self
    }
}

/// Piecewise curve over sorted keys.
///
/// Inputs before the first key or after the last key evaluate to the boundary value.
/// An empty curve evaluates to `0.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseCurve {
    keys: Vec<CurveKey>,
}

impl ResponseCurve {
    /// Creates a curve from keys in any order.
    pub fn new(mut keys: Vec<CurveKey>) -> Self {
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { keys }
    }

    /// Straight line from `(time_start, value_start)` to `(time_end, value_end)`.
    pub fn linear(time_start: f32, value_start: f32, time_end: f32, value_end: f32) -> Self {
        Self::new(vec![
            CurveKey::new(time_start, value_start),
            CurveKey::new(time_end, value_end),
        ])
    }

    /// Flat curve returning `value` everywhere.
    pub fn constant(value: f32) -> Self {
        Self::new(vec![CurveKey::new(0.0, value)])
    }

    /// Linear falloff from 1 at the inner edge to 0 at the outer edge.
    pub fn falloff() -> Self {
        Self::linear(0.0, 1.0, 1.0, 0.0)
    }

    /// Adds a key, keeping keys sorted by time.
    pub fn add_key(&mut self, key: CurveKey) {
        let index = self.keys.partition_point(|k| k.time <= key.time);
        self.keys.insert(index, key);
    }

    pub fn keys(&self) -> &[CurveKey] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Evaluates the curve at `t`.
    pub fn evaluate(&self, t: f32) -> f32 {
        let (first, last) = match (self.keys.first(), self.keys.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return 0.0,
        };

        if t.is_nan() || t <= first.time {
            return first.value;
        }
        if t >= last.time {
            return last.value;
        }

        let next = self.keys.partition_point(|k| k.time <= t);
        let k0 = &self.keys[next - 1];
        let k1 = &self.keys[next];

        let span = k1.time - k0.time;
        if span <= f32::EPSILON {
            return k1.value;
        }

        let local = (t - k0.time) / span;
        let shaped = match k0.shape {
            KeyShape::Linear => local,
            KeyShape::Smooth => local * local * (3.0 - 2.0 * local),
            KeyShape::Constant => 0.0,
        };

        k0.value + shaped * (k1.value - k0.value)
    }
}

impl Default for ResponseCurve {
    fn default() -> Self {
        Self::falloff()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_falloff() {
        let curve = ResponseCurve::default();
        assert_eq!(curve.evaluate(0.0), 1.0);
        assert_eq!(curve.evaluate(1.0), 0.0);
        assert!((curve.evaluate(0.25) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_clamps_outside_keys() {
        let curve = ResponseCurve::linear(0.2, 0.5, 0.8, 1.0);
        assert_eq!(curve.evaluate(-3.0), 0.5);
        assert_eq!(curve.evaluate(0.0), 0.5);
        assert_eq!(curve.evaluate(5.0), 1.0);
    }

    #[test]
    fn test_empty_and_single_key() {
        let empty = ResponseCurve::new(Vec::new());
        assert!(empty.is_empty());
        assert_eq!(empty.evaluate(0.5), 0.0);

        let flat = ResponseCurve::constant(0.3);
        assert_eq!(flat.evaluate(0.0), 0.3);
        assert_eq!(flat.evaluate(0.9), 0.3);
    }

    #[test]
    fn test_shapes() {
        let held = ResponseCurve::new(vec![
            CurveKey::new(0.0, 1.0).with_shape(KeyShape::Constant),
            CurveKey::new(1.0, 0.0),
        ]);
        assert_eq!(held.evaluate(0.99), 1.0);

        let smooth = ResponseCurve::new(vec![
            CurveKey::new(0.0, 0.0).with_shape(KeyShape::Smooth),
            CurveKey::new(1.0, 1.0),
        ]);
        assert!((smooth.evaluate(0.5) - 0.5).abs() < 1e-6);
        assert!(smooth.evaluate(0.1) < 0.1);
    }

    #[test]
    fn test_add_key_keeps_order() {
        let mut curve = ResponseCurve::falloff();
        curve.add_key(CurveKey::new(0.5, 1.0));
        let times: Vec<f32> = curve.keys().iter().map(|k| k.time).collect();
        assert_eq!(times, vec![0.0, 0.5, 1.0]);
        assert_eq!(curve.evaluate(0.25), 1.0);
        assert!((curve.evaluate(0.75) - 0.5).abs() < 1e-6);
    }
}
