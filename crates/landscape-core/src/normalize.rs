//! Rescaling into the unit square

/// Relative spread below which an axis counts as constant.
const CONSTANT_AXIS_TOLERANCE: f64 = 1e-12;

/// Midpoint assigned to every point on a constant axis.
pub const MIDPOINT: f64 = 0.5;

/// Rescale x and y independently to `(t - min) / (max - min)`.
///
/// An axis with no spread maps every point to [`MIDPOINT`].
pub fn normalize_unit_square(points: &mut [[f64; 2]]) {
    for axis in 0..2 {
        let (min, max) = points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p[axis]), hi.max(p[axis]))
        });
        let spread = max - min;
        let magnitude = min.abs().max(max.abs()).max(1.0);

        if !spread.is_finite() || spread <= CONSTANT_AXIS_TOLERANCE * magnitude {
            points.iter_mut().for_each(|p| p[axis] = MIDPOINT);
        } else {
            for p in points.iter_mut() {
                p[axis] = ((p[axis] - min) / spread).clamp(0.0, 1.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn axes_span_zero_to_one() {
        let mut points = vec![[-2.0, 10.0], [0.0, 30.0], [2.0, 20.0]];
        normalize_unit_square(&mut points);
        assert_eq!(points, vec![[0.0, 0.0], [0.5, 1.0], [1.0, 0.5]]);
    }

    #[test]
    fn constant_axis_maps_to_midpoint() {
        let mut points = vec![[1.0, 7.0], [3.0, 7.0]];
        normalize_unit_square(&mut points);
        assert_eq!(points, vec![[0.0, 0.5], [1.0, 0.5]]);
    }

    #[test]
    fn rounding_noise_is_constant() {
        let mut points = vec![[0.1 + 0.2, 4.0], [0.3, 4.0]];
        normalize_unit_square(&mut points);
        assert_eq!(points, vec![[0.5, 0.5], [0.5, 0.5]]);
    }

    #[test]
    fn empty_input_is_untouched() {
        let mut points: Vec<[f64; 2]> = Vec::new();
        normalize_unit_square(&mut points);
        assert!(points.is_empty());
    }
}
