/// Millimetres per EasyEDA canvas unit (10 mil).
pub const MM_PER_UNIT: f64 = 0.254;

/// Round a float to N decimal places.
pub fn round_f64(v: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (v * factor).round() / factor
}

/// Convert a canvas value to millimetres.
///
/// `round_to_tenth` snaps the result to 0.1 mm. Board outlines use it so that
/// corners meeting from different shapes land on the same vertex.
pub fn to_mm(value: f64, round_to_tenth: bool) -> f64 {
    let mm = value * MM_PER_UNIT;
    if round_to_tenth {
        round_f64(mm, 1)
    } else {
        mm
    }
}

/// Shorthand for [`to_mm`] without rounding.
pub fn mm(value: f64) -> f64 {
    to_mm(value, false)
}

/// Fold an angle in degrees into (-180, 180].
pub fn normalize_angle(degrees: f64) -> f64 {
    180.0 - (180.0 - degrees).rem_euclid(360.0)
}

/// Parse an angle field and add the parent rotation.
///
/// Empty or unparseable fields yield `None`, which callers render by leaving
/// the angle out.
pub fn parse_angle(value: &str, parent: f64) -> Option<f64> {
    let angle = value.trim().parse::<f64>().ok()? + parent;
    angle.is_finite().then(|| normalize_angle(angle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_to_mm() {
        assert_abs_diff_eq!(to_mm(30.0, false), 7.62, epsilon = 1e-9);
        assert_abs_diff_eq!(to_mm(0.63, false), 0.16002, epsilon = 1e-9);
        assert_abs_diff_eq!(mm(-10.0), -2.54, epsilon = 1e-9);
    }

    #[test]
    fn test_round_to_tenth() {
        // 73 * 0.254 = 18.542
        assert_eq!(to_mm(73.0, true), 18.5);
        assert_eq!(to_mm(150.0, true), 38.1);
        assert_eq!(to_mm(29.9, true), 7.6);
    }

    #[test]
    fn test_normalize_angle() {
        assert_eq!(normalize_angle(0.0), 0.0);
        assert_eq!(normalize_angle(180.0), 180.0);
        assert_eq!(normalize_angle(-180.0), 180.0);
        assert_eq!(normalize_angle(270.0), -90.0);
        assert_eq!(normalize_angle(-90.0), -90.0);
        assert_eq!(normalize_angle(540.0), 180.0);
        assert_eq!(normalize_angle(-450.0), -90.0);
        assert_eq!(normalize_angle(181.0), -179.0);
    }

    #[test]
    fn test_parse_angle() {
        assert_eq!(parse_angle("", 0.0), None);
        assert_eq!(parse_angle("abc", 0.0), None);
        assert_eq!(parse_angle("270", 0.0), Some(-90.0));
        assert_eq!(parse_angle("90", 0.0), Some(90.0));
        assert_eq!(parse_angle("90", 135.0), Some(-135.0));
        assert_eq!(parse_angle("0", 0.0), Some(0.0));
    }
}
