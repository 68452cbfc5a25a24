// src/normalize.rs
//
// Pixel value normalizer.

/// Map a raw pixel byte into [0, 1] as `v / 255`.
///
/// Zero keeps its own branch: it must stay exactly 0 even if the scaling
/// ever stops being linear.
#[inline]
pub fn normalize(value: u8) -> f32 {
    if value == 0 {
        return 0.0;
    }
    value as f32 / 255.0
}

/// Elementwise [`normalize`].
pub fn normalize_all(values: &[u8]) -> Vec<f32> {
    values.iter().copied().map(normalize).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_points() {
        assert_eq!(normalize(0), 0.0);
        assert_eq!(normalize(255), 1.0);
        assert!((normalize(128) - 0.50196).abs() < 1e-5);
    }

    #[test]
    fn stays_in_unit_interval() {
        for v in 0..=255u8 {
            let x = normalize(v);
            assert!((0.0..=1.0).contains(&x));
        }
    }

    #[test]
    fn elementwise() {
        let out = normalize_all(&[0, 255, 10, 0]);
        assert_eq!(out[0], 0.0);
        assert_eq!(out[1], 1.0);
        assert!((out[2] - 0.0392).abs() < 1e-4);
        assert_eq!(out[3], 0.0);
    }
}
