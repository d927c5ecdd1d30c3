//! Page geometry helpers

use serde::{Deserialize, Serialize};

/// A point in page coordinates, in the document's own units
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal translation
    pub x: f64,
    /// Vertical translation (grows downwards)
    pub y: f64,
}

impl Position {
    /// Create a position from its coordinates
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to `other`
    #[inline]
    #[must_use]
    pub fn distance_sq(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// Decode an `ItemTransform` attribute into its translation point
///
/// The attribute is a six-number affine matrix `a b c d tx ty`; only `tx`
/// and `ty` are used. Anything shorter, or any non-numeric token, decodes to
/// the origin.
#[must_use]
pub fn parse_transform(transform: &str) -> Position {
    let numbers: Option<Vec<f64>> = transform
        .split_whitespace()
        .map(|token| token.parse::<f64>().ok())
        .collect();

    match numbers {
        Some(values) if values.len() >= 6 => Position::new(values[4], values[5]),
        _ => Position::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_identity_translation() {
        let pos = parse_transform("1 0 0 1 -120.5 340");
        assert_eq!(pos, Position::new(-120.5, 340.0));
    }

    #[test]
    fn test_parse_short_transform_is_origin() {
        assert_eq!(parse_transform("1 0 0 1 12"), Position::default());
        assert_eq!(parse_transform(""), Position::default());
    }

    #[test]
    fn test_parse_garbage_is_origin() {
        assert_eq!(parse_transform("1 0 0 1 x 4"), Position::default());
    }

    #[test]
    fn test_parse_tolerates_extra_whitespace() {
        let pos = parse_transform("  1\t0 0 1\n  5e1   -2 ");
        assert_eq!(pos, Position::new(50.0, -2.0));
    }

    #[test]
    fn test_distance_sq() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(3.0, 4.0);
        assert!((a.distance_sq(&b) - 25.0).abs() < f64::EPSILON);
    }
}
