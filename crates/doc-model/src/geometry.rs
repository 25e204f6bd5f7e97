//! Page-fraction geometry
//!
//! All persisted overlay geometry is stored relative to the page: `0.0` is the
//! left/top edge and `1.0` the right/bottom edge, independent of zoom.

use serde::{Deserialize, Serialize};

/// Side length of the square space drawing paths are encoded in.
pub const PATH_SPACE: f64 = 1000.0;

/// Rectangle in page-fraction units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl NormalizedRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// True when both sides are strictly positive and every field is finite.
    pub fn has_area(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }

    /// Intersect with the unit page square.
    ///
    /// Returns `None` when nothing with positive area is left.
    pub fn clipped_to_page(&self) -> Option<Self> {
        if !self.has_area() {
            return None;
        }

        let left = self.x.clamp(0.0, 1.0);
        let top = self.y.clamp(0.0, 1.0);
        let right = (self.x + self.width).clamp(0.0, 1.0);
        let bottom = (self.y + self.height).clamp(0.0, 1.0);

        let clipped = Self::new(left, top, right - left, bottom - top);
        clipped.has_area().then_some(clipped)
    }

    /// True when the rect lies entirely inside the unit page square.
    pub fn is_within_page(&self) -> bool {
        self.x >= 0.0 && self.y >= 0.0 && self.x + self.width <= 1.0 && self.y + self.height <= 1.0
    }
}

/// Point in page-fraction units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPoint {
    pub x: f64,
    pub y: f64,
}

impl NormalizedPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Encode a stroke as an SVG-style path in a `PATH_SPACE` square.
///
/// The first point is a move (`M`), every following point a line (`L`).
pub fn points_to_path(points: &[NormalizedPoint]) -> String {
    points
        .iter()
        .enumerate()
        .map(|(index, point)| {
            let command = if index == 0 { 'M' } else { 'L' };
            format!("{command} {:.2} {:.2}", point.x * PATH_SPACE, point.y * PATH_SPACE)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Decode a path produced by [`points_to_path`] back into page fractions.
///
/// Returns `None` on any token that is not part of the `M`/`L` grammar.
pub fn path_to_points(path: &str) -> Option<Vec<NormalizedPoint>> {
    let mut tokens = path.split_whitespace();
    let mut points = Vec::new();

    while let Some(command) = tokens.next() {
        if command != "M" && command != "L" {
            return None;
        }
        if (command == "M") != points.is_empty() {
            return None;
        }

        let x: f64 = tokens.next()?.parse().ok()?;
        let y: f64 = tokens.next()?.parse().ok()?;
        points.push(NormalizedPoint::new(x / PATH_SPACE, y / PATH_SPACE));
    }

    Some(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_and_negative_sizes_have_no_area() {
        assert!(!NormalizedRect::new(0.1, 0.1, 0.0, 0.2).has_area());
        assert!(!NormalizedRect::new(0.1, 0.1, 0.2, -0.1).has_area());
        assert!(!NormalizedRect::new(f64::NAN, 0.1, 0.2, 0.1).has_area());
        assert!(NormalizedRect::new(0.1, 0.1, 0.2, 0.1).has_area());
    }

    #[test]
    fn clipping_keeps_inner_rect_unchanged() {
        let rect = NormalizedRect::new(0.2, 0.3, 0.4, 0.1);
        assert_eq!(rect.clipped_to_page(), Some(rect));
    }

    #[test]
    fn clipping_trims_overhang() {
        let rect = NormalizedRect::new(0.9, -0.1, 0.3, 0.2).clipped_to_page().unwrap();
        assert!((rect.x - 0.9).abs() < 1e-9);
        assert_eq!(rect.y, 0.0);
        assert!((rect.width - 0.1).abs() < 1e-9);
        assert!((rect.height - 0.1).abs() < 1e-9);
        assert!(rect.is_within_page());
    }

    #[test]
    fn clipping_drops_rect_outside_page() {
        assert_eq!(NormalizedRect::new(1.2, 0.1, 0.3, 0.2).clipped_to_page(), None);
    }

    #[test]
    fn path_uses_move_then_lines() {
        let path = points_to_path(&[
            NormalizedPoint::new(0.1, 0.2),
            NormalizedPoint::new(0.15, 0.25),
            NormalizedPoint::new(0.5, 0.5),
        ]);
        assert_eq!(path, "M 100.00 200.00 L 150.00 250.00 L 500.00 500.00");
    }

    #[test]
    fn path_decodes_to_fractions() {
        let points = path_to_points("M 100.00 200.00 L 500.00 750.00").unwrap();
        assert_eq!(points.len(), 2);
        assert!((points[1].x - 0.5).abs() < 1e-9);
        assert!((points[1].y - 0.75).abs() < 1e-9);
    }

    #[test]
    fn malformed_path_is_rejected() {
        assert_eq!(path_to_points("L 1 2"), None);
        assert_eq!(path_to_points("M 1"), None);
        assert_eq!(path_to_points("M 1 2 M 3 4"), None);
        assert_eq!(path_to_points("Q 1 2"), None);
    }
}
