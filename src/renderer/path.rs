//! Link path generation
//!
//! Converts links between appearances and introductions into SVG path `d`
//! attribute strings: one cubic Bézier per link, bending along the time axis.

use crate::layout::{LayoutResult, Link, Orientation, Point};

/// Default control point placement, halfway along the time axis
pub const DEFAULT_CURVATURE: f64 = 0.5;

/// A segment in a resolved path
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    /// Move to starting point
    MoveTo(Point),
    /// Cubic Bézier curve with two control points
    CubicTo {
        control1: Point,
        control2: Point,
        end: Point,
    },
}

/// A resolved path ready for SVG rendering
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPath {
    pub segments: Vec<PathSegment>,
}

impl ResolvedPath {
    /// Convert to SVG path `d` attribute string
    pub fn to_svg_d(&self) -> String {
        let mut d = String::new();
        for seg in &self.segments {
            match seg {
                PathSegment::MoveTo(p) => {
                    d.push_str(&format!("M{},{}", p.x, p.y));
                }
                PathSegment::CubicTo {
                    control1,
                    control2,
                    end,
                } => {
                    d.push_str(&format!(
                        "C{},{} {},{} {},{}",
                        control1.x, control1.y, control2.x, control2.y, end.x, end.y
                    ));
                }
            }
        }
        d
    }
}

/// Generator for link paths.
///
/// # Example
///
/// ```rust
/// use narrative_layout::layout::{Orientation, Point};
/// use narrative_layout::renderer::LinkPath;
///
/// let path = LinkPath::new(Orientation::Horizontal).path(Point::new(0.0, 0.0), Point::new(10.0, 20.0));
/// assert_eq!(path, "M0,0C5,0 5,20 10,20");
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkPath {
    orientation: Orientation,
    curvature: f64,
}

impl LinkPath {
    pub fn new(orientation: Orientation) -> Self {
        Self {
            orientation,
            curvature: DEFAULT_CURVATURE,
        }
    }

    /// Set the curvature, clamped into `[0, 1]`.
    ///
    /// 0 puts the control points on the endpoints, 1 swaps them over.
    pub fn with_curvature(mut self, curvature: f64) -> Self {
        self.curvature = if curvature.is_nan() {
            DEFAULT_CURVATURE
        } else {
            curvature.clamp(0.0, 1.0)
        };
        self
    }

    pub fn curvature(&self) -> f64 {
        self.curvature
    }

    /// Resolve the path between two absolute points
    pub fn resolve(&self, from: Point, to: Point) -> ResolvedPath {
        let c = self.curvature;
        let (control1, control2) = match self.orientation {
            Orientation::Horizontal => (
                Point::new(interpolate(from.x, to.x, c), from.y),
                Point::new(interpolate(from.x, to.x, 1.0 - c), to.y),
            ),
            Orientation::Vertical => (
                Point::new(from.x, interpolate(from.y, to.y, c)),
                Point::new(to.x, interpolate(from.y, to.y, 1.0 - c)),
            ),
        };
        ResolvedPath {
            segments: vec![
                PathSegment::MoveTo(from),
                PathSegment::CubicTo {
                    control1,
                    control2,
                    end: to,
                },
            ],
        }
    }

    /// SVG `d` string between two absolute points
    pub fn path(&self, from: Point, to: Point) -> String {
        self.resolve(from, to).to_svg_d()
    }

    /// SVG `d` string for a link of a computed layout
    pub fn link(&self, layout: &LayoutResult, link: &Link) -> String {
        self.path(
            layout.endpoint_position(link.source),
            layout.endpoint_position(link.target),
        )
    }
}

fn interpolate(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    #[test]
    fn test_horizontal_path() {
        let path = LinkPath::new(Orientation::Horizontal).path(Point::new(0.0, 0.0), Point::new(10.0, 20.0));
        assert_snapshot!(path, @"M0,0C5,0 5,20 10,20");
    }

    #[test]
    fn test_vertical_path_with_curvature() {
        let path = LinkPath::new(Orientation::Vertical)
            .with_curvature(0.25)
            .path(Point::new(0.0, 0.0), Point::new(10.0, 40.0));
        assert_snapshot!(path, @"M0,0C0,10 10,30 10,40");
    }

    #[test]
    fn test_zero_curvature_keeps_controls_on_endpoints() {
        let path = LinkPath::new(Orientation::Horizontal)
            .with_curvature(0.0)
            .path(Point::new(2.0, 4.0), Point::new(12.0, 8.0));
        assert_snapshot!(path, @"M2,4C2,4 12,8 12,8");
    }

    #[test]
    fn test_curvature_is_clamped() {
        assert_eq!(LinkPath::new(Orientation::Horizontal).with_curvature(3.0).curvature(), 1.0);
        assert_eq!(LinkPath::new(Orientation::Horizontal).with_curvature(-1.0).curvature(), 0.0);
        assert_eq!(
            LinkPath::new(Orientation::Horizontal).with_curvature(f64::NAN).curvature(),
            DEFAULT_CURVATURE
        );
    }

    #[test]
    fn test_resolved_segments() {
        let resolved = LinkPath::new(Orientation::Horizontal).resolve(Point::new(0.0, 1.0), Point::new(4.0, 3.0));
        assert_eq!(
            resolved.segments[1],
            PathSegment::CubicTo {
                control1: Point::new(2.0, 1.0),
                control2: Point::new(2.0, 3.0),
                end: Point::new(4.0, 3.0),
            }
        );
    }
}
