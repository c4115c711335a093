//! Path output for layout results
//!
//! The layout itself is plain geometry. This module turns links into SVG path
//! strings for whatever surface draws the chart.

pub mod path;

pub use path::{LinkPath, PathSegment, ResolvedPath, DEFAULT_CURVATURE};
