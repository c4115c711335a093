//! Configuration for the layout engine

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::error::LayoutError;

/// Direction in which time runs across the chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Time runs left to right, lanes stack top to bottom
    #[default]
    Horizontal,
    /// Time runs top to bottom, lanes stack left to right
    Vertical,
}

impl Orientation {
    /// Component of a `(width, height)` pair along the time axis
    pub fn along_time(self, pair: (f64, f64)) -> f64 {
        match self {
            Orientation::Horizontal => pair.0,
            Orientation::Vertical => pair.1,
        }
    }

    /// Component of a `(width, height)` pair along the lane axis
    pub fn along_lanes(self, pair: (f64, f64)) -> f64 {
        match self {
            Orientation::Horizontal => pair.1,
            Orientation::Vertical => pair.0,
        }
    }

    /// Build an `(x, y)` pair from time-axis and lane-axis components
    pub fn compose(self, time: f64, lanes: f64) -> (f64, f64) {
        match self {
            Orientation::Horizontal => (time, lanes),
            Orientation::Vertical => (lanes, time),
        }
    }
}

/// Where a character's introduction label sits relative to its anchor point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelPosition {
    Left,
    #[default]
    Right,
    Above,
    Below,
}

/// Error for unrecognised option keywords
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct ParseOptionError {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

impl FromStr for Orientation {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "horizontal" => Ok(Orientation::Horizontal),
            "vertical" => Ok(Orientation::Vertical),
            _ => Err(ParseOptionError {
                kind: "orientation",
                value: s.to_string(),
                expected: "horizontal, vertical",
            }),
        }
    }
}

impl FromStr for LabelPosition {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(LabelPosition::Left),
            "right" => Ok(LabelPosition::Right),
            "above" => Ok(LabelPosition::Above),
            "below" => Ok(LabelPosition::Below),
            _ => Err(ParseOptionError {
                kind: "label position",
                value: s.to_string(),
                expected: "left, right, above, below",
            }),
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Horizontal => write!(f, "horizontal"),
            Orientation::Vertical => write!(f, "vertical"),
        }
    }
}

/// Padding around scene nodes, in CSS order
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Padding {
    pub fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }
}

impl From<[f64; 4]> for Padding {
    fn from([top, right, bottom, left]: [f64; 4]) -> Self {
        Self::new(top, right, bottom, left)
    }
}

impl From<Padding> for [f64; 4] {
    fn from(p: Padding) -> Self {
        [p.top, p.right, p.bottom, p.left]
    }
}

/// Configuration options for layout computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Chart size (width, height)
    pub size: (f64, f64),

    /// Direction of the time axis
    pub orientation: Orientation,

    /// Space allotted to each character's lane
    #[serde(alias = "pathSpace")]
    pub path_space: f64,

    /// Gap between consecutive groups along the lane axis
    #[serde(alias = "groupMargin")]
    pub group_margin: f64,

    /// Extra space around each scene node
    #[serde(alias = "scenePadding")]
    pub scene_padding: Padding,

    /// Default size for introduction labels (width, height)
    #[serde(alias = "labelSize")]
    pub label_size: (f64, f64),

    /// Default label position, overridable per character
    #[serde(alias = "labelPosition")]
    pub label_position: LabelPosition,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            size: (1.0, 1.0),
            orientation: Orientation::Horizontal,
            path_space: 10.0,
            group_margin: 0.0,
            scene_padding: Padding::default(),
            label_size: (100.0, 15.0),
            label_position: LabelPosition::Right,
        }
    }
}

impl LayoutConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the chart size
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.size = (width, height);
        self
    }

    /// Set the orientation
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Set the lane spacing
    pub fn with_path_space(mut self, space: f64) -> Self {
        self.path_space = space;
        self
    }

    /// Set the margin between groups
    pub fn with_group_margin(mut self, margin: f64) -> Self {
        self.group_margin = margin;
        self
    }

    /// Set the scene padding
    pub fn with_scene_padding(mut self, padding: Padding) -> Self {
        self.scene_padding = padding;
        self
    }

    /// Set the default label size
    pub fn with_label_size(mut self, width: f64, height: f64) -> Self {
        self.label_size = (width, height);
        self
    }

    /// Set the default label position
    pub fn with_label_position(mut self, position: LabelPosition) -> Self {
        self.label_position = position;
        self
    }

    /// Reject values the solver cannot work with
    pub fn validate(&self) -> Result<(), LayoutError> {
        if !(self.path_space.is_finite() && self.path_space > 0.0) {
            return Err(LayoutError::invalid_config(format!(
                "path space must be positive, got {}",
                self.path_space
            )));
        }
        let lengths = [
            ("width", self.size.0),
            ("height", self.size.1),
            ("label width", self.label_size.0),
            ("label height", self.label_size.1),
            ("group margin", self.group_margin),
        ];
        for (name, value) in lengths {
            if !(value.is_finite() && value >= 0.0) {
                return Err(LayoutError::invalid_config(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        let padding: [f64; 4] = self.scene_padding.into();
        if padding.iter().any(|p| !p.is_finite()) {
            return Err(LayoutError::invalid_config("scene padding must be finite"));
        }
        Ok(())
    }
}
