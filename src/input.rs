//! Narrative input: characters, scenes and layout options
//!
//! A narrative can be built in code or loaded from a TOML document:
//!
//! ```toml
//! [layout]
//! size = [800, 400]
//! path_space = 12
//!
//! [[characters]]
//! name = "Luke"
//!
//! [[characters]]
//! name = "Leia"
//! initial_group = 0
//!
//! [[scenes]]
//! characters = ["Luke", "Leia"]
//!
//! [[scenes]]
//! characters = [0, 1]
//! start = 4
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::layout::{self, LabelPosition, LayoutConfig, LayoutError, LayoutResult};

/// Errors that can occur when loading or parsing a narrative document
#[derive(Error, Debug)]
pub enum InputError {
    #[error("Failed to read narrative file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse narrative TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// A character as supplied by the caller
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterDef {
    pub name: String,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    /// Community hint used to seed clustering
    #[serde(alias = "initialgroup")]
    pub initial_group: Option<usize>,
    #[serde(alias = "labelPosition")]
    pub label_position: Option<LabelPosition>,
}

impl CharacterDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Force the introduction label position
    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    /// Force the introduction label size
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_initial_group(mut self, group: usize) -> Self {
        self.initial_group = Some(group);
        self
    }

    pub fn with_label_position(mut self, position: LabelPosition) -> Self {
        self.label_position = Some(position);
        self
    }
}

/// Reference from a scene to a character: list index or name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CharacterRef {
    Index(usize),
    Name(String),
}

impl From<usize> for CharacterRef {
    fn from(index: usize) -> Self {
        CharacterRef::Index(index)
    }
}

impl From<&str> for CharacterRef {
    fn from(name: &str) -> Self {
        CharacterRef::Name(name.to_string())
    }
}

impl From<String> for CharacterRef {
    fn from(name: String) -> Self {
        CharacterRef::Name(name)
    }
}

/// A scene as supplied by the caller
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneDef {
    pub name: Option<String>,
    pub characters: Vec<CharacterRef>,
    pub start: Option<f64>,
    pub duration: Option<f64>,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

impl SceneDef {
    pub fn new<I, R>(characters: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<CharacterRef>,
    {
        Self {
            characters: characters.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_start(mut self, start: f64) -> Self {
        self.start = Some(start);
        self
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Force the scene node position
    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    /// Label used in error messages
    pub(crate) fn label(&self, index: usize) -> String {
        match &self.name {
            Some(name) => format!("'{}'", name),
            None => format!("#{}", index),
        }
    }
}

/// A complete narrative: layout options plus characters and scenes
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Narrative {
    pub layout: LayoutConfig,
    pub characters: Vec<CharacterDef>,
    pub scenes: Vec<SceneDef>,
}

impl Narrative {
    /// Load a narrative from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, InputError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load a narrative from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, InputError> {
        Ok(toml::from_str(content)?)
    }

    /// Compute the layout for this narrative
    pub fn compute(&self) -> Result<LayoutResult, LayoutError> {
        layout::compute(&self.characters, &self.scenes, &self.layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Orientation;

    #[test]
    fn test_parse_full_document() {
        let narrative = Narrative::from_str(
            r#"
[layout]
size = [800, 400]
orientation = "vertical"

[[characters]]
name = "Luke"
labelPosition = "left"

[[characters]]
name = "Leia"
initialgroup = 2

[[scenes]]
name = "Hoth"
characters = ["Luke", 1]
start = 3
"#,
        )
        .expect("Should parse");

        assert_eq!(narrative.layout.size, (800.0, 400.0));
        assert_eq!(narrative.layout.orientation, Orientation::Vertical);
        assert_eq!(narrative.characters.len(), 2);
        assert_eq!(
            narrative.characters[0].label_position,
            Some(LabelPosition::Left)
        );
        assert_eq!(narrative.characters[1].initial_group, Some(2));
        assert_eq!(
            narrative.scenes[0].characters,
            vec![CharacterRef::from("Luke"), CharacterRef::from(1)]
        );
        assert_eq!(narrative.scenes[0].start, Some(3.0));
        assert_eq!(narrative.scenes[0].duration, None);
    }

    #[test]
    fn test_parse_without_layout_uses_defaults() {
        let narrative = Narrative::from_str(
            r#"
[[characters]]
name = "Solo"
"#,
        )
        .expect("Should parse");
        assert_eq!(narrative.layout, LayoutConfig::default());
        assert!(narrative.scenes.is_empty());
    }

    #[test]
    fn test_invalid_toml_error() {
        let result = Narrative::from_str("this is not valid toml {{{{");
        assert!(matches!(result, Err(InputError::ParseError(_))));
    }

    #[test]
    fn test_scene_builder() {
        let scene = SceneDef::new(["a", "b"]).with_start(2.0).with_duration(3.0);
        assert_eq!(scene.characters.len(), 2);
        assert_eq!(scene.start, Some(2.0));
        assert_eq!(scene.duration, Some(3.0));
        assert_eq!(scene.label(4), "#4");
        assert_eq!(scene.with_name("Cantina").label(4), "'Cantina'");
    }
}
