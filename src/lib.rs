//! Narrative Layout - computes XKCD-style narrative charts
//!
//! Characters that share scenes are clustered into communities, communities
//! become bands of lanes, and scenes are laid out along a time axis with each
//! character's line running through the scenes it appears in.
//!
//! # Example
//!
//! ```rust
//! use narrative_layout::{layout, CharacterDef, LayoutConfig, SceneDef};
//!
//! let characters = vec![CharacterDef::new("Luke"), CharacterDef::new("Leia")];
//! let scenes = vec![
//!     SceneDef::new(["Luke", "Leia"]),
//!     SceneDef::new(["Leia", "Luke"]),
//! ];
//! let config = LayoutConfig::new().with_size(600.0, 200.0);
//!
//! let result = layout(&characters, &scenes, &config).unwrap();
//! assert_eq!(result.characters.len(), 2);
//! assert_eq!(result.links.len(), 4);
//! ```

pub mod cluster;
pub mod input;
pub mod layout;
pub mod renderer;

pub use cluster::{ClusterError, Louvain};
pub use input::{CharacterDef, CharacterRef, InputError, Narrative, SceneDef};
pub use layout::{LabelPosition, LayoutConfig, LayoutError, LayoutResult, Orientation};
pub use renderer::LinkPath;

use std::fmt;

use thiserror::Error;

use crate::layout::Bounded;

/// Errors that can occur between reading a narrative and laying it out
#[derive(Debug, Error)]
pub enum NarrativeError {
    /// Error reading or parsing the narrative document
    #[error("input error: {0}")]
    Input(#[from] InputError),

    /// Error during layout
    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),
}

/// Compute the layout for characters and scenes
pub fn layout(
    characters: &[CharacterDef],
    scenes: &[SceneDef],
    config: &LayoutConfig,
) -> Result<LayoutResult, LayoutError> {
    layout::compute(characters, scenes, config)
}

/// Parse a TOML narrative and compute its layout
///
/// # Example
///
/// ```rust
/// use narrative_layout::layout_str;
///
/// let result = layout_str(r#"
///     [[characters]]
///     name = "a"
///     [[characters]]
///     name = "b"
///     [[scenes]]
///     characters = ["a", "b"]
///     [[scenes]]
///     characters = ["a", "b"]
/// "#).unwrap();
///
/// assert_eq!(result.scenes.len(), 2);
/// ```
pub fn layout_str(source: &str) -> Result<LayoutResult, NarrativeError> {
    let narrative = Narrative::from_str(source)?;
    Ok(narrative.compute()?)
}

/// Indented dump of groups, scenes and introductions for debugging
pub fn format_tree(result: &LayoutResult) -> String {
    LayoutTree(result).to_string()
}

/// Display adapter behind [`format_tree`]
pub struct LayoutTree<'a>(pub &'a LayoutResult);

impl fmt::Display for LayoutTree<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.0;
        for (id, group) in result.groups_in_order() {
            writeln!(
                f,
                "group {} (order {}, scenes {}) lanes {:.1}..{:.1}",
                id.index(),
                group.order,
                group.median_count,
                group.min,
                group.max
            )?;
            for character in &group.characters {
                writeln!(f, "  {}", result.character(*character).name)?;
            }
        }
        for (index, scene) in result.scenes.iter().enumerate() {
            let name = scene.name.as_deref().unwrap_or("<anon>");
            writeln!(
                f,
                "scene {} [{}] t={} x={:.1} y={:.1} w={:.1} h={:.1}",
                index, name, scene.start, scene.x, scene.y, scene.width, scene.height
            )?;
            for appearance in &scene.appearances {
                let a = result.appearance(*appearance);
                writeln!(
                    f,
                    "  {} +{:.1},{:.1}",
                    result.character(a.character).name,
                    a.x,
                    a.y
                )?;
            }
        }
        for intro in &result.introductions {
            let b = intro.bounds();
            writeln!(
                f,
                "intro [{}] x={:.1} y={:.1} w={:.1} h={:.1}",
                result.character(intro.character).name,
                b.x,
                b.y,
                b.width,
                b.height
            )?;
        }
        Ok(())
    }
}
