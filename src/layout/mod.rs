//! Layout engine for narrative charts
//!
//! This module takes characters and scenes and computes the chart geometry:
//! communities of characters become groups of lanes, scenes are placed along
//! the time axis, and introduction labels are pushed clear of scenes.

pub mod community;
pub mod config;
pub mod context;
pub mod error;
pub mod groups;
pub mod indexer;
pub mod introductions;
pub mod links;
pub mod position;
pub mod types;

pub use config::{LabelPosition, LayoutConfig, Orientation, Padding, ParseOptionError};
pub use context::LayoutContext;
pub use error::LayoutError;
pub use introductions::Collidable;
pub use types::*;

use tracing::{debug, debug_span};

use crate::input::{CharacterDef, SceneDef};

/// Compute the layout for a narrative.
///
/// Runs the stages in order: index appearances, detect communities, order
/// groups, solve positions, place introductions, build links. Input that
/// leaves no character with two shared scenes produces an empty result.
pub fn compute(
    characters: &[CharacterDef],
    scenes: &[SceneDef],
    config: &LayoutConfig,
) -> Result<LayoutResult, LayoutError> {
    config.validate()?;
    let _span = debug_span!(
        "layout",
        characters = characters.len(),
        scenes = scenes.len()
    )
    .entered();

    let mut ctx = LayoutContext::new(config.clone());
    indexer::index_appearances(&mut ctx, characters, scenes)?;
    debug!(
        characters = ctx.characters.len(),
        scenes = ctx.scenes.len(),
        appearances = ctx.appearances.len(),
        "indexed appearances"
    );

    community::assign_groups(&mut ctx)?;
    groups::order_groups(&mut ctx);
    position::solve_positions(&mut ctx);
    introductions::place_introductions(&mut ctx);
    links::build_links(&mut ctx);

    Ok(ctx.into_result())
}
