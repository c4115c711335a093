//! Resolve scene members into appearances and drop one-off participants
//!
//! Only characters that appear in at least two scenes, and scenes that hold
//! at least two of those characters, take part in the chart. Removing one can
//! push another below the threshold, so filtering runs to a fixed point.

use std::collections::{HashMap, HashSet};

use tracing::trace;

use super::context::LayoutContext;
use super::error::LayoutError;
use super::types::*;
use crate::input::{CharacterDef, CharacterRef, SceneDef};

/// Minimum number of appearances a character or scene needs to survive
const MIN_APPEARANCES: usize = 2;

/// Build the character, scene and appearance arenas from caller input.
///
/// Arenas are rebuilt in first-seen order of the surviving appearances, which
/// are visited scene by scene in member order.
pub fn index_appearances(
    ctx: &mut LayoutContext,
    characters: &[CharacterDef],
    scenes: &[SceneDef],
) -> Result<(), LayoutError> {
    let pairs = resolve_members(characters, scenes)?;
    let total = pairs.len();
    let pairs = filter_appearances(pairs);
    trace!(total, kept = pairs.len(), "filtered appearances");

    let mut character_ids: HashMap<usize, CharacterId> = HashMap::new();
    let mut scene_ids: HashMap<usize, SceneId> = HashMap::new();

    for (scene_index, character_index) in pairs {
        let scene = *scene_ids.entry(scene_index).or_insert_with(|| {
            ctx.scenes.push(new_scene(&scenes[scene_index], scene_index));
            SceneId(ctx.scenes.len() - 1)
        });
        let character = *character_ids.entry(character_index).or_insert_with(|| {
            ctx.characters
                .push(new_character(&characters[character_index], character_index));
            CharacterId(ctx.characters.len() - 1)
        });

        let id = AppearanceId(ctx.appearances.len());
        ctx.appearances.push(Appearance {
            character,
            scene,
            x: 0.0,
            y: 0.0,
        });
        ctx.scenes[scene.0].appearances.push(id);
        ctx.characters[character.0].appearances.push(id);
    }

    Ok(())
}

/// Repeatedly drop `(scene, character)` pairs whose character or scene has
/// fewer than two pairs, until nothing changes. Order is preserved.
pub fn filter_appearances(mut pairs: Vec<(usize, usize)>) -> Vec<(usize, usize)> {
    loop {
        let mut scene_counts: HashMap<usize, usize> = HashMap::new();
        let mut character_counts: HashMap<usize, usize> = HashMap::new();
        for &(scene, character) in &pairs {
            *scene_counts.entry(scene).or_default() += 1;
            *character_counts.entry(character).or_default() += 1;
        }

        let before = pairs.len();
        pairs.retain(|(scene, character)| {
            scene_counts[scene] >= MIN_APPEARANCES && character_counts[character] >= MIN_APPEARANCES
        });
        if pairs.len() == before {
            return pairs;
        }
    }
}

/// Turn member references into `(scene index, character index)` pairs
fn resolve_members(
    characters: &[CharacterDef],
    scenes: &[SceneDef],
) -> Result<Vec<(usize, usize)>, LayoutError> {
    let mut by_name: HashMap<&str, usize> = HashMap::new();
    for (index, character) in characters.iter().enumerate() {
        by_name.entry(character.name.as_str()).or_insert(index);
    }

    let mut pairs = Vec::new();
    for (scene_index, scene) in scenes.iter().enumerate() {
        let mut seen = HashSet::new();
        for member in &scene.characters {
            let character_index = match member {
                CharacterRef::Index(index) => {
                    if *index >= characters.len() {
                        return Err(LayoutError::CharacterIndexOutOfRange {
                            scene: scene.label(scene_index),
                            index: *index,
                            count: characters.len(),
                        });
                    }
                    *index
                }
                CharacterRef::Name(name) => match by_name.get(name.as_str()) {
                    Some(index) => *index,
                    None => {
                        let suggestions = find_similar(by_name.keys().copied(), name, 2);
                        return Err(LayoutError::unknown_character(
                            scene.label(scene_index),
                            name.clone(),
                            suggestions,
                        ));
                    }
                },
            };
            if seen.insert(character_index) {
                pairs.push((scene_index, character_index));
            }
        }
    }
    Ok(pairs)
}

fn new_character(def: &CharacterDef, source_index: usize) -> Character {
    Character {
        name: def.name.clone(),
        source_index,
        forced: Overrides {
            x: def.x,
            y: def.y,
            width: def.width,
            height: def.height,
        },
        initial_group: def.initial_group,
        label_position: def.label_position,
        average_scene_position: 0.0,
        group: GroupId(0),
        appearances: Vec::new(),
        introduction: None,
    }
}

fn new_scene(def: &SceneDef, source_index: usize) -> Scene {
    Scene {
        name: def.name.clone(),
        source_index,
        forced: Overrides {
            x: def.x,
            y: def.y,
            width: None,
            height: None,
        },
        forced_start: def.start,
        forced_duration: def.duration,
        start: 0.0,
        duration: 0.0,
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
        group: GroupId(0),
        appearances: Vec::new(),
    }
}

/// Calculate Levenshtein distance between two strings
fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }

    // Single rolling row
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.iter().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let above = row[j + 1];
            let cost = usize::from(ca != cb);
            row[j + 1] = (above + 1).min(row[j] + 1).min(diagonal + cost);
            diagonal = above;
        }
    }
    row[b.len()]
}

/// Names within `max_distance` edits of `target`, closest first, at most three
fn find_similar<'a>(
    names: impl Iterator<Item = &'a str>,
    target: &str,
    max_distance: usize,
) -> Vec<String> {
    let mut candidates: Vec<(&str, usize)> = names
        .map(|name| (name, levenshtein_distance(name, target)))
        .filter(|&(_, dist)| dist > 0 && dist <= max_distance)
        .collect();
    candidates.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));
    candidates
        .into_iter()
        .take(3)
        .map(|(name, _)| name.to_string())
        .collect()
}
