//! Mutable state threaded through the pipeline stages

use super::config::LayoutConfig;
use super::types::*;

/// Everything one layout run works on.
///
/// Each stage takes `&mut LayoutContext`, annotates the arenas, and hands the
/// context on to the next stage. Nothing outlives the run.
#[derive(Debug, Clone, Default)]
pub struct LayoutContext {
    pub config: LayoutConfig,
    pub scale: f64,
    pub characters: Vec<Character>,
    pub scenes: Vec<Scene>,
    pub appearances: Vec<Appearance>,
    pub groups: Vec<Group>,
    pub introductions: Vec<Introduction>,
    pub links: Vec<Link>,
}

impl LayoutContext {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            scale: 1.0,
            ..Self::default()
        }
    }

    pub fn character_of(&self, appearance: AppearanceId) -> CharacterId {
        self.appearances[appearance.0].character
    }

    /// Group of the character behind an appearance
    pub fn group_of(&self, appearance: AppearanceId) -> GroupId {
        self.characters[self.character_of(appearance).0].group
    }

    /// Group ids sorted by visual order
    pub fn groups_in_order(&self) -> Vec<GroupId> {
        let mut ids: Vec<GroupId> = (0..self.groups.len()).map(GroupId).collect();
        ids.sort_by_key(|id| self.groups[id.0].order);
        ids
    }

    pub fn into_result(self) -> LayoutResult {
        LayoutResult {
            orientation: self.config.orientation,
            scale: self.scale,
            characters: self.characters,
            scenes: self.scenes,
            appearances: self.appearances,
            groups: self.groups,
            introductions: self.introductions,
            links: self.links,
        }
    }
}
