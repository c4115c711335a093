//! Path segments tracing each character through the chart

use tracing::debug;

use super::context::LayoutContext;
use super::types::*;

/// Link every introduction to its first appearance, then each appearance to
/// the next one of the same character
pub fn build_links(ctx: &mut LayoutContext) {
    let mut links = Vec::with_capacity(ctx.appearances.len());
    for (index, character) in ctx.characters.iter().enumerate() {
        let character_id = CharacterId(index);
        if let (Some(intro), Some(&first)) = (character.introduction, character.appearances.first()) {
            links.push(Link {
                character: character_id,
                source: Endpoint::Introduction(intro),
                target: Endpoint::Appearance(first),
            });
        }
        links.extend(character.appearances.windows(2).map(|pair| Link {
            character: character_id,
            source: Endpoint::Appearance(pair[0]),
            target: Endpoint::Appearance(pair[1]),
        }));
    }
    debug!(links = links.len(), "built links");
    ctx.links = links;
}
