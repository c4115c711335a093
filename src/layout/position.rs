//! Lane assignment, scene timing and coordinates
//!
//! Two axes matter here. The time axis runs along scene order; the lane axis
//! stacks one lane per character. For a horizontal chart time is `x` and
//! lanes are `y`; a vertical chart swaps them.

use std::cmp::Ordering;

use tracing::debug;

use super::config::Orientation;
use super::context::LayoutContext;
use super::types::*;

/// Centre of the `index`-th lane
pub fn lane(index: usize, path_space: f64) -> f64 {
    index as f64 * path_space + path_space / 2.0
}

/// Room taken by `count` lanes
pub fn lane_span(count: usize, path_space: f64) -> f64 {
    count as f64 * path_space
}

/// Run every position step in sequence
pub fn solve_positions(ctx: &mut LayoutContext) {
    compute_group_positions(ctx);
    compute_character_group_positions(ctx);
    sort_group_appearances(ctx);
    compute_scene_timing(ctx);
    compute_appearance_positions(ctx);
    compute_scene_positions(ctx);
    debug!(scale = ctx.scale, scenes = ctx.scenes.len(), "solved positions");
}

/// Stack group extents along the lane axis in visual order
fn compute_group_positions(ctx: &mut LayoutContext) {
    let path_space = ctx.config.path_space;
    let mut cursor = 0.0;
    for id in ctx.groups_in_order() {
        let group = &mut ctx.groups[id.0];
        group.min = cursor;
        group.max = group.min + lane_span(group.appearances.len(), path_space);
        cursor = group.max + ctx.config.group_margin;
    }
}

/// Average visual order of the scenes each character is in, then order each
/// group's members by it
fn compute_character_group_positions(ctx: &mut LayoutContext) {
    let LayoutContext {
        characters,
        scenes,
        appearances,
        groups,
        ..
    } = ctx;

    for character in characters.iter_mut() {
        let orders: Vec<f64> = character
            .appearances
            .iter()
            .map(|a| groups[scenes[appearances[a.0].scene.0].group.0].order as f64)
            .collect();
        character.average_scene_position = if orders.is_empty() {
            0.0
        } else {
            orders.iter().sum::<f64>() / orders.len() as f64
        };
    }

    for group in groups.iter_mut() {
        group.characters.sort_by(|a, b| {
            characters[a.0]
                .average_scene_position
                .total_cmp(&characters[b.0].average_scene_position)
                .then(a.cmp(b))
        });
    }
}

/// Lane order of two characters: group order, then average scene position,
/// then first-seen order
fn lane_order(characters: &[Character], groups: &[Group], a: CharacterId, b: CharacterId) -> Ordering {
    let (ca, cb) = (&characters[a.0], &characters[b.0]);
    groups[ca.group.0]
        .order
        .cmp(&groups[cb.group.0].order)
        .then(ca.average_scene_position.total_cmp(&cb.average_scene_position))
        .then(a.cmp(&b))
}

fn sort_group_appearances(ctx: &mut LayoutContext) {
    let order: Vec<usize> = ctx.groups.iter().map(|g| g.order).collect();
    let LayoutContext {
        characters, groups, ..
    } = ctx;
    for group in groups.iter_mut() {
        group.appearances.sort_by(|&a, &b| {
            let (ca, cb) = (&characters[a.0], &characters[b.0]);
            order[ca.group.0]
                .cmp(&order[cb.group.0])
                .then(ca.average_scene_position.total_cmp(&cb.average_scene_position))
                .then(a.cmp(&b))
        });
    }
}

/// Lay scenes out one time unit apart unless forced, and derive the scale
/// from the space left after the label margin
fn compute_scene_timing(ctx: &mut LayoutContext) {
    let mut cursor = 1.0;
    for scene in ctx.scenes.iter_mut() {
        scene.start = scene.forced_start.unwrap_or(cursor);
        scene.duration = scene.forced_duration.unwrap_or(1.0);
        cursor += scene.duration;
    }

    let orientation = ctx.config.orientation;
    let room = orientation.along_time(ctx.config.size) - orientation.along_time(ctx.config.label_size);
    ctx.scale = room / cursor;
}

/// Sort each scene's appearances into lanes and set their local offsets
fn compute_appearance_positions(ctx: &mut LayoutContext) {
    let orientation = ctx.config.orientation;
    let path_space = ctx.config.path_space;
    let padding = ctx.config.scene_padding;
    let LayoutContext {
        characters,
        scenes,
        appearances,
        groups,
        ..
    } = ctx;
    let (characters, groups): (&[Character], &[Group]) = (characters, groups);

    for scene in scenes.iter_mut() {
        scene.appearances.sort_by(|a, b| {
            lane_order(
                characters,
                groups,
                appearances[a.0].character,
                appearances[b.0].character,
            )
        });
        for (i, id) in scene.appearances.iter().enumerate() {
            let appearance = &mut appearances[id.0];
            (appearance.x, appearance.y) = match orientation {
                Orientation::Horizontal => (padding.left, lane(i, path_space) + padding.top),
                Orientation::Vertical => (lane(i, path_space) + padding.left, padding.top),
            };
        }
    }
}

/// Size each scene and place it on both axes.
///
/// On the lane axis a scene sits at the average lane of the characters visiting
/// from other groups, so that it leans towards where they come from.
fn compute_scene_positions(ctx: &mut LayoutContext) {
    let orientation = ctx.config.orientation;
    let path_space = ctx.config.path_space;
    let padding = ctx.config.scene_padding;
    let (label_size, size, scale) = (ctx.config.label_size, ctx.config.size, ctx.scale);
    let LayoutContext {
        characters,
        scenes,
        appearances,
        groups,
        ..
    } = ctx;
    let (characters, groups): (&[Character], &[Group]) = (characters, groups);

    for scene in scenes.iter_mut() {
        let span = lane_span(scene.appearances.len(), path_space);
        (scene.width, scene.height) = match orientation {
            Orientation::Horizontal => (padding.left + padding.right, span + padding.top + padding.bottom),
            Orientation::Vertical => (span + padding.left + padding.right, padding.top + padding.bottom),
        };

        let group = &groups[scene.group.0];
        let visitors: Vec<CharacterId> = scene
            .appearances
            .iter()
            .map(|a| appearances[a.0].character)
            .filter(|c| characters[c.0].group != scene.group)
            .collect();
        let members: Vec<CharacterId> = if visitors.is_empty() {
            scene
                .appearances
                .iter()
                .map(|a| appearances[a.0].character)
                .collect()
        } else {
            visitors
        };
        // Every scene member appears in the scene's group
        let member_lanes: Vec<f64> = members
            .iter()
            .filter_map(|c| group.appearances.iter().position(|g| g == c))
            .map(|index| lane(index, path_space) + group.min)
            .collect();
        debug_assert_eq!(member_lanes.len(), members.len());
        let average = if member_lanes.is_empty() {
            0.0
        } else {
            member_lanes.iter().sum::<f64>() / member_lanes.len() as f64
        };

        let lanes = average - orientation.along_lanes((scene.width, scene.height)) / 2.0;
        let lanes = clamp(lanes, 0.0, orientation.along_lanes(size));
        let time = scale * scene.start + orientation.along_time(label_size);
        let time = clamp(time, 0.0, orientation.along_time(size));

        let (x, y) = orientation.compose(time, lanes);
        scene.x = scene.forced.x.unwrap_or(x);
        scene.y = scene.forced.y.unwrap_or(y);
    }
}

/// Clamp into `[lo, hi]`, with `lo` winning when the range is empty
pub(crate) fn clamp(value: f64, lo: f64, hi: f64) -> f64 {
    value.min(hi).max(lo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{CharacterDef, SceneDef};
    use crate::layout::config::{LayoutConfig, Padding};
    use crate::layout::{community, groups, indexer};
    use pretty_assertions::assert_eq;

    fn solved(config: LayoutConfig, scenes: &[SceneDef], names: &[&str]) -> LayoutContext {
        let characters: Vec<CharacterDef> = names.iter().map(|n| CharacterDef::new(*n)).collect();
        let mut ctx = LayoutContext::new(config);
        indexer::index_appearances(&mut ctx, &characters, scenes).expect("Should index");
        community::assign_groups(&mut ctx).expect("Should cluster");
        groups::order_groups(&mut ctx);
        solve_positions(&mut ctx);
        ctx
    }

    #[test]
    fn test_lane_helpers() {
        assert_eq!(lane(0, 10.0), 5.0);
        assert_eq!(lane(3, 10.0), 35.0);
        assert_eq!(lane_span(4, 10.0), 40.0);
        assert_eq!(lane_span(0, 10.0), 0.0);
    }

    #[test]
    fn test_clamp_prefers_lower_bound() {
        assert_eq!(clamp(5.0, 0.0, 10.0), 5.0);
        assert_eq!(clamp(-1.0, 0.0, 10.0), 0.0);
        assert_eq!(clamp(11.0, 0.0, 10.0), 10.0);
        assert_eq!(clamp(5.0, 3.0, 1.0), 3.0);
    }

    #[test]
    fn test_scene_timing_and_scale() {
        let config = LayoutConfig::new().with_size(400.0, 200.0);
        let scenes = vec![
            SceneDef::new([0, 1]),
            SceneDef::new([0, 1]).with_duration(2.0),
            SceneDef::new([0, 1]).with_start(10.0),
        ];
        let ctx = solved(config, &scenes, &["a", "b"]);

        let timing: Vec<(f64, f64)> = ctx.scenes.iter().map(|s| (s.start, s.duration)).collect();
        assert_eq!(timing, vec![(1.0, 1.0), (2.0, 2.0), (10.0, 1.0)]);
        // Cursor ends at 1 + 1 + 2 + 1 = 5
        assert_eq!(ctx.scale, (400.0 - 100.0) / 5.0);
        assert_eq!(ctx.scenes[0].x, 60.0 + 100.0);
    }

    #[test]
    fn test_lanes_within_scene_are_path_space_apart() {
        let config = LayoutConfig::new()
            .with_size(800.0, 400.0)
            .with_path_space(12.0)
            .with_scene_padding(Padding::new(3.0, 0.0, 4.0, 1.0));
        let scenes = vec![SceneDef::new([0, 1, 2]), SceneDef::new([0, 1, 2])];
        let ctx = solved(config, &scenes, &["a", "b", "c"]);

        for scene in &ctx.scenes {
            let ys: Vec<f64> = scene.appearances.iter().map(|a| ctx.appearances[a.0].y).collect();
            assert_eq!(ys, vec![9.0, 21.0, 33.0]);
            assert!(scene.appearances.iter().all(|a| ctx.appearances[a.0].x == 1.0));
            assert_eq!(scene.height, 36.0 + 7.0);
            assert_eq!(scene.width, 1.0);
        }
    }

    #[test]
    fn test_vertical_swaps_axes() {
        let config = LayoutConfig::new()
            .with_size(200.0, 400.0)
            .with_orientation(Orientation::Vertical);
        let scenes = vec![SceneDef::new([0, 1]), SceneDef::new([0, 1])];
        let ctx = solved(config, &scenes, &["a", "b"]);

        let scene = &ctx.scenes[0];
        assert_eq!((scene.width, scene.height), (20.0, 0.0));
        let xs: Vec<f64> = scene.appearances.iter().map(|a| ctx.appearances[a.0].x).collect();
        assert_eq!(xs, vec![5.0, 15.0]);
        // scale = (400 - 15) / 3
        assert_eq!(scene.y, ctx.scale + 15.0);
        // Single group: average lane 10, minus half the scene width
        assert_eq!(scene.x, 0.0);
    }

    #[test]
    fn test_group_extents_stack_with_margin() {
        let config = LayoutConfig::new()
            .with_size(800.0, 400.0)
            .with_group_margin(7.0);
        let scenes = vec![
            SceneDef::new([0, 1, 2]),
            SceneDef::new([0, 1, 2]),
            SceneDef::new([3, 4]),
            SceneDef::new([3, 4]),
        ];
        let ctx = solved(config, &scenes, &["a", "b", "c", "d", "e"]);
        assert_eq!(ctx.groups.len(), 2);

        let ordered = ctx.groups_in_order();
        let first = &ctx.groups[ordered[0].0];
        let second = &ctx.groups[ordered[1].0];
        assert_eq!(first.min, 0.0);
        assert_eq!(first.max, lane_span(first.appearances.len(), 10.0));
        assert_eq!(second.min, first.max + 7.0);
        assert_eq!(second.max, second.min + lane_span(second.appearances.len(), 10.0));
    }

    #[test]
    fn test_scenes_lean_towards_visitor_lanes() {
        let config = LayoutConfig::new().with_size(800.0, 300.0);
        let scenes = vec![
            SceneDef::new(["a", "b"]),
            SceneDef::new(["b", "c"]),
            SceneDef::new(["c", "d"]),
            SceneDef::new(["d", "a"]),
        ];
        let ctx = solved(config, &scenes, &["a", "b", "c", "d"]);

        // Groups {a, b} over lanes 0..30 and {c, d} over 30..60. The second
        // scene sits on b's lane in the lower group, the last on d's lane in
        // the upper group, and scenes without visitors centre on their members.
        let ys: Vec<f64> = ctx.scenes.iter().map(|s| s.y).collect();
        assert_eq!(ys, vec![0.0, 25.0, 40.0, 15.0]);
    }

    #[test]
    fn test_forced_scene_position_wins() {
        let config = LayoutConfig::new().with_size(400.0, 200.0);
        let scenes = vec![
            SceneDef::new([0, 1]).with_position(0.0, 0.0),
            SceneDef::new([0, 1]),
        ];
        let ctx = solved(config, &scenes, &["a", "b"]);
        assert_eq!((ctx.scenes[0].x, ctx.scenes[0].y), (0.0, 0.0));
        assert!(ctx.scenes[1].x > 0.0);
    }
}
