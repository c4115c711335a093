//! Character introduction labels and overlap resolution

use tracing::{debug, trace};

use super::config::Orientation;
use super::context::LayoutContext;
use super::position::clamp;
use super::types::*;

/// Something an introduction label can bump into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collidable {
    Introduction(IntroductionId),
    Scene(SceneId),
}

impl Collidable {
    pub fn bounds(self, ctx: &LayoutContext) -> BoundingBox {
        match self {
            Collidable::Introduction(id) => ctx.introductions[id.0].bounds(),
            Collidable::Scene(id) => ctx.scenes[id.0].bounds(),
        }
    }

    /// Labels may be pushed around; scenes stay put
    pub fn is_movable(self) -> bool {
        matches!(self, Collidable::Introduction(_))
    }
}

/// Create one introduction per character, then push labels off each other
/// and off scenes where possible
pub fn place_introductions(ctx: &mut LayoutContext) {
    create_introductions(ctx);
    resolve_collisions(ctx);
}

fn create_introductions(ctx: &mut LayoutContext) {
    let orientation = ctx.config.orientation;
    let (size, label_size) = (ctx.config.size, ctx.config.label_size);
    let label_time = orientation.along_time(label_size);

    for index in 0..ctx.characters.len() {
        let Some(&first) = ctx.characters[index].appearances.first() else {
            continue;
        };
        let appearance = &ctx.appearances[first.0];
        let scene = &ctx.scenes[appearance.scene.0];

        let lanes = orientation.along_lanes((scene.x + appearance.x, scene.y + appearance.y));
        let mut time = orientation.along_time((scene.x, scene.y)) - 0.5 * ctx.scale;
        // Fall back to the reserved label margin when squeezed against it
        if time - label_time < label_time {
            time = label_time;
        }

        // Labels hang off x and are centred on y whatever the orientation
        let (x, y) = orientation.compose(time, lanes);
        let x = clamp(x, 0.0, size.0 - label_size.0);
        let y = clamp(y, label_size.1 / 2.0, size.1 - label_size.1 / 2.0);

        let character = &ctx.characters[index];
        let introduction = Introduction {
            character: CharacterId(index),
            x: character.forced.x.unwrap_or(x),
            y: character.forced.y.unwrap_or(y),
            width: character.forced.width.unwrap_or(label_size.0),
            height: character.forced.height.unwrap_or(label_size.1),
            label_position: character
                .label_position
                .unwrap_or(ctx.config.label_position),
        };

        let id = IntroductionId(ctx.introductions.len());
        ctx.introductions.push(introduction);
        ctx.characters[index].introduction = Some(id);
    }
}

/// Resolve overlaps along the lane axis.
///
/// Introductions are visited in lane order. Overlapping labels are pushed
/// past the current one. Overlapped scenes are cleared by the shorter of the
/// two moves around them when that move lands somewhere free; a forward move
/// may also land on labels, which are then pushed along. Anything else is left
/// as it was.
pub fn resolve_collisions(ctx: &mut LayoutContext) {
    let orientation = ctx.config.orientation;
    let collidables: Vec<Collidable> = (0..ctx.introductions.len())
        .map(|i| Collidable::Introduction(IntroductionId(i)))
        .chain((0..ctx.scenes.len()).map(|i| Collidable::Scene(SceneId(i))))
        .collect();

    let mut order: Vec<IntroductionId> = (0..ctx.introductions.len()).map(IntroductionId).collect();
    order.sort_by(|a, b| {
        let la = anchor_lane(orientation, &ctx.introductions[a.0]);
        let lb = anchor_lane(orientation, &ctx.introductions[b.0]);
        la.total_cmp(&lb)
    });

    let mut unresolved = 0;
    for id in order {
        let collisions = collisions_of(ctx, &collidables, id);
        if collisions.is_empty() {
            continue;
        }

        for &other in collisions.iter().filter(|c| c.is_movable()) {
            push_past(ctx, id, other);
        }

        let blocked: Vec<BoundingBox> = collisions
            .iter()
            .filter(|c| !c.is_movable())
            .map(|c| c.bounds(ctx))
            .collect();
        let Some(combined) = blocked.iter().copied().reduce(|a, b| a.union(&b)) else {
            continue;
        };

        let own = ctx.introductions[id.0].bounds();
        let (own_start, own_end) = lane_extent(orientation, &own);
        let (blocked_start, blocked_end) = lane_extent(orientation, &combined);
        let mut moves = [blocked_end - own_start, blocked_start - own_end];
        moves.sort_by(|a, b| a.abs().total_cmp(&b.abs()));

        let original = anchor_lane(orientation, &ctx.introductions[id.0]);
        let mut resolved = false;
        for shift in moves {
            if shift == 0.0 {
                break;
            }
            set_anchor_lane(orientation, &mut ctx.introductions[id.0], original + shift);
            let remaining = collisions_of(ctx, &collidables, id);
            if remaining.is_empty() {
                resolved = true;
                break;
            }
            if shift > 0.0 && remaining.iter().all(|c| c.is_movable()) {
                for &other in &remaining {
                    push_past(ctx, id, other);
                }
                resolved = true;
                break;
            }
            set_anchor_lane(orientation, &mut ctx.introductions[id.0], original);
        }

        if !resolved {
            unresolved += 1;
            trace!(introduction = id.0, "left overlapping a scene");
        }
    }

    debug!(
        introductions = ctx.introductions.len(),
        unresolved, "resolved introduction collisions"
    );
}

/// Everything overlapping introduction `id`, in collidable order
fn collisions_of(ctx: &LayoutContext, collidables: &[Collidable], id: IntroductionId) -> Vec<Collidable> {
    let own = ctx.introductions[id.0].bounds();
    collidables
        .iter()
        .copied()
        .filter(|&c| c != Collidable::Introduction(id))
        .filter(|c| own.intersects(&c.bounds(ctx)))
        .collect()
}

/// Move a colliding label so it starts where introduction `id` ends
fn push_past(ctx: &mut LayoutContext, id: IntroductionId, other: Collidable) {
    let Collidable::Introduction(other) = other else {
        return;
    };
    let orientation = ctx.config.orientation;
    let (_, own_end) = lane_extent(orientation, &ctx.introductions[id.0].bounds());
    let (other_start, _) = lane_extent(orientation, &ctx.introductions[other.0].bounds());
    let lane = anchor_lane(orientation, &ctx.introductions[other.0]);
    set_anchor_lane(
        orientation,
        &mut ctx.introductions[other.0],
        lane + own_end - other_start,
    );
}

fn anchor_lane(orientation: Orientation, intro: &Introduction) -> f64 {
    orientation.along_lanes((intro.x, intro.y))
}

fn set_anchor_lane(orientation: Orientation, intro: &mut Introduction, value: f64) {
    match orientation {
        Orientation::Horizontal => intro.y = value,
        Orientation::Vertical => intro.x = value,
    }
}

/// Start and end of a box along the lane axis
fn lane_extent(orientation: Orientation, bounds: &BoundingBox) -> (f64, f64) {
    match orientation {
        Orientation::Horizontal => (bounds.y, bounds.bottom()),
        Orientation::Vertical => (bounds.x, bounds.right()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{CharacterDef, SceneDef};
    use crate::layout::config::{LabelPosition, LayoutConfig};
    use crate::layout::{community, groups, indexer, position};
    use pretty_assertions::assert_eq;

    fn intro(x: f64, y: f64) -> Introduction {
        Introduction {
            character: CharacterId(0),
            x,
            y,
            width: 100.0,
            height: 15.0,
            label_position: LabelPosition::Right,
        }
    }

    fn scene(x: f64, y: f64, width: f64, height: f64) -> Scene {
        Scene {
            name: None,
            source_index: 0,
            forced: Overrides::default(),
            forced_start: None,
            forced_duration: None,
            start: 0.0,
            duration: 1.0,
            x,
            y,
            width,
            height,
            group: GroupId(0),
            appearances: Vec::new(),
        }
    }

    fn context(intros: Vec<Introduction>, scenes: Vec<Scene>) -> LayoutContext {
        let mut ctx = LayoutContext::new(LayoutConfig::new().with_size(400.0, 400.0));
        ctx.introductions = intros;
        ctx.scenes = scenes;
        ctx
    }

    fn created(config: LayoutConfig, scenes: &[SceneDef], names: &[&str]) -> LayoutContext {
        let characters: Vec<CharacterDef> = names.iter().map(|n| CharacterDef::new(*n)).collect();
        let mut ctx = LayoutContext::new(config);
        indexer::index_appearances(&mut ctx, &characters, scenes).expect("Should index");
        community::assign_groups(&mut ctx).expect("Should cluster");
        groups::order_groups(&mut ctx);
        position::solve_positions(&mut ctx);
        create_introductions(&mut ctx);
        ctx
    }

    fn lanes(ctx: &LayoutContext) -> Vec<f64> {
        ctx.introductions.iter().map(|i| i.y).collect()
    }

    #[test]
    fn test_collidable_kinds() {
        let ctx = context(vec![intro(0.0, 50.0)], vec![scene(10.0, 20.0, 5.0, 30.0)]);
        let label = Collidable::Introduction(IntroductionId(0));
        let node = Collidable::Scene(SceneId(0));
        assert!(label.is_movable());
        assert!(!node.is_movable());
        assert_eq!(label.bounds(&ctx), BoundingBox::new(0.0, 42.5, 100.0, 15.0));
        assert_eq!(node.bounds(&ctx), BoundingBox::new(10.0, 20.0, 5.0, 30.0));
    }

    #[test]
    fn test_stacked_labels_are_pushed_apart() {
        let mut ctx = context(vec![intro(0.0, 50.0), intro(0.0, 50.0)], Vec::new());
        resolve_collisions(&mut ctx);
        assert_eq!(lanes(&ctx), vec![50.0, 65.0]);
        assert!(!ctx.introductions[0]
            .bounds()
            .intersects(&ctx.introductions[1].bounds()));
    }

    #[test]
    fn test_label_moves_off_scene_with_smaller_shift() {
        // Scene spans 48..100, label 42.5..57.5: moving up by 9.5 is shorter
        let mut ctx = context(vec![intro(0.0, 50.0)], vec![scene(50.0, 48.0, 10.0, 52.0)]);
        resolve_collisions(&mut ctx);
        assert_eq!(lanes(&ctx), vec![40.5]);
    }

    #[test]
    fn test_equal_shifts_prefer_moving_forward() {
        let mut ctx = context(vec![intro(0.0, 50.0)], vec![scene(50.0, 40.0, 10.0, 20.0)]);
        resolve_collisions(&mut ctx);
        assert_eq!(lanes(&ctx), vec![67.5]);
    }

    #[test]
    fn test_unresolvable_overlap_is_left_in_place() {
        // Backward shift lands on the upper scene, forward on the lower one
        let mut ctx = context(
            vec![intro(0.0, 50.0)],
            vec![
                scene(50.0, 45.0, 10.0, 10.0),
                scene(50.0, 20.0, 10.0, 20.0),
                scene(50.0, 60.0, 10.0, 20.0),
            ],
        );
        resolve_collisions(&mut ctx);
        assert_eq!(lanes(&ctx), vec![50.0]);
    }

    #[test]
    fn test_vertical_resolves_along_x() {
        let mut ctx = context(vec![intro(50.0, 0.0), intro(50.0, 0.0)], Vec::new());
        ctx.config = ctx.config.clone().with_orientation(Orientation::Vertical);
        resolve_collisions(&mut ctx);
        let xs: Vec<f64> = ctx.introductions.iter().map(|i| i.x).collect();
        assert_eq!(xs, vec![50.0, 150.0]);
    }

    #[test]
    fn test_vertical_labels_stay_inside_the_chart() {
        let config = LayoutConfig::new()
            .with_size(120.0, 800.0)
            .with_orientation(Orientation::Vertical);
        let scenes = vec![
            SceneDef::new(["a", "b"]),
            SceneDef::new(["b", "c"]),
            SceneDef::new(["c", "d"]),
            SceneDef::new(["d", "a"]),
        ];
        let ctx = created(config, &scenes, &["a", "b", "c", "d"]);
        assert_eq!(ctx.introductions.len(), 4);

        for intro in &ctx.introductions {
            let bounds = intro.bounds();
            assert!(bounds.x >= 0.0 && bounds.right() <= 120.0, "{:?}", bounds);
            assert!(bounds.y >= 0.0 && bounds.bottom() <= 800.0, "{:?}", bounds);
        }
        // Lanes past 20 would push a 100 wide label off the right edge
        assert!(ctx.introductions.iter().any(|i| i.x == 20.0));
    }

    #[test]
    fn test_horizontal_labels_clamp_to_label_margins() {
        let config = LayoutConfig::new().with_size(300.0, 30.0);
        let scenes = vec![SceneDef::new(["a", "b", "c"]), SceneDef::new(["a", "b", "c"])];
        let ctx = created(config, &scenes, &["a", "b", "c"]);

        let ys: Vec<f64> = ctx.introductions.iter().map(|i| i.y).collect();
        assert_eq!(ys, vec![7.5, 15.0, 22.5]);
        assert!(ctx.introductions.iter().all(|i| i.x == 100.0));
    }
}
