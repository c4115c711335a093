//! Core types for the layout engine
//!
//! Entities live in flat arenas and refer to each other through typed index
//! handles, so the character/scene/group graph carries no reference cycles.

use serde::Serialize;

use super::config::{LabelPosition, Orientation};

/// A 2D point in the coordinate system
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A bounding box representing the spatial extent of a node
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a zero-sized bounding box at the origin
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// Right edge x-coordinate
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge y-coordinate
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Corners as `[[x0, y0], [x1, y1]]`
    pub fn corners(&self) -> [[f64; 2]; 2] {
        [[self.x, self.y], [self.right(), self.bottom()]]
    }

    /// Check if this bounding box overlaps another.
    ///
    /// Boxes that only touch along an edge do not overlap.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Compute the union of two bounding boxes (smallest box containing both)
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        BoundingBox::new(x, y, right - x, bottom - y)
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::zero()
    }
}

/// Anything with an axis-aligned extent on the chart
pub trait Bounded {
    fn bounds(&self) -> BoundingBox;
}

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(pub usize);

        impl $name {
            pub fn index(self) -> usize {
                self.0
            }
        }
    };
}

arena_id!(
    /// Handle into [`LayoutResult::characters`]
    CharacterId
);
arena_id!(
    /// Handle into [`LayoutResult::scenes`]
    SceneId
);
arena_id!(
    /// Handle into [`LayoutResult::appearances`]
    AppearanceId
);
arena_id!(
    /// Handle into [`LayoutResult::groups`]
    GroupId
);
arena_id!(
    /// Handle into [`LayoutResult::introductions`]
    IntroductionId
);

/// Caller-forced geometry; `None` means "compute it"
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Overrides {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

/// A character that survived appearance filtering
#[derive(Debug, Clone, Serialize)]
pub struct Character {
    pub name: String,
    /// Position in the caller's character list
    pub source_index: usize,
    pub forced: Overrides,
    pub initial_group: Option<usize>,
    pub label_position: Option<LabelPosition>,
    /// Mean visual order of the groups of the scenes this character is in
    pub average_scene_position: f64,
    pub group: GroupId,
    /// In first-seen scene order
    pub appearances: Vec<AppearanceId>,
    pub introduction: Option<IntroductionId>,
}

/// A scene that survived appearance filtering
#[derive(Debug, Clone, Serialize)]
pub struct Scene {
    pub name: Option<String>,
    /// Position in the caller's scene list
    pub source_index: usize,
    pub forced: Overrides,
    pub forced_start: Option<f64>,
    pub forced_duration: Option<f64>,
    pub start: f64,
    pub duration: f64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// The group most of this scene's characters belong to
    pub group: GroupId,
    /// Sorted by lane once positions are solved
    pub appearances: Vec<AppearanceId>,
}

impl Bounded for Scene {
    fn bounds(&self) -> BoundingBox {
        BoundingBox::new(self.x, self.y, self.width, self.height)
    }
}

/// One character present in one scene
#[derive(Debug, Clone, Serialize)]
pub struct Appearance {
    pub character: CharacterId,
    pub scene: SceneId,
    /// Offset from the scene origin
    pub x: f64,
    pub y: f64,
}

/// A community of characters
#[derive(Debug, Clone, Serialize)]
pub struct Group {
    /// Community id reported by the clusterer
    pub community: usize,
    pub characters: Vec<CharacterId>,
    /// Unique characters of the scenes assigned to this group
    pub appearances: Vec<CharacterId>,
    pub min: f64,
    pub max: f64,
    /// Visual position among all groups
    pub order: usize,
    /// Number of scenes assigned to this group
    pub median_count: usize,
}

impl Group {
    pub fn new(community: usize) -> Self {
        Self {
            community,
            characters: Vec::new(),
            appearances: Vec::new(),
            min: 0.0,
            max: 0.0,
            order: 0,
            median_count: 0,
        }
    }
}

/// Label node placed before a character's first appearance
#[derive(Debug, Clone, Serialize)]
pub struct Introduction {
    pub character: CharacterId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub label_position: LabelPosition,
}

impl Bounded for Introduction {
    fn bounds(&self) -> BoundingBox {
        let (x, y, w, h) = (self.x, self.y, self.width, self.height);
        match self.label_position {
            LabelPosition::Left => BoundingBox::new(x - w, y - h / 2.0, w, h),
            LabelPosition::Above => BoundingBox::new(x - w / 2.0, y - h, w, h),
            LabelPosition::Right => BoundingBox::new(x, y - h / 2.0, w, h),
            LabelPosition::Below => BoundingBox::new(x - w / 2.0, y, w, h),
        }
    }
}

/// End of a link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Endpoint {
    Introduction(IntroductionId),
    Appearance(AppearanceId),
}

/// A path segment of one character's line through the chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Link {
    pub character: CharacterId,
    pub source: Endpoint,
    pub target: Endpoint,
}

/// The complete result of layout computation
#[derive(Debug, Clone, Default, Serialize)]
pub struct LayoutResult {
    pub orientation: Orientation,
    /// Chart units per unit of scene time
    pub scale: f64,
    pub characters: Vec<Character>,
    pub scenes: Vec<Scene>,
    pub appearances: Vec<Appearance>,
    pub groups: Vec<Group>,
    pub introductions: Vec<Introduction>,
    pub links: Vec<Link>,
}

impl LayoutResult {
    /// Create an empty layout result
    pub fn new() -> Self {
        Self::default()
    }

    pub fn character(&self, id: CharacterId) -> &Character {
        &self.characters[id.0]
    }

    pub fn scene(&self, id: SceneId) -> &Scene {
        &self.scenes[id.0]
    }

    pub fn appearance(&self, id: AppearanceId) -> &Appearance {
        &self.appearances[id.0]
    }

    pub fn group(&self, id: GroupId) -> &Group {
        &self.groups[id.0]
    }

    pub fn introduction(&self, id: IntroductionId) -> &Introduction {
        &self.introductions[id.0]
    }

    /// Get a character by name
    pub fn character_by_name(&self, name: &str) -> Option<(CharacterId, &Character)> {
        self.characters
            .iter()
            .enumerate()
            .find(|(_, c)| c.name == name)
            .map(|(index, c)| (CharacterId(index), c))
    }

    /// Groups sorted by visual order
    pub fn groups_in_order(&self) -> Vec<(GroupId, &Group)> {
        let mut groups: Vec<(GroupId, &Group)> = self
            .groups
            .iter()
            .enumerate()
            .map(|(index, g)| (GroupId(index), g))
            .collect();
        groups.sort_by_key(|(_, g)| g.order);
        groups
    }

    /// Absolute position of an appearance (scene origin plus local offset)
    pub fn appearance_position(&self, id: AppearanceId) -> Point {
        let appearance = self.appearance(id);
        let scene = self.scene(appearance.scene);
        Point::new(scene.x + appearance.x, scene.y + appearance.y)
    }

    /// Absolute position of a link endpoint
    pub fn endpoint_position(&self, endpoint: Endpoint) -> Point {
        match endpoint {
            Endpoint::Introduction(id) => {
                let intro = self.introduction(id);
                Point::new(intro.x, intro.y)
            }
            Endpoint::Appearance(id) => self.appearance_position(id),
        }
    }

    /// Width and height actually used by scenes and introductions
    pub fn extent(&self) -> (f64, f64) {
        let scenes = self.scenes.iter().map(|s| s.bounds());
        let intros = self.introductions.iter().map(|i| i.bounds());
        scenes.chain(intros).fold((0.0, 0.0), |(w, h): (f64, f64), b| {
            (w.max(b.right()), h.max(b.bottom()))
        })
    }
}
