//! Placement hierarchy for an arena
//!
//! A scene is a tree of named nodes, each with a local transform, a surface
//! tag, and optionally a static collider or a fire component. Layouts can be
//! written by hand or loaded through serde; [`Scene::new`] assigns collider
//! ids in depth-first order so the same layout always produces the same ids.

use serde::{Deserialize, Serialize};

use crate::core_types::{vec3, Pose, Quat, Vec3};
use crate::fire::FireField;
use crate::physics::{ArenaWorld, ColliderId, ColliderKind, Shape, StaticCollider, SurfaceTag};

/// Local transform of a scene node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeTransform {
    pub position: Vec3,
    /// Rotation about the vertical axis (degrees)
    pub yaw: f32,
    /// Rotation about the local right axis, applied before yaw (degrees)
    pub pitch: f32,
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            yaw: 0.0,
            pitch: 0.0,
        }
    }
}

impl NodeTransform {
    pub fn at(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: Vec3::new(x, y, z),
            ..Self::default()
        }
    }

    pub fn with_yaw(mut self, yaw: f32) -> Self {
        self.yaw = yaw;
        self
    }

    pub fn pose(&self) -> Pose {
        let pitch = Quat::from_axis_angle(&Vec3::x_axis(), self.pitch.to_radians());
        Pose::from_parts(self.position.into(), vec3::yaw_rotation(self.yaw) * pitch)
    }
}

/// Static collider attached to a node; its tag is the node's tag
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColliderSpec {
    pub shape: Shape,
    pub kind: ColliderKind,
    #[serde(skip)]
    pub id: ColliderId,
}

/// One collider region of a fire component
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionSpec {
    pub shape: Shape,
    #[serde(default)]
    pub offset: NodeTransform,
    #[serde(skip)]
    pub id: ColliderId,
}

/// Fire component carried by a node tagged `fire`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FireSpec {
    pub interactive: RegionSpec,
    pub solid: RegionSpec,
}

/// A node of the placement hierarchy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub name: String,
    #[serde(default)]
    pub tag: SurfaceTag,
    #[serde(default)]
    pub transform: NodeTransform,
    #[serde(default)]
    pub collider: Option<ColliderSpec>,
    #[serde(default)]
    pub fire: Option<FireSpec>,
    #[serde(default)]
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: SurfaceTag::Untagged,
            transform: NodeTransform::default(),
            collider: None,
            fire: None,
            children: Vec::new(),
        }
    }

    pub fn tagged(mut self, tag: SurfaceTag) -> Self {
        self.tag = tag;
        self
    }

    pub fn at(mut self, transform: NodeTransform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_collider(mut self, shape: Shape, kind: ColliderKind) -> Self {
        self.collider = Some(ColliderSpec {
            shape,
            kind,
            id: ColliderId::default(),
        });
        self
    }

    pub fn with_fire(mut self, fire: FireSpec) -> Self {
        self.fire = Some(fire);
        self
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    /// Whether any descendant is tagged `fire`
    pub fn has_fire_descendant(&self) -> bool {
        self.children
            .iter()
            .any(|c| c.tag == SurfaceTag::Fire || c.has_fire_descendant())
    }
}

/// A scene with collider ids assigned
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    root: SceneNode,
}

impl Scene {
    pub fn new(mut root: SceneNode) -> Self {
        let mut next = 1;
        assign_ids(&mut root, &mut next);
        Self { root }
    }

    pub fn root(&self) -> &SceneNode {
        &self.root
    }

    /// World position of the root node (the arena center)
    pub fn center(&self) -> Vec3 {
        self.root.transform.position
    }

    /// Every node-level collider in world space, in depth-first order
    pub fn static_colliders(&self) -> Vec<StaticCollider> {
        let mut out = Vec::new();
        collect_colliders(&self.root, Pose::identity(), &mut out);
        out
    }

    /// Build a reference physics world holding the scene colliders and the
    /// regions of every fire in `field`.
    pub fn build_world(&self, field: &FireField) -> ArenaWorld {
        let mut world = ArenaWorld::new();
        for collider in self.static_colliders() {
            world.add_collider(collider);
        }
        world.add_fire_regions(field);
        world
    }
}

fn assign_ids(node: &mut SceneNode, next: &mut u32) {
    let mut take = || {
        let id = ColliderId(*next);
        *next += 1;
        id
    };
    if let Some(collider) = node.collider.as_mut() {
        collider.id = take();
    }
    if let Some(fire) = node.fire.as_mut() {
        fire.interactive.id = take();
        fire.solid.id = take();
    }
    for child in &mut node.children {
        assign_ids(child, next);
    }
}

fn collect_colliders(node: &SceneNode, parent: Pose, out: &mut Vec<StaticCollider>) {
    let pose = parent * node.transform.pose();
    if let Some(spec) = node.collider {
        out.push(StaticCollider {
            id: spec.id,
            shape: spec.shape,
            pose,
            tag: node.tag,
            kind: spec.kind,
            enabled: true,
        });
    }
    for child in &node.children {
        collect_colliders(child, pose, out);
    }
}

/// Half-width of the standard arena floor (m)
pub const STANDARD_HALF_WIDTH: f32 = 12.5;

/// Number of fires in the standard arena
pub const STANDARD_FIRE_COUNT: usize = 8;

/// Radius of the ring the standard fires sit on (m)
pub const STANDARD_FIRE_RING: f32 = 8.0;

/// Fire component used by the standard arena: a trigger sphere in front of
/// a solid block, both at torso height.
pub fn standard_fire() -> FireSpec {
    FireSpec {
        interactive: RegionSpec {
            shape: Shape::Sphere { radius: 0.35 },
            offset: NodeTransform::at(0.0, 0.5, 0.3),
            id: ColliderId::default(),
        },
        solid: RegionSpec {
            shape: Shape::Cuboid {
                half_extents: Vec3::new(0.35, 0.5, 0.2),
            },
            offset: NodeTransform::at(0.0, 0.5, 0.0),
            id: ColliderId::default(),
        },
    }
}

/// Default layout: a 25 m square floor walled on four sides, eight fires on
/// a ring facing the center, and three rocks inside the spawn area.
pub fn standard_arena() -> Scene {
    let h = STANDARD_HALF_WIDTH;
    let wall = |name: &str, transform: NodeTransform| {
        SceneNode::new(name)
            .tagged(SurfaceTag::Boundary)
            .at(transform)
            .with_collider(
                Shape::Cuboid {
                    half_extents: Vec3::new(h, 1.0, 0.25),
                },
                ColliderKind::Solid,
            )
    };

    let mut fires = SceneNode::new("Fires");
    for i in 0..STANDARD_FIRE_COUNT {
        let angle = i as f32 * 360.0 / STANDARD_FIRE_COUNT as f32;
        let (sin, cos) = angle.to_radians().sin_cos();
        fires = fires.with_child(
            SceneNode::new(format!("Fire ({i})"))
                .tagged(SurfaceTag::Fire)
                .at(NodeTransform::at(STANDARD_FIRE_RING * sin, 0.0, STANDARD_FIRE_RING * cos)
                    .with_yaw(angle + 180.0))
                .with_fire(standard_fire()),
        );
    }

    let mut rocks = SceneNode::new("Rocks");
    for (i, (x, z)) in [(3.0, 2.0), (-4.0, -1.0), (1.0, -4.5)].into_iter().enumerate() {
        rocks = rocks.with_child(
            SceneNode::new(format!("Rock ({i})"))
                .tagged(SurfaceTag::Obstacle)
                .at(NodeTransform::at(x, 0.5, z))
                .with_collider(Shape::Sphere { radius: 0.6 }, ColliderKind::Solid),
        );
    }

    let root = SceneNode::new("FireArea")
        .with_child(
            SceneNode::new("Floor")
                .tagged(SurfaceTag::Floor)
                .at(NodeTransform::at(0.0, -0.05, 0.0))
                .with_collider(
                    Shape::Cuboid {
                        half_extents: Vec3::new(h, 0.05, h),
                    },
                    ColliderKind::Solid,
                ),
        )
        .with_child(wall("Boundary North", NodeTransform::at(0.0, 1.0, h)))
        .with_child(wall("Boundary South", NodeTransform::at(0.0, 1.0, -h)))
        .with_child(wall("Boundary East", NodeTransform::at(h, 1.0, 0.0).with_yaw(90.0)))
        .with_child(wall("Boundary West", NodeTransform::at(-h, 1.0, 0.0).with_yaw(90.0)))
        .with_child(fires)
        .with_child(rocks);

    Scene::new(root)
}
