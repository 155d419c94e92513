//! Collection of fire units discovered from a scene
//!
//! The field owns its fires in registration order and keeps a lookup table
//! from interactive-region id back to the owning fire. Agents hold
//! [`FireIndex`] values rather than references, so a field can be rebuilt
//! without leaving dangling targets behind.

use rustc_hash::FxHashMap;
use tracing::{error, warn};

use super::unit::{FireRegion, FireUnit};
use crate::core_types::{Pose, Vec3};
use crate::error::FirefighterError;
use crate::physics::{ColliderId, SurfaceTag};
use crate::scene::{FireSpec, SceneNode};

/// Diameter of the area agents and fires share, used to normalize distances
pub const AREA_DIAMETER: f32 = 25.0;

/// Stable index of a fire inside its field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FireIndex(pub usize);

/// All fires of one arena
#[derive(Debug, Clone)]
pub struct FireField {
    center: Vec3,
    fires: Vec<FireUnit>,
    lookup: FxHashMap<ColliderId, FireIndex>,
    discovery_errors: Vec<FirefighterError>,
}

impl FireField {
    /// Build a field from already constructed fires.
    ///
    /// Fires whose interactive region id is already taken are reported and
    /// skipped, like during discovery.
    pub fn with_fires(center: Vec3, fires: impl IntoIterator<Item = FireUnit>) -> Self {
        let mut field = Self::empty(center);
        for fire in fires {
            field.register(fire);
        }
        field
    }

    /// Recursively scan `root` for nodes tagged `fire` and register their
    /// fire components.
    ///
    /// Untagged nodes are searched for descendants. A tagged node without a
    /// fire component is a configuration error: it is logged and recorded in
    /// [`FireField::discovery_errors`], and the scan carries on. Such a node
    /// is only descended into when it groups further tagged nodes.
    pub fn discover(root: &SceneNode) -> Self {
        let root_pose = root.transform.pose();
        let mut field = Self::empty(root_pose.translation.vector);
        field.find_child_fires(root, root_pose);
        field
    }

    fn empty(center: Vec3) -> Self {
        Self {
            center,
            fires: Vec::new(),
            lookup: FxHashMap::default(),
            discovery_errors: Vec::new(),
        }
    }

    fn find_child_fires(&mut self, parent: &SceneNode, parent_pose: Pose) {
        for child in &parent.children {
            let pose = parent_pose * child.transform.pose();
            if child.tag != SurfaceTag::Fire {
                self.find_child_fires(child, pose);
                continue;
            }
            match &child.fire {
                Some(spec) => {
                    let fire = build_fire(&child.name, spec, pose);
                    self.register(fire);
                }
                None if child.has_fire_descendant() => self.find_child_fires(child, pose),
                None => {
                    let err = FirefighterError::MissingFireComponent {
                        node: child.name.clone(),
                    };
                    error!("Fire discovery: {err}");
                    self.discovery_errors.push(err);
                }
            }
        }
    }

    fn register(&mut self, fire: FireUnit) {
        let region = fire.interactive_region().id;
        if self.lookup.contains_key(&region) {
            let err = FirefighterError::DuplicateRegion {
                region,
                node: fire.name().to_string(),
            };
            error!("Fire discovery: {err}");
            self.discovery_errors.push(err);
            return;
        }
        self.lookup.insert(region, FireIndex(self.fires.len()));
        self.fires.push(fire);
    }

    /// Reset every fire, in registration order
    pub fn reset_all(&mut self) {
        for fire in &mut self.fires {
            fire.reset();
        }
    }

    /// The fire that owns an interactive region
    ///
    /// # Errors
    /// [`FirefighterError::RegionNotFound`] if the region was never registered.
    pub fn lookup(&self, region: ColliderId) -> Result<FireIndex, FirefighterError> {
        self.lookup.get(&region).copied().ok_or_else(|| {
            let err = FirefighterError::RegionNotFound(region);
            warn!("Fire lookup: {err}");
            err
        })
    }

    pub fn get(&self, index: FireIndex) -> Option<&FireUnit> {
        self.fires.get(index.0)
    }

    pub fn get_mut(&mut self, index: FireIndex) -> Option<&mut FireUnit> {
        self.fires.get_mut(index.0)
    }

    /// Fires in registration order
    pub fn fires(&self) -> &[FireUnit] {
        &self.fires
    }

    /// Indexed fires in registration order
    pub fn iter(&self) -> impl Iterator<Item = (FireIndex, &FireUnit)> {
        self.fires.iter().enumerate().map(|(i, f)| (FireIndex(i), f))
    }

    pub fn len(&self) -> usize {
        self.fires.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fires.is_empty()
    }

    pub fn burning_count(&self) -> usize {
        self.fires.iter().filter(|f| f.is_burning()).count()
    }

    /// World position of the field's root placement
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Configuration errors met while building the field
    pub fn discovery_errors(&self) -> &[FirefighterError] {
        &self.discovery_errors
    }
}

fn build_fire(name: &str, spec: &FireSpec, placement: Pose) -> FireUnit {
    let mut fire = FireUnit::new(
        name,
        FireRegion::interactive(
            spec.interactive.id,
            spec.interactive.shape,
            spec.interactive.offset.pose(),
        ),
        FireRegion::solid(spec.solid.id, spec.solid.shape, spec.solid.offset.pose()),
    );
    fire.attach(placement);
    fire
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{standard_arena, standard_fire, NodeTransform, Scene, STANDARD_FIRE_COUNT};
    use approx::assert_relative_eq;

    fn fire_node(name: &str, x: f32) -> SceneNode {
        SceneNode::new(name)
            .tagged(SurfaceTag::Fire)
            .at(NodeTransform::at(x, 0.0, 0.0))
            .with_fire(standard_fire())
    }

    #[test]
    fn test_discover_standard_arena() {
        let scene = standard_arena();
        let field = FireField::discover(scene.root());
        assert_eq!(field.len(), STANDARD_FIRE_COUNT);
        assert!(field.discovery_errors().is_empty());
        assert_eq!(field.fires()[0].name(), "Fire (0)");

        for (index, fire) in field.iter() {
            assert_eq!(field.lookup(fire.interactive_region().id), Ok(index));
        }
    }

    #[test]
    fn test_nested_groups_compose_transforms() {
        let root = SceneNode::new("Area")
            .at(NodeTransform::at(10.0, 0.0, 0.0))
            .with_child(
                SceneNode::new("Group")
                    .at(NodeTransform::at(0.0, 0.0, 5.0))
                    .with_child(fire_node("Deep", 1.0)),
            );
        let field = FireField::discover(Scene::new(root).root());
        assert_eq!(field.len(), 1);
        assert_relative_eq!(field.center(), Vec3::new(10.0, 0.0, 0.0));
        assert_relative_eq!(
            field.fires()[0].position().unwrap(),
            Vec3::new(11.0, 0.0, 5.0)
        );
    }

    #[test]
    fn test_missing_component_is_reported_and_skipped() {
        let root = SceneNode::new("Area")
            .with_child(fire_node("A", 0.0))
            .with_child(SceneNode::new("Broken").tagged(SurfaceTag::Fire))
            .with_child(fire_node("B", 2.0));
        let field = FireField::discover(Scene::new(root).root());

        assert_eq!(field.len(), 2);
        assert_eq!(
            field.discovery_errors(),
            &[FirefighterError::MissingFireComponent {
                node: "Broken".to_string()
            }]
        );
    }

    #[test]
    fn test_tagged_group_without_component_is_searched() {
        let root = SceneNode::new("Area").with_child(
            SceneNode::new("Cluster")
                .tagged(SurfaceTag::Fire)
                .with_child(fire_node("Inner", 1.0)),
        );
        let field = FireField::discover(Scene::new(root).root());
        assert_eq!(field.len(), 1);
        assert!(field.discovery_errors().is_empty());
    }

    #[test]
    fn test_duplicate_region_is_rejected() {
        // Without Scene::new every id stays at its default, so they collide
        let root = SceneNode::new("Area")
            .with_child(fire_node("A", 0.0))
            .with_child(fire_node("B", 2.0));
        let field = FireField::discover(&root);
        assert_eq!(field.len(), 1);
        assert!(matches!(
            field.discovery_errors(),
            [FirefighterError::DuplicateRegion { .. }]
        ));
    }

    #[test]
    fn test_lookup_unknown_region() {
        let field = FireField::discover(standard_arena().root());
        assert_eq!(
            field.lookup(ColliderId(9999)),
            Err(FirefighterError::RegionNotFound(ColliderId(9999)))
        );
    }

    #[test]
    fn test_reset_all_relights_every_fire() {
        let mut field = FireField::discover(standard_arena().root());
        for i in 0..field.len() {
            field.get_mut(FireIndex(i)).unwrap().extinguish(1.0);
        }
        assert_eq!(field.burning_count(), 0);
        field.reset_all();
        assert_eq!(field.burning_count(), STANDARD_FIRE_COUNT);
        assert!(field.fires().iter().all(|f| f.health() == 1.0));
    }
}
