//! Loading arena layouts through serde
//!
//! Run with: cargo test --test `scene_layout`

mod common;

use approx::assert_relative_eq;
use firefighter_core::physics::SurfaceTag;
use firefighter_core::{FireField, FirefighterError, Scene, SceneNode};

const LAYOUT: &str = r#"{
    "name": "FireArea",
    "transform": { "position": [10.0, 0.0, 0.0] },
    "children": [
        {
            "name": "Floor",
            "tag": "floor",
            "transform": { "position": [0.0, -0.05, 0.0] },
            "collider": {
                "shape": { "type": "cuboid", "half_extents": [5.0, 0.05, 5.0] },
                "kind": "solid"
            }
        },
        {
            "name": "Fire A",
            "tag": "fire",
            "transform": { "position": [0.0, 0.0, 3.0], "yaw": 180.0 },
            "fire": {
                "interactive": {
                    "shape": { "type": "sphere", "radius": 0.35 },
                    "offset": { "position": [0.0, 0.5, 0.3] }
                },
                "solid": {
                    "shape": { "type": "cuboid", "half_extents": [0.35, 0.5, 0.2] },
                    "offset": { "position": [0.0, 0.5, 0.0] }
                }
            }
        },
        { "name": "Broken", "tag": "fire" }
    ]
}"#;

fn load() -> Scene {
    let root: SceneNode = serde_json::from_str(LAYOUT).expect("layout parses");
    Scene::new(root)
}

#[test]
fn test_layout_round_trips_through_discovery() {
    let scene = load();
    let field = FireField::discover(scene.root());

    assert_eq!(field.len(), 1);
    let fire = &field.fires()[0];
    assert_eq!(fire.name(), "Fire A");

    let position = fire.position().unwrap();
    assert_relative_eq!(position.x, 10.0, epsilon = 1e-5);
    assert_relative_eq!(position.z, 3.0, epsilon = 1e-5);

    // yawed half a turn: the fire faces back toward the area center
    let up = fire.up_vector().unwrap();
    assert_relative_eq!(up.z, -1.0, epsilon = 1e-5);
    let center = fire.center_position().unwrap();
    assert_relative_eq!(center.y, 0.5, epsilon = 1e-5);
    assert_relative_eq!(center.z, 2.7, epsilon = 1e-5);
}

#[test]
fn test_missing_fire_component_is_reported() {
    let field = FireField::discover(load().root());
    assert_eq!(
        field.discovery_errors(),
        &[FirefighterError::MissingFireComponent {
            node: "Broken".to_string()
        }]
    );
}

#[test]
fn test_world_contains_floor_and_fire_regions() {
    let scene = load();
    let field = FireField::discover(scene.root());
    let world = scene.build_world(&field);

    let tags: Vec<_> = world.colliders().iter().map(|c| c.tag).collect();
    assert!(tags.contains(&SurfaceTag::Floor));
    assert!(tags.contains(&SurfaceTag::FireRegion));
    assert!(tags.contains(&SurfaceTag::FireSolid));

    let region = field.fires()[0].interactive_region().id;
    assert_eq!(field.lookup(region), Ok(firefighter_core::FireIndex(0)));
}
