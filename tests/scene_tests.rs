//! Scene Graph Tests
//!
//! Tests for:
//! - Hierarchy transform propagation and dirty checking
//! - Lazy world-bounds derivation and invalidation
//! - Component management and subtree removal
//! - Scripts running inside `Scene::update`
//! - Octree-backed culling through `compute_visible_set`

use glam::{Quat, Vec3};

use lumen::math::Aabb;
use lumen::renderer::{compute_visible_set, GraphicsOptions};
use lumen::resources::{Material, Mesh, Model};
use lumen::scene::{Camera, NodeHandle, OctreeConfig, Scene, SceneManager, Script};

const EPSILON: f32 = 1e-4;

fn approx_vec(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < EPSILON
}

fn unit_cube_model() -> Model {
    Model::from_meshes("Cube", vec![Mesh::unit_cube(Material::default())])
}

fn add_cube(scene: &mut Scene, position: Vec3) -> NodeHandle {
    let node = scene.create_node();
    scene.nodes[node].transform.set_position(position);
    scene.set_model(node, unit_cube_model());
    node
}

fn add_camera_at_z5(scene: &mut Scene) {
    let node = scene.create_node_with_name("MainCamera");
    scene.nodes[node].transform.set_position(Vec3::new(0.0, 0.0, 5.0));
    scene.set_camera(node, Camera::perspective(60.0, 16.0 / 9.0, 0.1, 100.0));
    scene.active_camera = Some(node);
}

// ============================================================================
// Transforms
// ============================================================================

#[test]
fn world_matrix_chains_parent_to_child() {
    let mut scene = Scene::new();
    let parent = scene.create_node();
    let child = scene.create_node();
    scene.attach(parent, child);

    scene.nodes[parent].transform.set_position(Vec3::new(10.0, 0.0, 0.0));
    scene.nodes[child].transform.set_position(Vec3::new(0.0, 5.0, 0.0));
    scene.update(0.0);

    let world = scene.nodes[child].transform.world_position();
    assert!(approx_vec(world, Vec3::new(10.0, 5.0, 0.0)));
}

#[test]
fn moving_the_parent_moves_the_subtree() {
    let mut scene = Scene::new();
    let parent = scene.create_node();
    let child = scene.create_node();
    scene.attach(parent, child);
    scene.update(0.0);

    scene.nodes[parent].transform.set_position(Vec3::new(0.0, 0.0, -3.0));
    scene.update(0.0);

    let world = scene.nodes[child].transform.world_position();
    assert!(approx_vec(world, Vec3::new(0.0, 0.0, -3.0)));
}

#[test]
fn rotation_affects_child_positions() {
    let mut scene = Scene::new();
    let parent = scene.create_node();
    let child = scene.create_node();
    scene.attach(parent, child);

    scene.nodes[parent]
        .transform
        .set_rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));
    scene.nodes[child].transform.set_position(Vec3::new(1.0, 0.0, 0.0));
    scene.update(0.0);

    // +X rotates to -Z under a +90 degree yaw.
    let world = scene.nodes[child].transform.world_position();
    assert!(approx_vec(world, Vec3::new(0.0, 0.0, -1.0)));
}

// ============================================================================
// Bounds
// ============================================================================

#[test]
fn world_bounds_follow_the_transform() {
    let mut scene = Scene::new();
    let node = add_cube(&mut scene, Vec3::new(3.0, 0.0, 0.0));
    scene.update(0.0);

    let aabb = scene.world_aabb(node).expect("cube has bounds");
    assert!(approx_vec(aabb.center(), Vec3::new(3.0, 0.0, 0.0)));
    assert!(approx_vec(aabb.size(), Vec3::ONE));
}

#[test]
fn scaled_bounds_grow_with_the_node() {
    let mut scene = Scene::new();
    let node = add_cube(&mut scene, Vec3::ZERO);
    scene.nodes[node].transform.set_scale(Vec3::splat(4.0));
    scene.update(0.0);

    let aabb = scene.world_aabb(node).expect("cube has bounds");
    assert!(approx_vec(aabb.size(), Vec3::splat(4.0)));
}

#[test]
fn bounds_invalidate_when_the_model_changes() {
    let mut scene = Scene::new();
    let node = add_cube(&mut scene, Vec3::ZERO);
    scene.update(0.0);
    assert!(approx_vec(scene.world_aabb(node).unwrap().size(), Vec3::ONE));

    // Swap in a bigger model; the cached bounds must not survive.
    let mut big = Mesh::unit_cube(Material::default());
    for p in &mut big.positions {
        *p *= 10.0;
    }
    scene.set_model(node, Model::from_meshes("Big", vec![big]));
    scene.update(0.0);

    assert!(approx_vec(scene.world_aabb(node).unwrap().size(), Vec3::splat(10.0)));
}

#[test]
fn scene_bounds_union_all_objects() {
    let mut scene = Scene::new();
    add_cube(&mut scene, Vec3::new(-5.0, 0.0, 0.0));
    add_cube(&mut scene, Vec3::new(5.0, 0.0, 0.0));
    scene.update(0.0);

    let bounds = scene.compute_scene_bounds().expect("non-empty scene");
    assert!(approx_vec(bounds.min, Vec3::new(-5.5, -0.5, -0.5)));
    assert!(approx_vec(bounds.max, Vec3::new(5.5, 0.5, 0.5)));
}

// ============================================================================
// Components and removal
// ============================================================================

#[test]
fn remove_node_cascades_to_children_and_components() {
    let mut scene = Scene::new();
    let parent = add_cube(&mut scene, Vec3::ZERO);
    let child = add_cube(&mut scene, Vec3::ONE);
    scene.attach(parent, child);
    assert_eq!(scene.object_count(), 2);

    scene.remove_node(parent);
    assert_eq!(scene.object_count(), 0);
    assert!(scene.nodes.get(child).is_none());
    assert!(scene.world_aabb(child).is_none());
}

#[test]
fn removing_the_active_camera_clears_it() {
    let mut scene = Scene::new();
    add_camera_at_z5(&mut scene);
    let camera_node = scene.active_camera.unwrap();

    scene.remove_node(camera_node);
    assert!(scene.active_camera.is_none());
    assert!(scene.active_camera().is_none());
}

#[test]
fn active_camera_view_tracks_its_node() {
    let mut scene = Scene::new();
    add_camera_at_z5(&mut scene);
    scene.update(0.0);

    let camera = scene.active_camera().expect("camera is active");
    let rc = camera.extract_render_camera();
    assert!(approx_vec(rc.position, Vec3::new(0.0, 0.0, 5.0)));
}

// ============================================================================
// Scene lifecycle
// ============================================================================

#[test]
fn first_inserted_scene_becomes_active() {
    let mut manager = SceneManager::new();
    assert!(manager.active().is_none());

    let first = manager.insert(Scene::new());
    let second = manager.insert(Scene::new());
    assert_eq!(manager.active_handle(), Some(first));
    assert_eq!(manager.len(), 2);

    assert!(manager.activate(second));
    assert_eq!(manager.active_handle(), Some(second));
}

#[test]
fn removing_the_active_scene_falls_back_to_the_newest_survivor() {
    let mut manager = SceneManager::new();
    let first = manager.insert(Scene::new());
    let second = manager.insert(Scene::new());
    let third = manager.insert(Scene::new());
    assert!(manager.activate(third));

    let removed = manager.remove(third);
    assert!(removed.is_some(), "remove hands the scene back");
    assert_eq!(manager.active_handle(), Some(second));

    assert!(manager.remove(second).is_some());
    assert!(manager.remove(first).is_some());
    assert!(manager.active().is_none());
    assert!(manager.is_empty());
}

#[test]
fn stale_handles_cannot_be_activated() {
    let mut manager = SceneManager::new();
    let first = manager.insert(Scene::new());
    let second = manager.insert(Scene::new());

    assert!(manager.remove(second).is_some());
    assert!(!manager.activate(second));
    assert_eq!(manager.active_handle(), Some(first));
}

#[test]
fn insert_active_switches_immediately() {
    let mut manager = SceneManager::new();
    let background = manager.insert(Scene::new());

    manager.insert_active();
    assert_ne!(manager.active_handle(), Some(background));
    assert_eq!(manager.handles().count(), 2);
}

// ============================================================================
// Scripts
// ============================================================================

struct Spinner {
    speed: f32,
}

impl Script for Spinner {
    fn update(&mut self, node: lumen::scene::NodeHandle, scene: &mut Scene, dt: f32) {
        if let Some(n) = scene.nodes.get_mut(node) {
            n.transform.translate(Vec3::new(self.speed * dt, 0.0, 0.0));
        }
    }
}

#[test]
fn scripts_run_before_the_transform_pass() {
    let mut scene = Scene::new();
    let node = add_cube(&mut scene, Vec3::ZERO);
    scene.add_script(node, Box::new(Spinner { speed: 2.0 }));

    scene.update(0.5);

    // The script moved the node and the same update pass rebuilt the
    // world matrix and bounds.
    assert!(approx_vec(
        scene.nodes[node].transform.world_position(),
        Vec3::new(1.0, 0.0, 0.0)
    ));
    assert!(approx_vec(
        scene.world_aabb(node).unwrap().center(),
        Vec3::new(1.0, 0.0, 0.0)
    ));
}

// ============================================================================
// Culling through the scene
// ============================================================================

/// 50 cubes on the 5x5x2 grid from the octree comparison scenario.
fn populate_grid(scene: &mut Scene) {
    for zi in 0..2 {
        for yi in 0..5 {
            for xi in 0..5 {
                add_cube(
                    scene,
                    Vec3::new(
                        -4.0 + 2.0 * xi as f32,
                        -4.0 + 2.0 * yi as f32,
                        -5.0 + 10.0 * zi as f32,
                    ),
                );
            }
        }
    }
}

#[test]
fn visible_set_matches_the_cull_scenario() {
    let mut scene = Scene::new();
    add_camera_at_z5(&mut scene);
    let visible_cube = add_cube(&mut scene, Vec3::ZERO);
    let right_cube = add_cube(&mut scene, Vec3::new(100.0, 0.0, 0.0));
    let far_cube = add_cube(&mut scene, Vec3::new(0.0, 0.0, -200.0));
    scene.update(0.0);

    let frustum = *scene.active_camera().unwrap().frustum();
    let (visible, stats) = compute_visible_set(&scene, &frustum, &GraphicsOptions::default());

    assert_eq!(visible, vec![visible_cube]);
    assert!(!visible.contains(&right_cube));
    assert!(!visible.contains(&far_cube));
    assert_eq!(stats.total, 3);
    assert_eq!(stats.visible, 1);
}

#[test]
fn octree_and_linear_paths_agree_through_the_scene() {
    let mut scene = Scene::new();
    add_camera_at_z5(&mut scene);
    populate_grid(&mut scene);
    scene.update(0.0);
    scene.rebuild_octree(OctreeConfig::default());
    assert!(scene.octree().is_some());

    let frustum = *scene.active_camera().unwrap().frustum();

    let octree_options = GraphicsOptions::default();
    let linear_options = GraphicsOptions {
        octree_enabled: false,
        ..GraphicsOptions::default()
    };

    let (mut with_tree, _) = compute_visible_set(&scene, &frustum, &octree_options);
    let (mut linear, _) = compute_visible_set(&scene, &frustum, &linear_options);
    with_tree.sort();
    linear.sort();

    assert!(!linear.is_empty(), "the camera should see part of the grid");
    assert_eq!(with_tree, linear);
}

#[test]
fn small_scenes_bypass_the_octree() {
    let mut scene = Scene::new();
    add_camera_at_z5(&mut scene);
    for i in 0..5 {
        add_cube(&mut scene, Vec3::new(i as f32, 0.0, 0.0));
    }
    scene.update(0.0);
    scene.rebuild_octree(OctreeConfig::default());

    let frustum = *scene.active_camera().unwrap().frustum();
    let octree_options = GraphicsOptions::default();
    let linear_options = GraphicsOptions {
        octree_enabled: false,
        ..GraphicsOptions::default()
    };

    // Below the worthwhile threshold the two paths are the same scan.
    let (mut a, _) = compute_visible_set(&scene, &frustum, &octree_options);
    let (mut b, _) = compute_visible_set(&scene, &frustum, &linear_options);
    a.sort();
    b.sort();
    assert_eq!(a, b);
}

#[test]
fn invisible_nodes_are_excluded_from_the_visible_set() {
    let mut scene = Scene::new();
    add_camera_at_z5(&mut scene);
    let node = add_cube(&mut scene, Vec3::ZERO);
    scene.update(0.0);
    scene.nodes[node].visible = false;

    let frustum = *scene.active_camera().unwrap().frustum();
    let (visible, _) = compute_visible_set(&scene, &frustum, &GraphicsOptions::default());
    assert!(visible.is_empty());
}

#[test]
fn frustum_culling_disabled_returns_everything() {
    let mut scene = Scene::new();
    add_camera_at_z5(&mut scene);
    add_cube(&mut scene, Vec3::new(1000.0, 0.0, 0.0));
    scene.update(0.0);

    let frustum = *scene.active_camera().unwrap().frustum();
    let options = GraphicsOptions {
        frustum_culling_enabled: false,
        ..GraphicsOptions::default()
    };
    let (visible, stats) = compute_visible_set(&scene, &frustum, &options);
    assert_eq!(visible.len(), 1);
    assert_eq!(stats.visible, 1);
}

// ============================================================================
// Octree rebuild via scene bounds
// ============================================================================

#[test]
fn explicit_scene_bounds_shape_the_octree_root() {
    let mut scene = Scene::new();
    populate_grid(&mut scene);
    scene.update(0.0);
    scene.scene_bounds = Some(Aabb::new(Vec3::splat(-20.0), Vec3::splat(20.0)));
    scene.rebuild_octree(OctreeConfig::default());

    let root = scene.octree().unwrap().root_bounds();
    assert!(root.contains_aabb(&Aabb::new(Vec3::splat(-20.0), Vec3::splat(20.0))));
    assert_eq!(scene.octree().unwrap().len(), 50);
}
