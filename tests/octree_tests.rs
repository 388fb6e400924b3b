//! Octree Tests
//!
//! Tests for:
//! - Insertion, subdivision and straddler retention
//! - Removal and clearing
//! - Frustum/AABB/sphere queries with deduplication
//! - The octree-equals-linear-cull property over randomized camera poses

use glam::{Mat4, Vec3};
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

use lumen::math::{Aabb, Containment, Frustum};
use lumen::scene::{NodeHandle, Octree, OctreeConfig, Scene};

/// Allocates real node handles so queries return comparable identities.
fn make_handles(scene: &mut Scene, count: usize) -> Vec<NodeHandle> {
    (0..count).map(|_| scene.create_node()).collect()
}

fn unit_cube_at(center: Vec3) -> Aabb {
    Aabb::from_center_half_extent(center, Vec3::splat(0.5))
}

/// 50 unit cubes on a 5x5x2 grid spanning x,y in [-4,4], z in [-5,5].
fn grid_objects(scene: &mut Scene) -> Vec<(NodeHandle, Aabb)> {
    let handles = make_handles(scene, 50);
    let mut objects = Vec::with_capacity(50);
    let mut i = 0;
    for zi in 0..2 {
        for yi in 0..5 {
            for xi in 0..5 {
                let center = Vec3::new(
                    -4.0 + 2.0 * xi as f32,
                    -4.0 + 2.0 * yi as f32,
                    -5.0 + 10.0 * zi as f32,
                );
                objects.push((handles[i], unit_cube_at(center)));
                i += 1;
            }
        }
    }
    objects
}

// ============================================================================
// Structure
// ============================================================================

#[test]
fn build_holds_every_object() {
    let mut scene = Scene::new();
    let objects = grid_objects(&mut scene);
    let bounds = Aabb::new(Vec3::splat(-6.0), Vec3::splat(6.0));

    let octree = Octree::build(OctreeConfig::default(), bounds, &objects);
    assert_eq!(octree.len(), 50);
}

#[test]
fn query_with_huge_box_returns_everything_once() {
    let mut scene = Scene::new();
    let objects = grid_objects(&mut scene);
    let bounds = Aabb::new(Vec3::splat(-6.0), Vec3::splat(6.0));
    // Tiny capacity forces deep subdivision and plenty of straddlers.
    let octree = Octree::build(OctreeConfig::new(8, 2), bounds, &objects);

    let mut result = octree.query_aabb(Vec3::splat(-100.0), Vec3::splat(100.0));
    assert_eq!(result.len(), 50, "every object exactly once");
    result.sort();
    result.dedup();
    assert_eq!(result.len(), 50, "no duplicate handles");
}

#[test]
fn remove_and_clear() {
    let mut scene = Scene::new();
    let objects = grid_objects(&mut scene);
    let bounds = Aabb::new(Vec3::splat(-6.0), Vec3::splat(6.0));
    let mut octree = Octree::build(OctreeConfig::default(), bounds, &objects);

    assert!(octree.remove(objects[7].0));
    assert!(!octree.remove(objects[7].0), "second removal is a no-op");
    assert_eq!(octree.len(), 49);

    octree.clear();
    assert!(octree.is_empty());
    assert!(octree.query_aabb(Vec3::splat(-10.0), Vec3::splat(10.0)).is_empty());
}

#[test]
fn object_outside_root_bounds_is_still_returned() {
    let mut scene = Scene::new();
    let handle = scene.create_node();
    let bounds = Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0));
    let mut octree = Octree::new(OctreeConfig::default(), bounds);

    octree.insert(handle, unit_cube_at(Vec3::new(50.0, 0.0, 0.0)));
    let result = octree.query_aabb(Vec3::splat(40.0), Vec3::splat(60.0));
    assert_eq!(result, vec![handle]);

    assert!(octree.remove(handle));
    assert!(octree.is_empty());
}

#[test]
fn undersized_root_bounds_do_not_leak_outside_objects() {
    // The caller-supplied bounds cover only the first object; the second
    // sticks out past the root cube. A frustum that swallows the whole
    // root cube must not drag the far object in with it.
    let mut scene = Scene::new();
    let near = scene.create_node();
    let far = scene.create_node();

    let bounds = Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0));
    let objects = [
        (near, unit_cube_at(Vec3::ZERO)),
        (far, unit_cube_at(Vec3::new(50.0, 0.0, 0.0))),
    ];
    let octree = Octree::build(OctreeConfig::default(), bounds, &objects);

    // Camera at (0,0,5) looking down -Z: the root cube is fully inside,
    // the object at x=50 is far outside the side planes.
    let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
    let proj = Mat4::perspective_rh(60.0_f32.to_radians(), 1.0, 0.1, 100.0);
    let frustum = Frustum::from_matrix(proj * view);
    assert_eq!(
        frustum.test_aabb(&bounds),
        Containment::Inside,
        "scenario sanity: the root cube must be fully inside"
    );

    let mut from_tree = octree.query_frustum(&frustum);
    let mut linear: Vec<NodeHandle> = objects
        .iter()
        .filter(|(_, aabb)| frustum.test_aabb(aabb) != Containment::Outside)
        .map(|(h, _)| *h)
        .collect();
    from_tree.sort();
    linear.sort();

    assert_eq!(from_tree, vec![near]);
    assert_eq!(from_tree, linear);
}

#[test]
fn max_depth_is_clamped() {
    let config = OctreeConfig::new(99, 4);
    assert_eq!(config.max_depth, OctreeConfig::MAX_DEPTH_LIMIT);
    let config = OctreeConfig::new(0, 4);
    assert_eq!(config.max_depth, 1);
}

// ============================================================================
// Sphere and box queries
// ============================================================================

#[test]
fn sphere_query_matches_brute_force() {
    let mut scene = Scene::new();
    let objects = grid_objects(&mut scene);
    let bounds = Aabb::new(Vec3::splat(-6.0), Vec3::splat(6.0));
    let octree = Octree::build(OctreeConfig::new(8, 4), bounds, &objects);

    let center = Vec3::new(1.0, -2.0, -4.0);
    let radius = 3.0;

    let mut from_tree = octree.query_sphere(center, radius);
    let mut brute: Vec<NodeHandle> = objects
        .iter()
        .filter(|(_, aabb)| aabb.intersects_sphere(&lumen::math::Sphere::new(center, radius)))
        .map(|(h, _)| *h)
        .collect();

    from_tree.sort();
    brute.sort();
    assert_eq!(from_tree, brute);
}

// ============================================================================
// Octree equals linear cull
// ============================================================================

fn random_pose_frustum(rng: &mut StdRng) -> Frustum {
    let eye = Vec3::new(
        rng.random_range(-15.0..15.0),
        rng.random_range(-15.0..15.0),
        rng.random_range(-15.0..15.0),
    );
    let mut target = Vec3::new(
        rng.random_range(-4.0..4.0),
        rng.random_range(-4.0..4.0),
        rng.random_range(-5.0..5.0),
    );
    if (target - eye).length_squared() < 1e-3 {
        target.z += 1.0;
    }
    let view = Mat4::look_at_rh(eye, target, Vec3::Y);
    let proj = Mat4::perspective_rh(60.0_f32.to_radians(), 16.0 / 9.0, 0.1, 100.0);
    Frustum::from_matrix(proj * view)
}

#[test]
fn octree_query_equals_linear_cull_for_random_poses() {
    let mut scene = Scene::new();
    let objects = grid_objects(&mut scene);
    let bounds = Aabb::new(Vec3::splat(-6.0), Vec3::splat(6.0));
    let octree = Octree::build(OctreeConfig::new(8, 4), bounds, &objects);

    let mut rng = StdRng::seed_from_u64(20);
    for pose in 0..20 {
        let frustum = random_pose_frustum(&mut rng);

        let mut from_tree = octree.query_frustum(&frustum);
        let mut linear: Vec<NodeHandle> = objects
            .iter()
            .filter(|(_, aabb)| frustum.test_aabb(aabb) != Containment::Outside)
            .map(|(h, _)| *h)
            .collect();

        from_tree.sort();
        linear.sort();
        assert_eq!(from_tree, linear, "pose {pose}: octree and linear cull disagree");
    }
}

#[test]
fn every_returned_object_intersects_and_every_skipped_is_outside() {
    let mut scene = Scene::new();
    let objects = grid_objects(&mut scene);
    let bounds = Aabb::new(Vec3::splat(-6.0), Vec3::splat(6.0));
    let octree = Octree::build(OctreeConfig::default(), bounds, &objects);

    let mut rng = StdRng::seed_from_u64(7);
    let frustum = random_pose_frustum(&mut rng);
    let returned = octree.query_frustum(&frustum);

    for (handle, aabb) in &objects {
        let containment = frustum.test_aabb(aabb);
        if returned.contains(handle) {
            assert_ne!(containment, Containment::Outside);
        } else {
            assert_eq!(containment, Containment::Outside);
        }
    }
}
