//! Shadow View-Projection Tests
//!
//! Tests for the pure light VP builders:
//! - Directional: orthographic fit contains the whole scene bounds
//! - Spot: perspective along the light direction with 2x outer cone fov
//! - Point: six 90-degree faces covering their axes

use glam::{Mat4, Vec3, Vec4};

use lumen::math::Aabb;
use lumen::renderer::shadow::{
    directional_light_vp, point_light_face_vps, spot_light_vp, POINT_LIGHT_FACES,
};

/// Projects a world point; returns NDC (x, y in [-1,1], z in [0,1]).
fn project(vp: Mat4, p: Vec3) -> Vec3 {
    let clip = vp * Vec4::new(p.x, p.y, p.z, 1.0);
    Vec3::new(clip.x / clip.w, clip.y / clip.w, clip.z / clip.w)
}

fn in_clip_volume(ndc: Vec3) -> bool {
    ndc.x.abs() <= 1.001 && ndc.y.abs() <= 1.001 && (-0.001..=1.001).contains(&ndc.z)
}

// ============================================================================
// Directional
// ============================================================================

#[test]
fn directional_fit_contains_every_scene_bounds_corner() {
    let bounds = Aabb::new(Vec3::new(-8.0, 0.0, -12.0), Vec3::new(6.0, 10.0, 4.0));
    let directions = [
        Vec3::new(0.0, -1.0, 0.0),
        Vec3::new(1.0, -2.0, 0.5).normalize(),
        Vec3::new(-0.3, -1.0, -0.8).normalize(),
    ];

    for dir in directions {
        let vp = directional_light_vp(dir, &bounds);
        for corner in bounds.corners() {
            let ndc = project(vp, corner);
            assert!(
                in_clip_volume(ndc),
                "corner {corner} outside clip volume for dir {dir}: {ndc}"
            );
        }
    }
}

#[test]
fn directional_handles_straight_down_light() {
    // A vertical direction must not degenerate the view basis.
    let bounds = Aabb::new(Vec3::splat(-5.0), Vec3::splat(5.0));
    let vp = directional_light_vp(Vec3::NEG_Y, &bounds);
    let ndc = project(vp, Vec3::ZERO);
    assert!(in_clip_volume(ndc));
}

#[test]
fn directional_keeps_casters_between_volume_and_light() {
    let bounds = Aabb::new(Vec3::splat(-5.0), Vec3::splat(5.0));
    let vp = directional_light_vp(Vec3::NEG_Y, &bounds);

    // A caster above the bounds (towards the light) still lands in depth
    // range thanks to the near extension.
    let ndc = project(vp, Vec3::new(0.0, 9.0, 0.0));
    assert!(
        (-0.001..=1.001).contains(&ndc.z),
        "caster towards the light must not be clipped: z = {}",
        ndc.z
    );
}

// ============================================================================
// Spot
// ============================================================================

#[test]
fn spot_vp_centers_the_light_direction() {
    let position = Vec3::new(2.0, 5.0, 1.0);
    let direction = Vec3::new(0.0, -1.0, 0.2).normalize();
    let vp = spot_light_vp(position, direction, 0.5, 30.0);

    let ndc = project(vp, position + direction * 15.0);
    assert!(ndc.x.abs() < 1e-3 && ndc.y.abs() < 1e-3, "axis projects to center");
    assert!((0.0..=1.0).contains(&ndc.z));
}

#[test]
fn spot_vp_fov_matches_the_outer_cone() {
    let outer = 0.4f32;
    let vp = spot_light_vp(Vec3::ZERO, Vec3::NEG_Z, outer, 50.0);

    // A ray just inside the cone stays inside the clip volume.
    let inside = Vec3::new((outer * 0.95).tan() * 10.0, 0.0, -10.0);
    assert!(project(vp, inside).x.abs() < 1.0);

    // Just outside the cone falls off the clip volume.
    let outside = Vec3::new((outer * 1.1).tan() * 10.0, 0.0, -10.0);
    assert!(project(vp, outside).x.abs() > 1.0);
}

#[test]
fn spot_range_bounds_the_far_plane() {
    let vp = spot_light_vp(Vec3::ZERO, Vec3::NEG_Z, 0.5, 20.0);
    let inside = project(vp, Vec3::new(0.0, 0.0, -19.0));
    let beyond = project(vp, Vec3::new(0.0, 0.0, -25.0));
    assert!(inside.z <= 1.0);
    assert!(beyond.z > 1.0);
}

// ============================================================================
// Point
// ============================================================================

#[test]
fn point_light_builds_six_distinct_faces() {
    let vps = point_light_face_vps(Vec3::new(1.0, 2.0, 3.0), 25.0);
    assert_eq!(vps.len(), 6);
    for i in 0..6 {
        for j in (i + 1)..6 {
            assert_ne!(vps[i], vps[j], "faces {i} and {j} must differ");
        }
    }
}

#[test]
fn each_face_covers_its_axis() {
    let position = Vec3::new(1.0, 2.0, 3.0);
    let range = 25.0;
    let vps = point_light_face_vps(position, range);

    for (vp, (forward, _)) in vps.iter().zip(POINT_LIGHT_FACES) {
        let ndc = project(*vp, position + forward * (range * 0.5));
        assert!(
            ndc.x.abs() < 1e-3 && ndc.y.abs() < 1e-3,
            "face axis projects to its center"
        );
        assert!((0.0..=1.0).contains(&ndc.z));
    }
}

#[test]
fn face_fov_is_ninety_degrees() {
    let vps = point_light_face_vps(Vec3::ZERO, 100.0);
    // For the +X face, a point at 45 degrees (y == x distance) sits on the
    // clip edge.
    let edge = project(vps[0], Vec3::new(10.0, 9.99, 0.0));
    assert!(edge.y.abs() < 1.0);
    let past = project(vps[0], Vec3::new(10.0, 10.5, 0.0));
    assert!(past.y.abs() > 1.0);
}
