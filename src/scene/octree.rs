use glam::Vec3;
use rustc_hash::FxHashSet;

use crate::math::{Aabb, Containment, Frustum, Sphere};
use crate::scene::NodeHandle;
use crate::settings::Settings;

/// Below this object count the tree is not worth its overhead and culling
/// falls back to a linear scan.
pub const OCTREE_MIN_OBJECTS: usize = 10;

/// Tuning parameters, read from `graphics.octree_*`.
#[derive(Debug, Clone, Copy)]
pub struct OctreeConfig {
    /// Maximum subdivision depth, clamped to `[1, 16]`.
    pub max_depth: u32,
    /// Leaf capacity before a subdivision is attempted.
    pub max_objects_per_node: usize,
}

impl OctreeConfig {
    pub const MAX_DEPTH_LIMIT: u32 = 16;

    #[must_use]
    pub fn new(max_depth: u32, max_objects_per_node: usize) -> Self {
        let clamped = max_depth.clamp(1, Self::MAX_DEPTH_LIMIT);
        if clamped != max_depth {
            log::warn!("octree: max_depth {max_depth} clamped to {clamped}");
        }
        Self {
            max_depth: clamped,
            max_objects_per_node: max_objects_per_node.max(1),
        }
    }

    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.get_int("graphics.octree_max_depth", 8) as u32,
            settings.get_int("graphics.octree_max_objects_per_node", 10) as usize,
        )
    }
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 8,
            max_objects_per_node: 10,
        }
    }
}

/// Hierarchical AABB index over scene objects.
///
/// The root is a cube enclosing the scene bounds; each node subdivides into
/// eight octants. An object is stored in the deepest node whose bounds fully
/// contain its AABB, so straddling objects stay in internal nodes and are
/// emitted exactly once per query (queries additionally dedup by handle).
///
/// Every object inside the tree is contained by its node's bounds, which is
/// what lets `query_frustum` take a fully-inside subtree without per-object
/// tests. Objects that stick out past the root cube (possible when the
/// caller supplies scene bounds smaller than the true union) never enter
/// the tree: they go to a side list that every query tests per object.
///
/// Rebuild is explicit, on scene-bounds change or on demand; object motion
/// does not restructure the tree.
pub struct Octree {
    root: OctreeNode,
    /// Objects not contained by the root cube; tested per object on every
    /// query so the node-level fast paths stay sound.
    oversized: Vec<(NodeHandle, Aabb)>,
    config: OctreeConfig,
    len: usize,
}

struct OctreeNode {
    bounds: Aabb,
    depth: u32,
    children: Option<Box<[OctreeNode; 8]>>,
    objects: Vec<(NodeHandle, Aabb)>,
}

impl Octree {
    /// Creates an empty tree whose root cube encloses `scene_bounds`.
    #[must_use]
    pub fn new(config: OctreeConfig, scene_bounds: Aabb) -> Self {
        Self {
            root: OctreeNode::new(cube_around(scene_bounds), 0),
            oversized: Vec::new(),
            config,
            len: 0,
        }
    }

    /// Builds a tree from a full object list; `O(n log n)` expected.
    #[must_use]
    pub fn build(config: OctreeConfig, scene_bounds: Aabb, objects: &[(NodeHandle, Aabb)]) -> Self {
        let mut tree = Self::new(config, scene_bounds);
        for (handle, aabb) in objects {
            tree.insert(*handle, *aabb);
        }
        tree
    }

    /// Inserts an object at the deepest node fully containing its bounds.
    ///
    /// Objects not contained by the root cube go to the always-tested side
    /// list instead, so no query ever loses them.
    pub fn insert(&mut self, handle: NodeHandle, aabb: Aabb) {
        if self.root.bounds.contains_aabb(&aabb) {
            self.root.insert(handle, aabb, &self.config);
        } else {
            self.oversized.push((handle, aabb));
        }
        self.len += 1;
    }

    /// Removes an object by handle. Returns `true` when it was present.
    pub fn remove(&mut self, handle: NodeHandle) -> bool {
        let removed = if let Some(pos) = self.oversized.iter().position(|(h, _)| *h == handle) {
            self.oversized.swap_remove(pos);
            true
        } else {
            self.root.remove(handle)
        };
        if removed {
            self.len -= 1;
        }
        removed
    }

    /// Drops every object, keeping the node structure's root bounds.
    pub fn clear(&mut self) {
        self.root = OctreeNode::new(self.root.bounds, 0);
        self.oversized.clear();
        self.len = 0;
    }

    /// Re-inserts everything into a fresh root enclosing `scene_bounds`.
    pub fn rebuild(&mut self, objects: &[(NodeHandle, Aabb)], scene_bounds: Aabb) {
        self.root = OctreeNode::new(cube_around(scene_bounds), 0);
        self.oversized.clear();
        self.len = 0;
        for (handle, aabb) in objects {
            self.insert(*handle, *aabb);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn root_bounds(&self) -> Aabb {
        self.root.bounds
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// All objects whose AABB is inside or intersecting the frustum.
    ///
    /// Outside nodes are pruned; fully inside subtrees are taken without
    /// further plane tests (sound because in-tree objects are contained by
    /// their node); intersecting nodes and the oversized side list test
    /// per object.
    #[must_use]
    pub fn query_frustum(&self, frustum: &Frustum) -> Vec<NodeHandle> {
        let mut seen = FxHashSet::default();
        let mut out = Vec::new();
        self.root.query_frustum(frustum, &mut seen, &mut out);
        for (handle, aabb) in &self.oversized {
            if frustum.test_aabb(aabb) != Containment::Outside && seen.insert(*handle) {
                out.push(*handle);
            }
        }
        out
    }

    /// All objects overlapping the given box.
    #[must_use]
    pub fn query_aabb(&self, min: Vec3, max: Vec3) -> Vec<NodeHandle> {
        let query = Aabb::new(min, max);
        let mut seen = FxHashSet::default();
        let mut out = Vec::new();
        self.root.query_aabb(&query, &mut seen, &mut out);
        for (handle, aabb) in &self.oversized {
            if aabb.intersects_aabb(&query) && seen.insert(*handle) {
                out.push(*handle);
            }
        }
        out
    }

    /// All objects overlapping the given sphere.
    #[must_use]
    pub fn query_sphere(&self, center: Vec3, radius: f32) -> Vec<NodeHandle> {
        let sphere = Sphere::new(center, radius);
        let mut seen = FxHashSet::default();
        let mut out = Vec::new();
        self.root.query_sphere(&sphere, &mut seen, &mut out);
        for (handle, aabb) in &self.oversized {
            if aabb.intersects_sphere(&sphere) && seen.insert(*handle) {
                out.push(*handle);
            }
        }
        out
    }
}

impl OctreeNode {
    fn new(bounds: Aabb, depth: u32) -> Self {
        Self {
            bounds,
            depth,
            children: None,
            objects: Vec::new(),
        }
    }

    /// Caller guarantees `aabb` is contained by `self.bounds`; descent
    /// only enters a child that fully contains it, so the invariant holds
    /// all the way down.
    fn insert(&mut self, handle: NodeHandle, aabb: Aabb, config: &OctreeConfig) {
        if let Some(children) = self.children.as_mut() {
            if let Some(index) = child_index_containing(children, &aabb) {
                children[index].insert(handle, aabb, config);
                return;
            }
            // Straddles multiple children: retained here.
            self.objects.push((handle, aabb));
            return;
        }

        self.objects.push((handle, aabb));

        if self.objects.len() > config.max_objects_per_node && self.depth < config.max_depth {
            self.subdivide(config);
        }
    }

    /// Splits a leaf into octants and pushes down objects that now fit a
    /// single child exclusively. Straddlers stay at this node.
    fn subdivide(&mut self, config: &OctreeConfig) {
        let center = self.bounds.center();
        let children: Box<[OctreeNode; 8]> = Box::new(std::array::from_fn(|i| {
            OctreeNode::new(octant_bounds(&self.bounds, center, i), self.depth + 1)
        }));
        self.children = Some(children);

        let children = self.children.as_mut().expect("children were just created");
        let mut retained = Vec::new();
        for (handle, aabb) in self.objects.drain(..) {
            if let Some(index) = child_index_containing(children, &aabb) {
                children[index].insert(handle, aabb, config);
            } else {
                retained.push((handle, aabb));
            }
        }
        self.objects = retained;
    }

    fn remove(&mut self, handle: NodeHandle) -> bool {
        if let Some(pos) = self.objects.iter().position(|(h, _)| *h == handle) {
            self.objects.swap_remove(pos);
            return true;
        }
        if let Some(children) = self.children.as_mut() {
            for child in children.iter_mut() {
                if child.remove(handle) {
                    return true;
                }
            }
        }
        false
    }

    fn query_frustum(
        &self,
        frustum: &Frustum,
        seen: &mut FxHashSet<NodeHandle>,
        out: &mut Vec<NodeHandle>,
    ) {
        match frustum.test_aabb(&self.bounds) {
            Containment::Outside => {}
            Containment::Inside => self.collect_all(seen, out),
            Containment::Intersect => {
                for (handle, aabb) in &self.objects {
                    if frustum.test_aabb(aabb) != Containment::Outside && seen.insert(*handle) {
                        out.push(*handle);
                    }
                }
                if let Some(children) = self.children.as_ref() {
                    for child in children.iter() {
                        child.query_frustum(frustum, seen, out);
                    }
                }
            }
        }
    }

    /// Emits the entire subtree without further plane tests.
    fn collect_all(&self, seen: &mut FxHashSet<NodeHandle>, out: &mut Vec<NodeHandle>) {
        for (handle, _) in &self.objects {
            if seen.insert(*handle) {
                out.push(*handle);
            }
        }
        if let Some(children) = self.children.as_ref() {
            for child in children.iter() {
                child.collect_all(seen, out);
            }
        }
    }

    fn query_aabb(&self, query: &Aabb, seen: &mut FxHashSet<NodeHandle>, out: &mut Vec<NodeHandle>) {
        if !self.bounds.intersects_aabb(query) {
            return;
        }
        for (handle, aabb) in &self.objects {
            if aabb.intersects_aabb(query) && seen.insert(*handle) {
                out.push(*handle);
            }
        }
        if let Some(children) = self.children.as_ref() {
            for child in children.iter() {
                child.query_aabb(query, seen, out);
            }
        }
    }

    fn query_sphere(
        &self,
        sphere: &Sphere,
        seen: &mut FxHashSet<NodeHandle>,
        out: &mut Vec<NodeHandle>,
    ) {
        if !self.bounds.intersects_sphere(sphere) {
            return;
        }
        for (handle, aabb) in &self.objects {
            if aabb.intersects_sphere(sphere) && seen.insert(*handle) {
                out.push(*handle);
            }
        }
        if let Some(children) = self.children.as_ref() {
            for child in children.iter() {
                child.query_sphere(sphere, seen, out);
            }
        }
    }
}

/// Index of the single child fully containing `aabb`, if any.
fn child_index_containing(children: &[OctreeNode; 8], aabb: &Aabb) -> Option<usize> {
    children
        .iter()
        .position(|child| child.bounds.contains_aabb(aabb))
}

/// The octant box for child `i`, with bit 0 = +x, bit 1 = +y, bit 2 = +z.
fn octant_bounds(parent: &Aabb, center: Vec3, i: usize) -> Aabb {
    let min = Vec3::new(
        if i & 1 == 0 { parent.min.x } else { center.x },
        if i & 2 == 0 { parent.min.y } else { center.y },
        if i & 4 == 0 { parent.min.z } else { center.z },
    );
    let max = Vec3::new(
        if i & 1 == 0 { center.x } else { parent.max.x },
        if i & 2 == 0 { center.y } else { parent.max.y },
        if i & 4 == 0 { center.z } else { parent.max.z },
    );
    Aabb::new(min, max)
}

/// Smallest cube centered on the bounds' center that encloses them.
fn cube_around(bounds: Aabb) -> Aabb {
    let center = bounds.center();
    let half = bounds.half_extent().max_element().max(0.5);
    Aabb::from_center_half_extent(center, Vec3::splat(half))
}
