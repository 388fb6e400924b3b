use glam::Affine3A;
use slotmap::{SecondaryMap, SlotMap, SparseSecondaryMap};

use crate::math::Aabb;
use crate::particles::ParticleSystem;
use crate::resources::Model;
use crate::scene::node::Node;
use crate::scene::octree::{Octree, OctreeConfig};
use crate::scene::script::Script;
use crate::scene::{Camera, CameraKey, Light, LightKey, ModelKey, NodeHandle};
use crate::text::{Text2d, Text3d};
use crate::ui::UiManager;

/// Container for all scene objects and components.
///
/// Mutation is restricted to the main thread during `update`; rendering
/// reads the scene immutably. Exactly one camera is active while rendering.
pub struct Scene {
    // === Core node storage ===
    pub nodes: SlotMap<NodeHandle, Node>,
    pub root_nodes: Vec<NodeHandle>,

    // === Components ===
    pub names: SecondaryMap<NodeHandle, String>,
    pub models: SecondaryMap<NodeHandle, ModelKey>,
    pub cameras: SparseSecondaryMap<NodeHandle, CameraKey>,
    pub lights: SparseSecondaryMap<NodeHandle, LightKey>,
    scripts: SparseSecondaryMap<NodeHandle, Vec<Box<dyn Script>>>,

    // === Resource pools ===
    pub model_pool: SlotMap<ModelKey, Model>,
    pub camera_pool: SlotMap<CameraKey, Camera>,
    pub light_pool: SlotMap<LightKey, Light>,

    // === Derived spatial data ===
    /// Cached world-space bounds for nodes with models. Invalidated when
    /// the transform or the model changes; refreshed in [`Scene::update`].
    bounds: SecondaryMap<NodeHandle, Aabb>,
    /// Explicit scene bounds; the octree root cube encloses these.
    pub scene_bounds: Option<Aabb>,
    octree: Option<Octree>,

    // === Optional subsystems ===
    pub particles: Option<ParticleSystem>,
    pub ui: Option<UiManager>,
    /// World-space text entities, drawn after the main lit pass.
    pub texts3d: Vec<Text3d>,
    /// Window-space text entities, drawn in the UI stage.
    pub texts2d: Vec<Text2d>,

    pub active_camera: Option<NodeHandle>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            root_nodes: Vec::new(),

            names: SecondaryMap::new(),
            models: SecondaryMap::new(),
            cameras: SparseSecondaryMap::new(),
            lights: SparseSecondaryMap::new(),
            scripts: SparseSecondaryMap::new(),

            model_pool: SlotMap::with_key(),
            camera_pool: SlotMap::with_key(),
            light_pool: SlotMap::with_key(),

            bounds: SecondaryMap::new(),
            scene_bounds: None,
            octree: None,

            particles: None,
            ui: None,
            texts3d: Vec::new(),
            texts2d: Vec::new(),

            active_camera: None,
        }
    }

    // ========================================================================
    // Node management
    // ========================================================================

    /// Creates a new root node and returns its handle.
    pub fn create_node(&mut self) -> NodeHandle {
        let handle = self.nodes.insert(Node::new());
        self.root_nodes.push(handle);
        handle
    }

    pub fn create_node_with_name(&mut self, name: &str) -> NodeHandle {
        let handle = self.create_node();
        self.names.insert(handle, name.to_string());
        handle
    }

    /// Re-parents `child` under `parent`, keeping both sides in sync.
    pub fn attach(&mut self, parent: NodeHandle, child: NodeHandle) {
        if parent == child || !self.nodes.contains_key(parent) || !self.nodes.contains_key(child) {
            log::error!("scene: invalid attach request");
            return;
        }

        self.detach_from_current_parent(child);
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
    }

    fn detach_from_current_parent(&mut self, child: NodeHandle) {
        match self.nodes[child].parent.take() {
            Some(old_parent) => {
                if let Some(node) = self.nodes.get_mut(old_parent) {
                    node.children.retain(|c| *c != child);
                }
            }
            None => self.root_nodes.retain(|c| *c != child),
        }
    }

    /// Removes a node and its entire subtree, including components.
    pub fn remove_node(&mut self, handle: NodeHandle) {
        if !self.nodes.contains_key(handle) {
            return;
        }
        self.detach_from_current_parent(handle);

        let mut stack = vec![handle];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(current) {
                stack.extend(node.children.iter().copied());
            }
            self.names.remove(current);
            self.models.remove(current);
            self.cameras.remove(current);
            self.lights.remove(current);
            self.scripts.remove(current);
            self.bounds.remove(current);
            if self.active_camera == Some(current) {
                self.active_camera = None;
            }
        }
    }

    // ========================================================================
    // Components
    // ========================================================================

    /// Adds a model to the pool and assigns it to `node`.
    pub fn set_model(&mut self, node: NodeHandle, model: Model) -> ModelKey {
        let key = self.model_pool.insert(model);
        self.models.insert(node, key);
        self.bounds.remove(node);
        key
    }

    /// Assigns an already pooled model to `node`.
    pub fn set_model_key(&mut self, node: NodeHandle, key: ModelKey) {
        self.models.insert(node, key);
        self.bounds.remove(node);
    }

    pub fn set_camera(&mut self, node: NodeHandle, camera: Camera) -> CameraKey {
        let key = self.camera_pool.insert(camera);
        self.cameras.insert(node, key);
        key
    }

    pub fn set_light(&mut self, node: NodeHandle, light: Light) -> LightKey {
        let key = self.light_pool.insert(light);
        self.lights.insert(node, key);
        key
    }

    pub fn add_script(&mut self, node: NodeHandle, script: Box<dyn Script>) {
        if let Some(entry) = self.scripts.entry(node) {
            entry.or_default().push(script);
        }
    }

    /// Drops the cached world bounds of `node`, forcing recomputation after
    /// external model mutation.
    pub fn invalidate_bounds(&mut self, node: NodeHandle) {
        self.bounds.remove(node);
    }

    /// Number of renderable objects (nodes with a model).
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.models.len()
    }

    // ========================================================================
    // Per-frame update
    // ========================================================================

    /// Runs scripts, advances particle emitters, then updates the transform
    /// hierarchy and the cached world bounds.
    pub fn update(&mut self, dt: f32) {
        self.run_scripts(dt);

        if let Some(particles) = self.particles.as_mut() {
            particles.update(dt);
        }

        let changed = self.update_transforms();
        self.refresh_bounds(&changed);
        self.update_camera_views();
    }

    fn run_scripts(&mut self, dt: f32) {
        let mut taken = std::mem::take(&mut self.scripts);
        for (handle, scripts) in &mut taken {
            for script in scripts.iter_mut() {
                script.update(handle, self, dt);
            }
        }
        // Scripts added during the run land in self.scripts; merge them in.
        for (handle, added) in std::mem::take(&mut self.scripts) {
            if let Some(entry) = taken.entry(handle) {
                entry.or_default().extend(added);
            }
        }
        self.scripts = taken;
    }

    /// Walks the hierarchy parent-before-child, rebuilding dirty matrices.
    /// Returns the handles whose world matrix changed.
    pub fn update_transforms(&mut self) -> Vec<NodeHandle> {
        let mut changed = Vec::new();
        let mut stack: Vec<(NodeHandle, Affine3A, bool)> = self
            .root_nodes
            .iter()
            .map(|h| (*h, Affine3A::IDENTITY, false))
            .collect();

        while let Some((handle, parent_world, parent_changed)) = stack.pop() {
            let Some(node) = self.nodes.get_mut(handle) else {
                continue;
            };
            let local_changed = node.transform.refresh_local();
            let node_changed = local_changed || parent_changed;
            if node_changed {
                node.transform.world_matrix = parent_world * node.transform.local_matrix;
                changed.push(handle);
            }
            let world = node.transform.world_matrix;
            for child in node.children.clone() {
                stack.push((child, world, node_changed));
            }
        }
        changed
    }

    fn refresh_bounds(&mut self, changed: &[NodeHandle]) {
        for &handle in changed {
            if self.models.contains_key(handle) {
                self.recompute_bounds(handle);
            }
        }
        // Newly added models have no cache entry yet.
        let missing: Vec<NodeHandle> = self
            .models
            .keys()
            .filter(|h| !self.bounds.contains_key(*h))
            .collect();
        for handle in missing {
            self.recompute_bounds(handle);
        }
    }

    fn recompute_bounds(&mut self, handle: NodeHandle) {
        let Some(node) = self.nodes.get(handle) else {
            return;
        };
        let Some(model) = self.models.get(handle).and_then(|k| self.model_pool.get(*k)) else {
            return;
        };
        self.bounds
            .insert(handle, model.world_aabb(node.transform.world_matrix()));
    }

    fn update_camera_views(&mut self) {
        for (node, cam_key) in &self.cameras {
            let world = *self.nodes[node].transform.world_matrix();
            if let Some(camera) = self.camera_pool.get_mut(*cam_key) {
                camera.update_view(&world);
            }
        }
    }

    // ========================================================================
    // Spatial queries
    // ========================================================================

    /// Cached world-space bounds of `node`, or a fresh computation when the
    /// cache has been invalidated since the last update.
    #[must_use]
    pub fn world_aabb(&self, node: NodeHandle) -> Option<Aabb> {
        if let Some(cached) = self.bounds.get(node) {
            return Some(*cached);
        }
        let n = self.nodes.get(node)?;
        let model = self.model_pool.get(*self.models.get(node)?)?;
        Some(model.world_aabb(n.transform.world_matrix()))
    }

    /// Union of all object bounds, or `None` for an empty scene.
    #[must_use]
    pub fn compute_scene_bounds(&self) -> Option<Aabb> {
        self.models
            .keys()
            .filter_map(|h| self.world_aabb(h))
            .reduce(|a, b| a.union(&b))
    }

    /// Rebuilds the octree over all current object bounds.
    ///
    /// Uses the explicit [`scene_bounds`](Self::scene_bounds) when set,
    /// otherwise the union of object bounds.
    pub fn rebuild_octree(&mut self, config: OctreeConfig) {
        let Some(bounds) = self.scene_bounds.or_else(|| self.compute_scene_bounds()) else {
            self.octree = None;
            return;
        };

        let objects: Vec<(NodeHandle, Aabb)> = self
            .models
            .keys()
            .filter_map(|h| self.world_aabb(h).map(|aabb| (h, aabb)))
            .collect();

        self.octree = Some(Octree::build(config, bounds, &objects));
    }

    /// Drops the octree; culling falls back to a linear scan.
    pub fn clear_octree(&mut self) {
        self.octree = None;
    }

    #[must_use]
    pub fn octree(&self) -> Option<&Octree> {
        self.octree.as_ref()
    }

    /// The active camera component, if one is set and valid.
    #[must_use]
    pub fn active_camera(&self) -> Option<&Camera> {
        let node = self.active_camera?;
        self.camera_pool.get(*self.cameras.get(node)?)
    }

    pub fn active_camera_mut(&mut self) -> Option<&mut Camera> {
        let node = self.active_camera?;
        self.camera_pool.get_mut(*self.cameras.get(node)?)
    }
}
