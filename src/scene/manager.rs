use slotmap::{SlotMap, new_key_type};

use crate::scene::Scene;

new_key_type! {
    /// Handle for scenes owned by the [`SceneManager`].
    pub struct SceneHandle;
}

/// Owns every loaded scene and tracks the one the frame pipeline draws.
///
/// An application typically keeps several scenes alive at once (a menu, a
/// loading screen, the game world) and switches between them; the manager
/// guarantees the active handle never dangles. The first scene inserted
/// becomes active automatically, and removing the active scene falls back
/// to the most recently inserted survivor.
pub struct SceneManager {
    scenes: SlotMap<SceneHandle, Scene>,
    /// Insertion order, oldest first; drives the fallback on removal.
    inserted: Vec<SceneHandle>,
    active: Option<SceneHandle>,
}

impl SceneManager {
    #[must_use]
    pub fn new() -> Self {
        Self {
            scenes: SlotMap::with_key(),
            inserted: Vec::new(),
            active: None,
        }
    }

    /// Takes ownership of a built scene. The first insertion becomes the
    /// active scene; later ones wait for [`activate`](Self::activate).
    pub fn insert(&mut self, scene: Scene) -> SceneHandle {
        let handle = self.scenes.insert(scene);
        self.inserted.push(handle);
        if self.active.is_none() {
            self.active = Some(handle);
        }
        handle
    }

    /// Inserts an empty scene, activates it, and hands it back for
    /// population.
    pub fn insert_active(&mut self) -> &mut Scene {
        let handle = self.insert(Scene::new());
        self.active = Some(handle);
        &mut self.scenes[handle]
    }

    /// Switches which scene the pipeline draws. A stale handle leaves the
    /// current scene active and returns `false`.
    pub fn activate(&mut self, handle: SceneHandle) -> bool {
        if self.scenes.contains_key(handle) {
            self.active = Some(handle);
            true
        } else {
            log::error!("scene manager: cannot activate a removed scene");
            false
        }
    }

    /// Removes a scene and returns it. When the active scene is removed
    /// the most recently inserted survivor takes over, so the engine is
    /// never left pointing at a dead handle.
    pub fn remove(&mut self, handle: SceneHandle) -> Option<Scene> {
        let scene = self.scenes.remove(handle)?;
        self.inserted.retain(|h| *h != handle);

        if self.active == Some(handle) {
            self.active = self.inserted.last().copied();
            if self.active.is_some() {
                log::info!("scene manager: active scene removed; falling back");
            } else {
                log::warn!("scene manager: no scenes left to draw");
            }
        }
        Some(scene)
    }

    #[must_use]
    pub fn active_handle(&self) -> Option<SceneHandle> {
        self.active
    }

    #[must_use]
    pub fn active(&self) -> Option<&Scene> {
        self.scenes.get(self.active?)
    }

    pub fn active_mut(&mut self) -> Option<&mut Scene> {
        self.scenes.get_mut(self.active?)
    }

    #[must_use]
    pub fn get(&self, handle: SceneHandle) -> Option<&Scene> {
        self.scenes.get(handle)
    }

    pub fn get_mut(&mut self, handle: SceneHandle) -> Option<&mut Scene> {
        self.scenes.get_mut(handle)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Handles of every loaded scene, in insertion order.
    pub fn handles(&self) -> impl Iterator<Item = SceneHandle> + '_ {
        self.inserted.iter().copied()
    }
}

impl Default for SceneManager {
    fn default() -> Self {
        Self::new()
    }
}
