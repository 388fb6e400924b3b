//! Scene Graph System
//!
//! A hierarchical scene graph organizing 3D objects, cameras and lights,
//! using a component-based layout with `SlotMap` handles:
//!
//! - **Hot data** (hierarchy, transforms) lives directly in [`Node`]
//! - **Dense components** (names, models) use `SecondaryMap`
//! - **Sparse components** (cameras, lights, scripts) use `SparseSecondaryMap`
//!
//! World-space bounds are derived lazily from each node's model and cached
//! per node; the cache is invalidated when the transform or model changes.
//! The optional [`Octree`] indexes those bounds for culling queries and is
//! rebuilt explicitly (on scene-bounds change or on demand), never per frame.
//!
//! # Example
//!
//! ```rust,ignore
//! use lumen::scene::{Scene, Camera, Light};
//!
//! let mut scene = Scene::new();
//!
//! let camera_node = scene.create_node_with_name("MainCamera");
//! scene.set_camera(camera_node, Camera::perspective(60.0, 16.0 / 9.0, 0.1, 100.0));
//! scene.active_camera = Some(camera_node);
//!
//! let sun = scene.create_node_with_name("Sun");
//! scene.set_light(sun, Light::directional(Vec3::ONE, 1.0));
//! ```

pub mod camera;
pub mod light;
pub mod manager;
pub mod node;
pub mod octree;
pub mod scene;
pub mod script;
pub mod transform;

pub use camera::{Camera, Projection, RenderCamera};
pub use light::{Light, LightKind};
pub use manager::{SceneHandle, SceneManager};
pub use node::Node;
pub use octree::{Octree, OctreeConfig, OCTREE_MIN_OBJECTS};
pub use scene::Scene;
pub use script::Script;
pub use transform::Transform;

use slotmap::new_key_type;

new_key_type! {
    /// Strongly-typed handle for scene nodes.
    pub struct NodeHandle;

    /// Handle for models in the scene's model pool.
    pub struct ModelKey;

    /// Handle for cameras in the scene's camera pool.
    pub struct CameraKey;

    /// Handle for lights in the scene's light pool.
    pub struct LightKey;
}
