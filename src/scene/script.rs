use crate::scene::{NodeHandle, Scene};

/// Behavior attached to a scene node.
///
/// Scripts run at the start of [`Scene::update`], before particle emitters
/// and the transform pass, so any transform they write lands in the same
/// frame. Scripts added from inside `update` take effect next frame.
pub trait Script: Send {
    /// Called once per frame with the owning node and mutable scene access.
    fn update(&mut self, node: NodeHandle, scene: &mut Scene, dt: f32);
}
