//! Render Command Queue
//!
//! Settings callbacks run on whichever thread issued the `set`. Work that
//! touches the GPU or the window must not run there; instead callbacks
//! enqueue a [`RenderCommand`] and the application drains the queue on the
//! render thread at the start of each frame.

/// Deferred work for the render thread.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    /// `window.vsync` changed: flip the swap interval.
    SetVsync(bool),
    /// `window.fullscreen` changed: switch the window mode (triggers the
    /// resize path synchronously).
    SetFullscreen(bool),
    /// `graphics.shadow_map_size` changed: drop and reallocate every
    /// per-light depth target.
    RecreateShadowMaps,
    /// Any other `graphics.*` key changed: re-read the snapshot.
    ApplyGraphicsSettings,
    /// `audio.master_volume` changed: forward to the audio collaborator.
    SetMasterVolume(f32),
}

/// Thread-safe producer/consumer pair around the command channel.
pub struct RenderCommandQueue {
    sender: flume::Sender<RenderCommand>,
    receiver: flume::Receiver<RenderCommand>,
}

impl RenderCommandQueue {
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        Self { sender, receiver }
    }

    /// A cloneable sender for settings subscribers.
    #[must_use]
    pub fn sender(&self) -> flume::Sender<RenderCommand> {
        self.sender.clone()
    }

    /// Drains every pending command (render thread only).
    pub fn drain(&self) -> Vec<RenderCommand> {
        self.receiver.try_iter().collect()
    }
}

impl Default for RenderCommandQueue {
    fn default() -> Self {
        Self::new()
    }
}
