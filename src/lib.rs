#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod app;
pub mod assets;
pub mod engine;
pub mod errors;
pub mod math;
pub mod particles;
pub mod renderer;
pub mod resources;
pub mod scene;
pub mod settings;
pub mod text;
pub mod ui;
pub mod utils;

pub use app::App;
pub use assets::AssetServer;
pub use engine::Engine;
pub use errors::{LumenError, Result};
pub use math::{Aabb, Containment, Frustum, Plane, Sphere};
pub use particles::{EmitterShape, Gradient, ParticleEmitter, ParticleSystem};
pub use renderer::{GraphicsOptions, RenderPipeline, Renderer};
pub use resources::{Font, Material, Mesh, Model, Texture};
pub use scene::{Camera, Light, Node, Octree, OctreeConfig, Scene, SceneManager};
pub use settings::{Preset, SettingValue, Settings};
pub use ui::UiManager;
pub use utils::Timer;
