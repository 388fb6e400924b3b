//! Settings Subsystem
//!
//! A typed key-path configuration tree with change notifications.
//!
//! Keys are addressed by dot paths (`"graphics.msaa_samples"`). Every key has
//! a typed default; user values form an overlay that is persisted as a nested
//! JSON tree. Subscribers registered on a path are invoked with `(old, new)`
//! in registration order after each [`Settings::set`], outside of any lock,
//! which lets the renderer react to live changes (shadow-map resize, MSAA,
//! vsync) without polling.
//!
//! # Example
//!
//! ```rust,ignore
//! let settings = Settings::with_file("settings.json");
//! settings.load();
//!
//! settings.subscribe("graphics.shadow_map_size", |old, new| {
//!     log::info!("shadow map size {old:?} -> {new:?}");
//! });
//! settings.set("graphics.shadow_map_size", 4096.into(), true);
//! ```

pub mod presets;
pub mod store;
pub mod value;

pub use presets::Preset;
pub use store::{Settings, SubscriberId};
pub use value::SettingValue;
