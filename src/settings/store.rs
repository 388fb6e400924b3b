use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;

use crate::errors::{LumenError, Result};
use crate::settings::SettingValue;

/// Handle returned by [`Settings::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

type Callback = Box<dyn FnMut(&SettingValue, &SettingValue) + Send>;

struct Subscriber {
    id: SubscriberId,
    path: String,
    callback: Callback,
}

/// The settings store: immutable default tree + persisted user overlay.
///
/// Reads take a short read lock on the tree. Writes take the write lock,
/// release it, and only then fire subscribers, so a callback may read
/// settings freely. Callbacks must not call `set` themselves; the
/// subscriber list is locked while they run.
pub struct Settings {
    tree: RwLock<Tree>,
    subscribers: Mutex<Vec<Subscriber>>,
    next_subscriber: AtomicU64,
    file_path: PathBuf,
}

struct Tree {
    defaults: FxHashMap<String, SettingValue>,
    overlay: FxHashMap<String, SettingValue>,
}

impl Settings {
    /// Creates a store with the built-in default tree and the given
    /// persistence path. Nothing is read from disk until [`load`](Self::load).
    #[must_use]
    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        Self {
            tree: RwLock::new(Tree {
                defaults: default_tree(),
                overlay: FxHashMap::default(),
            }),
            subscribers: Mutex::new(Vec::new()),
            next_subscriber: AtomicU64::new(1),
            file_path: path.into(),
        }
    }

    /// Returns the merged (user over default) value for `path`.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<SettingValue> {
        let tree = self.tree.read();
        tree.overlay
            .get(path)
            .or_else(|| tree.defaults.get(path))
            .cloned()
    }

    /// Returns the merged value, falling back to `default` for unknown paths.
    #[must_use]
    pub fn get_or(&self, path: &str, default: SettingValue) -> SettingValue {
        self.get(path).unwrap_or(default)
    }

    #[must_use]
    pub fn get_bool(&self, path: &str, default: bool) -> bool {
        self.get(path).and_then(|v| v.as_bool()).unwrap_or(default)
    }

    #[must_use]
    pub fn get_int(&self, path: &str, default: i64) -> i64 {
        self.get(path).and_then(|v| v.as_int()).unwrap_or(default)
    }

    #[must_use]
    pub fn get_float(&self, path: &str, default: f64) -> f64 {
        self.get(path).and_then(|v| v.as_float()).unwrap_or(default)
    }

    #[must_use]
    pub fn get_string(&self, path: &str, default: &str) -> String {
        self.get(path)
            .and_then(|v| v.as_str().map(ToString::to_string))
            .unwrap_or_else(|| default.to_string())
    }

    /// Updates `path`, fires subscribers on the exact path in registration
    /// order with `(old, new)`, then optionally persists the whole overlay.
    ///
    /// A persistence failure is logged; the in-memory update and the
    /// notifications are not rolled back.
    pub fn set(&self, path: &str, value: SettingValue, save: bool) {
        let old = {
            let mut tree = self.tree.write();
            let old = tree
                .overlay
                .get(path)
                .or_else(|| tree.defaults.get(path))
                .cloned();
            tree.overlay.insert(path.to_string(), value.clone());
            old
        };

        let old = old.unwrap_or_else(|| value.clone());
        self.notify(path, &old, &value);

        if save {
            if let Err(err) = self.save() {
                log::error!("settings: failed to persist after set({path}): {err}");
            }
        }
    }

    fn notify(&self, path: &str, old: &SettingValue, new: &SettingValue) {
        let mut subscribers = self.subscribers.lock();
        for sub in subscribers.iter_mut() {
            if sub.path == path {
                (sub.callback)(old, new);
            }
        }
    }

    /// Registers a change callback for the exact path.
    pub fn subscribe<F>(&self, path: &str, callback: F) -> SubscriberId
    where
        F: FnMut(&SettingValue, &SettingValue) + Send + 'static,
    {
        let id = SubscriberId(self.next_subscriber.fetch_add(1, Ordering::Relaxed));
        self.subscribers.lock().push(Subscriber {
            id,
            path: path.to_string(),
            callback: Box::new(callback),
        });
        id
    }

    /// Removes a previously registered callback. Unknown handles are ignored.
    pub fn unsubscribe(&self, id: SubscriberId) {
        self.subscribers.lock().retain(|s| s.id != id);
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Loads the user overlay from disk.
    ///
    /// A missing file leaves the overlay empty (defaults apply). A malformed
    /// file falls back to defaults with a diagnostic instead of failing.
    pub fn load(&self) {
        let raw = match fs::read_to_string(&self.file_path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return,
            Err(err) => {
                log::warn!(
                    "settings: cannot read {}: {err}; using defaults",
                    self.file_path.display()
                );
                return;
            }
        };

        match serde_json::from_str::<serde_json::Value>(&raw) {
            Ok(root) => {
                let mut flat = FxHashMap::default();
                flatten_json("", &root, &mut flat);
                self.tree.write().overlay = flat;
            }
            Err(err) => {
                log::warn!(
                    "settings: malformed file {}: {err}; using defaults",
                    self.file_path.display()
                );
            }
        }
    }

    /// Atomically writes the entire user overlay to the persisted file
    /// (temp file + rename).
    pub fn save(&self) -> Result<()> {
        let nested = {
            let tree = self.tree.read();
            nest_overlay(&tree.overlay)
        };
        let body = serde_json::to_string_pretty(&nested)?;

        let tmp = self.file_path.with_extension("json.tmp");
        fs::write(&tmp, body)?;
        fs::rename(&tmp, &self.file_path)?;
        Ok(())
    }

    /// Path of the persisted overlay file.
    #[must_use]
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Verifies that `path` exists in the default tree.
    pub fn validate_path(&self, path: &str) -> Result<()> {
        if self.tree.read().defaults.contains_key(path) {
            Ok(())
        } else {
            Err(LumenError::UnknownSettingsPath(path.to_string()))
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::with_file("settings.json")
    }
}

// ============================================================================
// Flat <-> nested tree conversion
// ============================================================================

fn flatten_json(prefix: &str, value: &serde_json::Value, out: &mut FxHashMap<String, SettingValue>) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_json(&path, child, out);
            }
        }
        serde_json::Value::Bool(b) => {
            out.insert(prefix.to_string(), SettingValue::Bool(*b));
        }
        serde_json::Value::Number(n) => {
            let value = if let Some(i) = n.as_i64() {
                SettingValue::Int(i)
            } else {
                SettingValue::Float(n.as_f64().unwrap_or(0.0))
            };
            out.insert(prefix.to_string(), value);
        }
        serde_json::Value::String(s) => {
            out.insert(prefix.to_string(), SettingValue::Str(s.clone()));
        }
        _ => {
            log::warn!("settings: ignoring unsupported value at {prefix}");
        }
    }
}

fn nest_overlay(flat: &FxHashMap<String, SettingValue>) -> serde_json::Value {
    let mut root = serde_json::Map::new();

    let mut paths: Vec<_> = flat.keys().collect();
    paths.sort();

    for path in paths {
        let value = serde_json::to_value(&flat[path]).unwrap_or(serde_json::Value::Null);
        let mut cursor = &mut root;
        let mut segments = path.split('.').peekable();
        while let Some(segment) = segments.next() {
            if segments.peek().is_none() {
                cursor.insert(segment.to_string(), value);
                break;
            }
            cursor = cursor
                .entry(segment.to_string())
                .or_insert_with(|| serde_json::Value::Object(serde_json::Map::new()))
                .as_object_mut()
                .expect("intermediate settings node is an object");
        }
    }

    serde_json::Value::Object(root)
}

// ============================================================================
// Default tree
// ============================================================================

/// The immutable default tree. Regenerated in memory on every construction;
/// never written to disk.
fn default_tree() -> FxHashMap<String, SettingValue> {
    let mut t = FxHashMap::default();

    t.insert("window.width".into(), SettingValue::Int(1280));
    t.insert("window.height".into(), SettingValue::Int(720));
    t.insert("window.fullscreen".into(), SettingValue::Bool(false));
    t.insert("window.vsync".into(), SettingValue::Bool(true));
    t.insert("window.title".into(), SettingValue::Str("Lumen".into()));

    t.insert("graphics.target_fps".into(), SettingValue::Int(0));
    t.insert("graphics.msaa_samples".into(), SettingValue::Int(4));
    t.insert("graphics.shadows_enabled".into(), SettingValue::Bool(true));
    t.insert("graphics.shadow_map_size".into(), SettingValue::Int(2048));
    t.insert("graphics.bloom".into(), SettingValue::Bool(false));
    t.insert("graphics.bloom_intensity".into(), SettingValue::Float(0.5));
    t.insert("graphics.render_distance".into(), SettingValue::Float(500.0));
    t.insert("graphics.culling_enabled".into(), SettingValue::Bool(true));
    t.insert("graphics.wireframe_mode".into(), SettingValue::Bool(false));
    t.insert("graphics.gamma".into(), SettingValue::Float(2.2));
    t.insert("graphics.anisotropic_filtering".into(), SettingValue::Int(4));
    t.insert(
        "graphics.frustum_culling_enabled".into(),
        SettingValue::Bool(true),
    );
    t.insert("graphics.octree_enabled".into(), SettingValue::Bool(true));
    t.insert("graphics.octree_max_depth".into(), SettingValue::Int(8));
    t.insert(
        "graphics.octree_max_objects_per_node".into(),
        SettingValue::Int(10),
    );

    t.insert("audio.master_volume".into(), SettingValue::Float(1.0));

    t.insert("performance.multithreading".into(), SettingValue::Bool(true));
    t.insert("performance.worker_threads".into(), SettingValue::Int(4));

    t
}
