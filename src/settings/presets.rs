use std::str::FromStr;

use crate::errors::LumenError;
use crate::settings::{SettingValue, Settings};

/// Named graphics quality bundle.
///
/// Applying a preset is equivalent to a sequence of `set(.., save=false)`
/// calls (each firing its subscribers) followed by a single `save()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Low,
    Medium,
    High,
    Ultra,
}

impl Preset {
    fn bundle(self) -> &'static [(&'static str, SettingValue)] {
        match self {
            Preset::Low => &[
                ("graphics.msaa_samples", SettingValue::Int(0)),
                ("graphics.shadows_enabled", SettingValue::Bool(false)),
                ("graphics.shadow_map_size", SettingValue::Int(512)),
                ("graphics.bloom", SettingValue::Bool(false)),
                ("graphics.render_distance", SettingValue::Float(150.0)),
                ("graphics.anisotropic_filtering", SettingValue::Int(1)),
            ],
            Preset::Medium => &[
                ("graphics.msaa_samples", SettingValue::Int(2)),
                ("graphics.shadows_enabled", SettingValue::Bool(true)),
                ("graphics.shadow_map_size", SettingValue::Int(1024)),
                ("graphics.bloom", SettingValue::Bool(false)),
                ("graphics.render_distance", SettingValue::Float(300.0)),
                ("graphics.anisotropic_filtering", SettingValue::Int(4)),
            ],
            Preset::High => &[
                ("graphics.msaa_samples", SettingValue::Int(4)),
                ("graphics.shadows_enabled", SettingValue::Bool(true)),
                ("graphics.shadow_map_size", SettingValue::Int(2048)),
                ("graphics.bloom", SettingValue::Bool(true)),
                ("graphics.render_distance", SettingValue::Float(500.0)),
                ("graphics.anisotropic_filtering", SettingValue::Int(8)),
            ],
            Preset::Ultra => &[
                ("graphics.msaa_samples", SettingValue::Int(8)),
                ("graphics.shadows_enabled", SettingValue::Bool(true)),
                ("graphics.shadow_map_size", SettingValue::Int(4096)),
                ("graphics.bloom", SettingValue::Bool(true)),
                ("graphics.render_distance", SettingValue::Float(1000.0)),
                ("graphics.anisotropic_filtering", SettingValue::Int(16)),
            ],
        }
    }

    /// Applies every key of the bundle, then persists once.
    pub fn apply(self, settings: &Settings) {
        for (path, value) in self.bundle() {
            settings.set(path, value.clone(), false);
        }
        if let Err(err) = settings.save() {
            log::error!("settings: failed to persist preset {self:?}: {err}");
        }
    }
}

impl FromStr for Preset {
    type Err = LumenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Preset::Low),
            "medium" => Ok(Preset::Medium),
            "high" => Ok(Preset::High),
            "ultra" => Ok(Preset::Ultra),
            other => Err(LumenError::UnknownPreset(other.to_string())),
        }
    }
}
