use glam::Vec3;
use uuid::Uuid;

/// Light component on a scene node.
///
/// Position and direction come from the owning node's world transform
/// (direction is the node's -Z forward). The light's [`Uuid`] keys its
/// shadow map in the renderer, so identity survives shadow-map
/// reconfiguration.
///
/// A light has a shadow map iff shadows are enabled globally
/// (`graphics.shadows_enabled`) and `cast_shadows` is set on the light.
#[derive(Debug, Clone)]
pub struct Light {
    pub uuid: Uuid,
    pub color: Vec3,
    pub intensity: f32,
    pub kind: LightKind,
    pub cast_shadows: bool,
}

#[derive(Debug, Clone)]
pub enum LightKind {
    Directional,
    Point {
        /// Attenuation radius
        range: f32,
    },
    Spot {
        range: f32,
        /// Inner cone half-angle in radians (full intensity inside)
        inner_cone: f32,
        /// Outer cone half-angle in radians (zero intensity outside)
        outer_cone: f32,
    },
}

impl Light {
    #[must_use]
    pub fn directional(color: Vec3, intensity: f32) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            color,
            intensity,
            kind: LightKind::Directional,
            cast_shadows: false,
        }
    }

    #[must_use]
    pub fn point(color: Vec3, intensity: f32, range: f32) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            color,
            intensity,
            kind: LightKind::Point { range },
            cast_shadows: false,
        }
    }

    #[must_use]
    pub fn spot(color: Vec3, intensity: f32, range: f32, inner_cone: f32, outer_cone: f32) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            color,
            intensity,
            kind: LightKind::Spot {
                range,
                inner_cone,
                outer_cone,
            },
            cast_shadows: false,
        }
    }

    #[must_use]
    pub fn with_shadows(mut self) -> Self {
        self.cast_shadows = true;
        self
    }
}
