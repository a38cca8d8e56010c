//! Hologram overlay settings: user-tunable visual parameters.
//!
//! Every field is optional on input and filled from the documented default.
//! Out-of-range values are rejected (not clamped) by `validate()`; type
//! mismatches are rejected at deserialization.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

fn default_size() -> f64 {
    0.3
}
fn default_position() -> f64 {
    0.5
}
fn default_glow_intensity() -> f64 {
    0.7
}
fn default_flicker_intensity() -> f64 {
    0.3
}
fn default_true() -> bool {
    true
}
fn default_rotation_angle() -> f64 {
    0.0
}
fn default_transparency() -> f64 {
    0.7
}

/// Visual parameters for the hologram overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct HologramSettings {
    /// Overlay size as a fraction of the base video dimensions, in (0, 1].
    #[serde(default = "default_size")]
    #[validate(range(exclusive_min = 0.0, max = 1.0))]
    pub size: f64,

    /// Horizontal anchor within the base frame, 0.0 = left, 1.0 = right.
    #[serde(default = "default_position")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub position_x: f64,

    /// Vertical anchor within the base frame, 0.0 = top, 1.0 = bottom.
    #[serde(default = "default_position")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub position_y: f64,

    /// Halo strength; 0 disables the glow stage entirely.
    #[serde(default = "default_glow_intensity")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub glow_intensity: f64,

    /// Opacity attenuation strength; 0 disables the flicker stage.
    #[serde(default = "default_flicker_intensity")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub flicker_intensity: f64,

    /// Draw horizontal translucent scanlines over the overlay.
    #[serde(default = "default_true")]
    pub scanlines: bool,

    /// Shift the overlay color balance toward blue.
    #[serde(default = "default_true")]
    pub blue_tint: bool,

    /// Accepted and persisted, in degrees. Not rendered into the filter
    /// graph; the composited overlay is never rotated.
    #[serde(default = "default_rotation_angle")]
    #[validate(range(min = -45.0, max = 45.0))]
    pub rotation_angle: f64,

    /// Uniform alpha multiplier applied to the overlay, in [0, 1].
    #[serde(default = "default_transparency")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub transparency: f64,
}

impl Default for HologramSettings {
    fn default() -> Self {
        HologramSettings {
            size: default_size(),
            position_x: default_position(),
            position_y: default_position(),
            glow_intensity: default_glow_intensity(),
            flicker_intensity: default_flicker_intensity(),
            scanlines: true,
            blue_tint: true,
            rotation_angle: default_rotation_angle(),
            transparency: default_transparency(),
        }
    }
}
