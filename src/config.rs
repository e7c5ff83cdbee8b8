//! Renderer configuration loaded from TOML
//!
//! ```toml
//! [pyramid]
//! height = 0.5
//! animation_frequency = 2.0
//!
//! [grass]
//! blade_height = 0.8
//! blade_width = 0.05
//!
//! [render]
//! color_format = "rgba8unorm-srgb"
//! frustum_culling = true
//! ```

use crate::error::{Result, SynthesisError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings for pyramid extrusion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PyramidSettings {
    /// Apex height along the triangle normal
    pub height: f32,
    /// Argument to `sin`, multiplied by elapsed seconds
    pub animation_frequency: f32,
    pub cast_shadows: bool,
}

impl Default for PyramidSettings {
    fn default() -> Self {
        Self {
            height: 1.0,
            animation_frequency: 1.0,
            cast_shadows: true,
        }
    }
}

/// Settings for grass blades
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrassSettings {
    pub blade_height: f32,
    pub blade_width: f32,
    /// Minimum growth of the mesh bounds. The blade height and half width
    /// are always covered.
    pub bounds_margin: f32,
    pub cast_shadows: bool,
}

impl Default for GrassSettings {
    fn default() -> Self {
        Self {
            blade_height: 1.0,
            blade_width: 0.1,
            bounds_margin: 1.0,
            cast_shadows: false,
        }
    }
}

/// Render target settings for the draw pipelines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub color_format: String,
    /// `None` or `"none"` disables depth testing
    pub depth_format: Option<String>,
    pub frustum_culling: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            color_format: "bgra8unorm-srgb".to_string(),
            depth_format: Some("depth32float".to_string()),
            frustum_culling: true,
        }
    }
}

impl RenderSettings {
    pub fn color_format(&self) -> Result<wgpu::TextureFormat> {
        parse_texture_format(&self.color_format)
    }

    pub fn depth_format(&self) -> Result<Option<wgpu::TextureFormat>> {
        match self.depth_format.as_deref() {
            None | Some("none") => Ok(None),
            Some(name) => parse_texture_format(name).map(Some),
        }
    }
}

fn parse_texture_format(name: &str) -> Result<wgpu::TextureFormat> {
    use wgpu::TextureFormat as F;
    let format = match name.to_ascii_lowercase().as_str() {
        "bgra8unorm" => F::Bgra8Unorm,
        "bgra8unorm-srgb" => F::Bgra8UnormSrgb,
        "rgba8unorm" => F::Rgba8Unorm,
        "rgba8unorm-srgb" => F::Rgba8UnormSrgb,
        "rgba16float" => F::Rgba16Float,
        "depth32float" => F::Depth32Float,
        "depth24plus" => F::Depth24Plus,
        other => {
            return Err(SynthesisError::Config(format!(
                "unsupported texture format '{}'",
                other
            )))
        }
    };
    Ok(format)
}

/// Top-level renderer configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub pyramid: PyramidSettings,
    pub grass: GrassSettings,
    pub render: RenderSettings,
}

impl RendererConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)
            .map_err(|e| SynthesisError::Config(format!("failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::info!("[RendererConfig] Loading {}", path.display());
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| SynthesisError::Config(format!("failed to serialize TOML: {}", e)))
    }

    /// Reject values that would produce degenerate or infinite geometry
    pub fn validate(&self) -> Result<()> {
        let non_negative = [
            ("pyramid.height", self.pyramid.height),
            ("grass.blade_height", self.grass.blade_height),
            ("grass.blade_width", self.grass.blade_width),
            ("grass.bounds_margin", self.grass.bounds_margin),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(SynthesisError::Config(format!(
                    "{} must be a finite non-negative number, got {}",
                    name, value
                )));
            }
        }
        if !self.pyramid.animation_frequency.is_finite() {
            return Err(SynthesisError::Config(
                "pyramid.animation_frequency must be finite".to_string(),
            ));
        }

        self.render.color_format()?;
        self.render.depth_format()?;
        Ok(())
    }
}
