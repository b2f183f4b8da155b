use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{Result, VisualiserError};

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub search: SearchConfig,
    pub scene: SceneConfig,
}

impl AppConfig {
    /// Parses a JSON document. Missing sections and fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rejects values the frame loop cannot work with.
    pub fn validate(&self) -> Result<()> {
        let particles = &self.scene.particles;
        if particles.count == 0 {
            return Err(VisualiserError::Config(
                "particle count must be at least one".into(),
            ));
        }
        let [min, max] = particles.velocity_range;
        if !(min > 0.0 && min <= max) {
            return Err(VisualiserError::Config(format!(
                "velocity range [{min}, {max}] must be positive and ordered"
            )));
        }
        if particles.respawn_height <= 0.0 {
            return Err(VisualiserError::Config(
                "respawn height must be positive".into(),
            ));
        }
        if particles.spread <= 0.0 {
            return Err(VisualiserError::Config("particle spread must be positive".into()));
        }
        if self.scene.disc.radius <= 0.0 {
            return Err(VisualiserError::Config("disc radius must be positive".into()));
        }
        let damping = self.scene.camera.damping;
        if !(damping > 0.0 && damping <= 1.0) {
            return Err(VisualiserError::Config(format!(
                "camera damping {damping} must lie in (0, 1]"
            )));
        }
        Ok(())
    }
}

/// Search behaviour: debounce, filtering and the catalogue endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub debounce_ms: u64,
    pub min_query_length: usize,
    pub max_results: usize,
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            min_query_length: 1,
            max_results: 12,
            endpoint: "https://api.deezer.com/search".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub background_size: f32,
    pub particles: ParticleConfig,
    pub disc: DiscConfig,
    pub tunnel: TunnelConfig,
    pub camera: CameraConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            background_size: 100.0,
            particles: ParticleConfig::default(),
            disc: DiscConfig::default(),
            tunnel: TunnelConfig::default(),
            camera: CameraConfig::default(),
        }
    }
}

/// Falling petal field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    pub count: usize,
    pub size: f32,
    pub velocity_range: [f32; 2],
    pub respawn_height: f32,
    /// Width of the square the particles are scattered over on x and z.
    pub spread: f32,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            count: 1000,
            size: 0.5,
            velocity_range: [0.01, 0.03],
            respawn_height: 50.0,
            spread: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscConfig {
    pub radius: f32,
    pub segments: u32,
    /// Radians added to the disc rotation on every tick while audio plays.
    pub rotation_step: f32,
}

impl Default for DiscConfig {
    fn default() -> Self {
        Self {
            radius: 2.0,
            segments: 32,
            rotation_step: 0.02,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TunnelConfig {
    pub speed: f32,
    pub length: f32,
    pub displacement_scale: f32,
}

impl Default for TunnelConfig {
    fn default() -> Self {
        Self {
            speed: 0.15,
            length: 2.0,
            displacement_scale: 0.4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub position: [f32; 3],
    pub damping: f32,
    pub viewport: [u32; 2],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            position: [0.0, 0.0, 20.0],
            damping: 0.05,
            viewport: [1280, 720],
        }
    }
}
