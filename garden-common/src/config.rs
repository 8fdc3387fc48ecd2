use crate::field_params::FieldParams;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Offset added to the configured radius range: radii fall in
/// [RADIUS_OFFSET, max_radius + RADIUS_OFFSET).
pub const RADIUS_OFFSET: f32 = 2.0;

// Configuration for the drawing surface
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct SurfaceConfig {
    pub width: f32,
    pub height: f32,
}

// Configuration for the particle field
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct FieldConfig {
    pub particle_count: u32,
    pub max_connect_dist: f32,
    pub max_radius: f32,
    pub max_velocity: f32,
}

// Configuration for timing
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct TimingConfig {
    /// Target frames per second. 0 means unpaced (run as fast as possible).
    pub fps: u32,
    pub total_frames: u32,
    pub record_interval_frames: u32,
}

// Initial conditions for the field, loaded from config.toml
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct InitialConditions {
    pub seed: u64,
}

// Configuration for output settings, loaded from config.toml
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct OutputConfig {
    pub base_filename: String,
    pub save_snapshots: bool,
    pub save_edges_in_snapshot: bool,
    pub save_final_positions: bool,
    pub format: Option<String>, // Snapshot format: "json", "bincode", "messagepack"
    #[serde(default)]
    pub save_frames: bool, // Dump each rendered frame as a PNG
    #[serde(default)]
    pub frame_dir: Option<String>,
    #[serde(default = "default_background_color")]
    pub background_color: String,
    #[serde(default = "default_fill_color")]
    pub fill_color: String,
    #[serde(default = "default_stroke_color")]
    pub stroke_color: String,
}

fn default_background_color() -> String {
    "black".to_string()
}

fn default_fill_color() -> String {
    "white".to_string()
}

fn default_stroke_color() -> String {
    "cyan".to_string()
}

// Main garden configuration structure, loaded from config.toml.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct GardenConfig {
    pub surface: SurfaceConfig,
    pub field: FieldConfig,
    pub timing: TimingConfig,
    pub initial_conditions: InitialConditions,
    pub output: OutputConfig,
}

impl GardenConfig {
    /// Loads the garden configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();

        let config_str = std::fs::read_to_string(path_ref)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path_ref.display(), e))?;
        Self::from_toml_str(&config_str)
            .map_err(|e| anyhow::anyhow!("Invalid config '{}': {}", path_ref.display(), e))
    }

    /// Parses and validates a configuration from a TOML string.
    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        let config: GardenConfig = toml::from_str(config_str)
            .map_err(|e| anyhow::anyhow!("Failed to parse TOML: {}", e))?;

        if config.surface.width <= 0.0 || config.surface.height <= 0.0 {
            anyhow::bail!("surface width and height must be positive.");
        }
        if config.field.max_connect_dist < 0.0 {
            anyhow::bail!("max_connect_dist must not be negative.");
        }
        if config.field.max_radius <= 0.0 {
            anyhow::bail!("max_radius must be positive.");
        }
        if config.field.max_velocity <= 0.0 {
            anyhow::bail!("max_velocity must be positive.");
        }
        if config.timing.total_frames == 0 {
            anyhow::bail!("total_frames must be greater than 0.");
        }

        Ok(config)
    }

    /// Converts the configuration into the runtime parameters used each frame.
    pub fn get_field_params(&self) -> FieldParams {
        FieldParams {
            surface_width: self.surface.width,
            surface_height: self.surface.height,
            particle_count: self.field.particle_count,
            max_connect_dist: self.field.max_connect_dist,
            radius_min: RADIUS_OFFSET,
            radius_max: self.field.max_radius + RADIUS_OFFSET,
            velocity_half_range: self.field.max_velocity * 0.5,
            fps: self.timing.fps,
            total_frames: self.timing.total_frames,
            record_interval_frames: self.timing.record_interval_frames.max(1),
        }
    }
}
