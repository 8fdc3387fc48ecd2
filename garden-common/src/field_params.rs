use serde::{Deserialize, Serialize};

/// Runtime parameters derived from the configuration, used every frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldParams {
    // Surface bounds (also the wrap bounds)
    pub surface_width: f32,
    pub surface_height: f32,

    // Field
    pub particle_count: u32,
    /// Pairs strictly closer than this are connected by a line.
    pub max_connect_dist: f32,
    /// Radii are drawn uniformly from [radius_min, radius_max).
    pub radius_min: f32,
    pub radius_max: f32,
    /// Velocity components are drawn uniformly from
    /// [-velocity_half_range, velocity_half_range) per axis.
    pub velocity_half_range: f32,

    // Timing
    pub fps: u32,
    pub total_frames: u32,
    pub record_interval_frames: u32,
}
