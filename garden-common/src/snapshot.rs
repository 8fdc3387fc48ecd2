use serde::{Deserialize, Serialize};

/// A proximity-graph edge between two particles, identified by their indices
/// in the particle collection. `weight` is `1 - dist / max_connect_dist`, so
/// closer pairs carry weights nearer to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub a: u32,
    pub b: u32,
    pub weight: f32,
}

/// A snapshot of the particle field at a specific frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameSnapshot {
    /// The frame number at which the snapshot was taken.
    pub frame: u32,
    /// The total number of particles in the field.
    pub particle_count: u32,
    /// Raw [x, y] positions of all particles at the snapshot frame.
    pub positions: Vec<(f32, f32)>,
    /// Radius of each particle, indexed the same as `positions`.
    pub radii: Vec<f32>,
    /// Proximity-graph edges at the snapshot frame.
    /// Included only if `config.output.save_edges_in_snapshot` is true.
    #[serde(skip_serializing_if = "Option::is_none")] // Don't write "edges": null
    pub edges: Option<Vec<Edge>>,
}
