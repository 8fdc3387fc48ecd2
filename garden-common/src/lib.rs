pub mod color;
pub mod config;
pub mod field_params;
pub mod snapshot;
pub mod vecmath;

// Re-export key types for easier use by dependent crates
pub use config::{
    FieldConfig, GardenConfig, InitialConditions, OutputConfig, SurfaceConfig, TimingConfig,
};
pub use field_params::FieldParams;
pub use snapshot::{Edge, FrameSnapshot};
pub use vecmath::{wrap, Vec2};
