use crate::particle::{spawn_particles, Particle};
use crate::surface::Surface;
use anyhow::Result;
use garden_common::{wrap, Edge, FieldParams, FrameSnapshot, GardenConfig};
use log::debug;
use rand::prelude::*;

/// Manages the particle field: per-frame motion with edge wraparound, the
/// proximity-graph rendering pass, and snapshot recording.
pub struct NodeGarden {
    /// The garden configuration, including the seed and output settings.
    config: GardenConfig,
    /// Runtime parameters derived from the configuration.
    params: FieldParams,
    /// The particle collection. Fixed size; replaced only as a whole.
    particles: Vec<Particle>,
    /// The current frame number.
    current_frame: u32,
    /// Stores collected frame snapshots at record intervals.
    recorded_snapshots: Vec<FrameSnapshot>,
}

impl NodeGarden {
    /// Creates a new `NodeGarden`, seeding the RNG and spawning the initial
    /// particle collection.
    pub fn new(config: GardenConfig) -> Result<Self> {
        let params = config.get_field_params();
        let mut rng = StdRng::seed_from_u64(config.initial_conditions.seed);
        let particles = spawn_particles(params.particle_count, &params, &mut rng)?;

        Ok(Self {
            config,
            params,
            particles,
            current_frame: 0,
            recorded_snapshots: Vec::new(),
        })
    }

    /// Advances the field by one frame and draws it onto `surface`.
    ///
    /// For every particle in collection order: add velocity to position, wrap
    /// each axis independently against the surface bounds, draw the filled
    /// circle, then test against every particle with a larger index so each
    /// unordered pair is checked exactly once per frame. Pairs strictly closer
    /// than `max_connect_dist` get a line with weight `1 - dist / max_dist`.
    ///
    /// After this returns, every particle's x lies in [0, width] and y in
    /// [0, height].
    pub fn step(&mut self, surface: &mut dyn Surface) -> Result<()> {
        surface.clear();

        let width = self.params.surface_width;
        let height = self.params.surface_height;
        let max_dist = self.params.max_connect_dist;
        let count = self.particles.len();

        for i in 0..count {
            let (pos, radius) = {
                let p = &mut self.particles[i];
                p.pos.x = wrap(p.pos.x + p.vel.x, 0.0, width);
                p.pos.y = wrap(p.pos.y + p.vel.y, 0.0, height);
                (p.pos, p.radius)
            };

            surface.fill_circle(pos, radius);

            for j in (i + 1)..count {
                let other = self.particles[j].pos;
                let dist = pos.distance(other);
                if dist < max_dist {
                    surface.stroke_line(pos, other, 1.0 - dist / max_dist);
                }
            }
        }

        self.current_frame += 1;
        Ok(())
    }

    /// Computes the proximity-graph edges over the current positions, using
    /// the same strict-threshold, each-pair-once scan as the render pass.
    pub fn connections(&self) -> Vec<Edge> {
        let max_dist = self.params.max_connect_dist;
        let count = self.particles.len();
        let mut edges = Vec::new();

        for i in 0..count {
            for j in (i + 1)..count {
                let dist = self.particles[i].pos.distance(self.particles[j].pos);
                if dist < max_dist {
                    edges.push(Edge {
                        a: i as u32,
                        b: j as u32,
                        weight: 1.0 - dist / max_dist,
                    });
                }
            }
        }

        edges
    }

    /// Records a snapshot of the current field state.
    pub fn record_snapshot(&mut self) {
        debug!("Recording snapshot at frame {}...", self.current_frame);

        let edges = if self.config.output.save_edges_in_snapshot {
            Some(self.connections())
        } else {
            None
        };

        self.recorded_snapshots.push(FrameSnapshot {
            frame: self.current_frame,
            particle_count: self.particles.len() as u32,
            positions: self.particles.iter().map(|p| (p.pos.x, p.pos.y)).collect(),
            radii: self.particles.iter().map(|p| p.radius).collect(),
            edges,
        });
    }

    /// Final particle positions and radii, e.g. for CSV output.
    pub fn get_results(&self) -> Vec<(f32, f32, f32)> {
        self.particles
            .iter()
            .map(|p| (p.pos.x, p.pos.y, p.radius))
            .collect()
    }

    pub fn recorded_snapshots(&self) -> &Vec<FrameSnapshot> {
        &self.recorded_snapshots
    }

    pub fn particle_count(&self) -> u32 {
        self.particles.len() as u32
    }

    pub fn params(&self) -> &FieldParams {
        &self.params
    }

    pub fn config(&self) -> &GardenConfig {
        &self.config
    }

    #[cfg(test)]
    pub(crate) fn with_particles(config: GardenConfig, particles: Vec<Particle>) -> Self {
        let params = config.get_field_params();
        Self {
            config,
            params,
            particles,
            current_frame: 0,
            recorded_snapshots: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use garden_common::{
        FieldConfig, InitialConditions, OutputConfig, SurfaceConfig, TimingConfig, Vec2,
    };

    /// A surface that records drawing calls instead of rasterizing them.
    struct RecordingSurface {
        width: f32,
        height: f32,
        clears: u32,
        circles: Vec<(Vec2, f32)>,
        lines: Vec<(Vec2, Vec2, f32)>,
    }

    impl RecordingSurface {
        fn new(width: f32, height: f32) -> Self {
            Self { width, height, clears: 0, circles: Vec::new(), lines: Vec::new() }
        }
    }

    impl Surface for RecordingSurface {
        fn width(&self) -> f32 {
            self.width
        }
        fn height(&self) -> f32 {
            self.height
        }
        fn clear(&mut self) {
            self.clears += 1;
        }
        fn fill_circle(&mut self, center: Vec2, radius: f32) {
            self.circles.push((center, radius));
        }
        fn stroke_line(&mut self, from: Vec2, to: Vec2, weight: f32) {
            self.lines.push((from, to, weight));
        }
    }

    fn test_config(width: f32, height: f32, max_connect_dist: f32) -> GardenConfig {
        GardenConfig {
            surface: SurfaceConfig { width, height },
            field: FieldConfig {
                particle_count: 0,
                max_connect_dist,
                max_radius: 8.0,
                max_velocity: 4.0,
            },
            timing: TimingConfig { fps: 0, total_frames: 1, record_interval_frames: 1 },
            initial_conditions: InitialConditions { seed: 42 },
            output: OutputConfig {
                base_filename: "test".to_string(),
                save_snapshots: false,
                save_edges_in_snapshot: true,
                save_final_positions: false,
                format: None,
                save_frames: false,
                frame_dir: None,
                background_color: "black".to_string(),
                fill_color: "white".to_string(),
                stroke_color: "cyan".to_string(),
            },
        }
    }

    fn still_particle(x: f32, y: f32) -> Particle {
        Particle { pos: Vec2::new(x, y), vel: Vec2::zero(), radius: 3.0 }
    }

    #[test]
    fn step_clears_and_draws_every_particle() {
        let config = test_config(100.0, 100.0, 10.0);
        let particles = vec![still_particle(10.0, 10.0), still_particle(50.0, 50.0)];
        let mut garden = NodeGarden::with_particles(config, particles);
        let mut surface = RecordingSurface::new(100.0, 100.0);

        garden.step(&mut surface).unwrap();

        assert_eq!(surface.clears, 1);
        assert_eq!(surface.circles.len(), 2);
    }

    #[test]
    fn positions_stay_within_bounds_after_step() {
        let config = test_config(200.0, 150.0, 10.0);
        let mut garden = NodeGarden::new({
            let mut c = config;
            c.field.particle_count = 100;
            c
        })
        .unwrap();
        let mut surface = RecordingSurface::new(200.0, 150.0);

        for _ in 0..10 {
            garden.step(&mut surface).unwrap();
            for &(x, y, _) in &garden.get_results() {
                assert!((0.0..=200.0).contains(&x), "x out of bounds: {}", x);
                assert!((0.0..=150.0).contains(&y), "y out of bounds: {}", y);
            }
        }
    }

    #[test]
    fn exiting_the_right_edge_wraps_to_zero() {
        let config = test_config(100.0, 100.0, 10.0);
        let particle = Particle {
            pos: Vec2::new(99.5, 50.0),
            vel: Vec2::new(1.5, 0.0), // lands at 101.0, past the edge
            radius: 3.0,
        };
        let mut garden = NodeGarden::with_particles(config, vec![particle]);
        let mut surface = RecordingSurface::new(100.0, 100.0);

        garden.step(&mut surface).unwrap();

        let (x, y, _) = garden.get_results()[0];
        assert_eq!(x, 0.0); // wrapped, not clamped to 100.0
        assert_eq!(y, 50.0);
    }

    #[test]
    fn landing_exactly_on_the_edge_does_not_wrap() {
        let config = test_config(100.0, 100.0, 10.0);
        let particle = Particle {
            pos: Vec2::new(99.0, 50.0),
            vel: Vec2::new(1.0, 0.0), // lands at exactly 100.0
            radius: 3.0,
        };
        let mut garden = NodeGarden::with_particles(config, vec![particle]);
        let mut surface = RecordingSurface::new(100.0, 100.0);

        garden.step(&mut surface).unwrap();

        assert_eq!(garden.get_results()[0].0, 100.0);
    }

    #[test]
    fn connects_only_pairs_strictly_within_threshold() {
        // Distances: (0,1) = 50, (0,2) = 200, (1,2) = 150.
        let config = test_config(1000.0, 1000.0, 100.0);
        let particles = vec![
            still_particle(0.0, 0.0),
            still_particle(50.0, 0.0),
            still_particle(200.0, 0.0),
        ];
        let mut garden = NodeGarden::with_particles(config, particles);
        let mut surface = RecordingSurface::new(1000.0, 1000.0);

        garden.step(&mut surface).unwrap();

        assert_eq!(surface.lines.len(), 1);
        let (from, to, weight) = surface.lines[0];
        assert_eq!(from, Vec2::new(0.0, 0.0));
        assert_eq!(to, Vec2::new(50.0, 0.0));
        assert_eq!(weight, 0.5);

        let edges = garden.connections();
        assert_eq!(edges.len(), 1);
        assert_eq!((edges[0].a, edges[0].b), (0, 1));
        assert_eq!(edges[0].weight, 0.5);
    }

    #[test]
    fn pair_exactly_at_threshold_is_not_connected() {
        let config = test_config(1000.0, 1000.0, 100.0);
        let particles = vec![still_particle(0.0, 0.0), still_particle(100.0, 0.0)];
        let garden = NodeGarden::with_particles(config, particles);
        assert!(garden.connections().is_empty());
    }

    #[test]
    fn coincident_pair_connects_with_weight_one() {
        let config = test_config(1000.0, 1000.0, 100.0);
        let particles = vec![still_particle(10.0, 10.0), still_particle(10.0, 10.0)];
        let garden = NodeGarden::with_particles(config, particles);
        let edges = garden.connections();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].weight, 1.0);
    }

    #[test]
    fn each_unordered_pair_is_tested_exactly_once() {
        // Four mutually close particles: C(4, 2) = 6 lines, no duplicates.
        let config = test_config(1000.0, 1000.0, 100.0);
        let particles = vec![
            still_particle(0.0, 0.0),
            still_particle(10.0, 0.0),
            still_particle(0.0, 10.0),
            still_particle(10.0, 10.0),
        ];
        let mut garden = NodeGarden::with_particles(config, particles);
        let mut surface = RecordingSurface::new(1000.0, 1000.0);

        garden.step(&mut surface).unwrap();

        assert_eq!(surface.lines.len(), 6);
        let edges = garden.connections();
        assert_eq!(edges.len(), 6);
        for edge in &edges {
            assert!(edge.a < edge.b, "edges must be emitted with a < b");
        }
    }

    #[test]
    fn snapshot_captures_positions_and_edges() {
        let config = test_config(1000.0, 1000.0, 100.0);
        let particles = vec![still_particle(0.0, 0.0), still_particle(50.0, 0.0)];
        let mut garden = NodeGarden::with_particles(config, particles);

        garden.record_snapshot();

        let snapshots = garden.recorded_snapshots();
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].frame, 0);
        assert_eq!(snapshots[0].particle_count, 2);
        assert_eq!(snapshots[0].positions, vec![(0.0, 0.0), (50.0, 0.0)]);
        assert_eq!(snapshots[0].radii.len(), 2);
        assert_eq!(snapshots[0].edges.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn same_seed_reproduces_the_same_field() {
        let mut config = test_config(100.0, 100.0, 10.0);
        config.field.particle_count = 20;
        let a = NodeGarden::new(config.clone()).unwrap();
        let b = NodeGarden::new(config).unwrap();
        assert_eq!(a.particle_count(), 20);
        assert_eq!(a.get_results(), b.get_results());
    }
}
