use anyhow::{Context, Result};
use log::{info, trace, warn};
use std::fs::File;
use std::io::Write;
use std::time::Instant;

// Define modules used by main
mod driver;
mod garden;
mod particle;
mod surface;

use driver::{FrameDriver, Tick};
use garden::NodeGarden;
use garden_common::color::lookup_color;
use garden_common::{FrameSnapshot, GardenConfig};
use surface::ImageSurface;

fn main() -> Result<()> {
    // Initialize the logger
    env_logger::init();

    info!("Starting Node Garden...");

    // --- Load Configuration ---
    let config = GardenConfig::load("config.toml")?;

    let background = parse_color(&config.output.background_color);
    let fill = parse_color(&config.output.fill_color);
    let stroke = parse_color(&config.output.stroke_color);

    let save_snapshots = config.output.save_snapshots;
    let save_frames = config.output.save_frames;
    let frame_dir = config.output.frame_dir.clone().unwrap_or_else(|| "frames".to_string());

    // --- Initialize Field ---
    info!("Initializing particle field...");
    let mut garden = NodeGarden::new(config)?;
    info!("Field initialized with {} particles.", garden.particle_count());

    let params = garden.params().clone();
    let total_frames = params.total_frames;
    let record_interval = params.record_interval_frames;
    info!(
        "Running {} frames at {} fps, recording a snapshot every {} frame(s).",
        total_frames, params.fps, record_interval
    );

    let mut surface = ImageSurface::new(
        params.surface_width.ceil() as u32,
        params.surface_height.ceil() as u32,
        background,
        fill,
        stroke,
    );

    if save_frames {
        std::fs::create_dir_all(&frame_dir)
            .with_context(|| format!("Failed to create frame directory '{}'", frame_dir))?;
    }

    // --- Frame Loop ---
    let mut driver = FrameDriver::new(params.fps);
    let start_time = Instant::now();
    let mut previous_print_time = start_time;

    // Initial snapshot (frame 0, before any motion)
    garden.record_snapshot();

    let frames_run = driver.run(|frame| {
        let frame_start = Instant::now();
        garden.step(&mut surface)?;
        let frame_duration = frame_start.elapsed();

        let is_record_frame = (frame + 1) % record_interval == 0;
        let is_last_frame = frame + 1 >= total_frames;

        if save_frames {
            let path = format!("{}/frame_{:05}.png", frame_dir, frame);
            surface
                .image()
                .save(&path)
                .with_context(|| format!("Failed to save frame image '{}'", path))?;
        }

        // Print status periodically, and always on record frames
        let now = Instant::now();
        let should_print_status = now.duration_since(previous_print_time).as_secs_f64() >= 5.0;

        if should_print_status || is_record_frame || is_last_frame {
            info!(
                "Frame [{}/{}] | Particles: {} | Frame Time: {:6.2} ms | Elapsed: {:.2} s",
                frame + 1,
                total_frames,
                garden.particle_count(),
                frame_duration.as_secs_f64() * 1000.0,
                start_time.elapsed().as_secs_f64()
            );
            previous_print_time = now;

            // --- Record Snapshot ---
            if is_record_frame || is_last_frame {
                garden.record_snapshot();
            }
        } else {
            trace!(
                "Frame [{}/{}] completed in {:.2} ms",
                frame + 1,
                total_frames,
                frame_duration.as_secs_f64() * 1000.0
            );
        }

        Ok(if is_last_frame { Tick::Stop } else { Tick::Continue })
    })?;

    let total_duration = start_time.elapsed();
    info!(
        "Ran {} frames in {:.3} seconds ({:.1} fps effective).",
        frames_run,
        total_duration.as_secs_f64(),
        frames_run as f64 / total_duration.as_secs_f64()
    );

    // --- Save Recorded Data ---
    if save_snapshots {
        save_recorded_snapshots(garden.config(), garden.recorded_snapshots())?;
    } else {
        info!("Skipping saving snapshots as per config (save_snapshots is false).");
    }

    // Save final positions if requested (separate from full snapshots)
    if garden.config().output.save_final_positions {
        let filename = format!("{}_final_positions.csv", garden.config().output.base_filename);
        let mut writer = csv::Writer::from_path(&filename)
            .with_context(|| format!("Failed to create CSV file '{}'", filename))?;
        writer.write_record(["x", "y", "r"])?;
        for (x, y, r) in garden.get_results() {
            writer.write_record(&[format!("{:.4}", x), format!("{:.4}", y), format!("{:.4}", r)])?;
        }
        writer.flush()?;
        info!("Final positions saved to {}", filename);
    } else {
        info!("Skipping saving final positions as per config.");
    }

    info!("Node Garden complete.");
    Ok(())
}

/// Looks up a named color, falling back to black with a warning.
fn parse_color(color_name: &str) -> [u8; 4] {
    lookup_color(color_name).unwrap_or_else(|| {
        warn!("Color '{}' not recognized, using black.", color_name);
        [0, 0, 0, 255]
    })
}

/// Writes the recorded snapshots in the configured output format.
///
/// The bincode format is a u32 snapshot count followed by each snapshot in
/// sequence, so consumers can stream them without loading the whole file.
fn save_recorded_snapshots(config: &GardenConfig, snapshots: &[FrameSnapshot]) -> Result<()> {
    info!("Saving {} recorded snapshots...", snapshots.len());
    let format = config.output.format.as_deref().unwrap_or("json");
    let base = &config.output.base_filename;

    match format {
        "bincode" => {
            let filename = format!("{}_snapshots.bin", base);
            let mut file = File::create(&filename)
                .with_context(|| format!("Failed to create snapshot file '{}'", filename))?;
            bincode::serialize_into(&mut file, &(snapshots.len() as u32))?;
            for snapshot in snapshots {
                bincode::serialize_into(&mut file, snapshot)?;
            }
            info!("All snapshots saved to {} (binary format)", filename);
        }
        "messagepack" => {
            let filename = format!("{}_snapshots.msgpack", base);
            let mut file = File::create(&filename)
                .with_context(|| format!("Failed to create snapshot file '{}'", filename))?;
            rmp_serde::encode::write(&mut file, snapshots)
                .context("Failed to serialize snapshots to MessagePack")?;
            info!("All snapshots saved to {} (MessagePack format)", filename);
        }
        other => {
            if other != "json" {
                warn!("Unknown output format: {}. Using JSON instead.", other);
            }
            let filename = format!("{}_snapshots.json", base);
            let json_string =
                serde_json::to_string(snapshots).context("Failed to serialize snapshots to JSON")?;
            let mut file = File::create(&filename)
                .with_context(|| format!("Failed to create snapshot file '{}'", filename))?;
            file.write_all(json_string.as_bytes())
                .with_context(|| format!("Failed to write snapshot JSON to '{}'", filename))?;
            info!("All snapshots saved to {}", filename);
        }
    }

    Ok(())
}
