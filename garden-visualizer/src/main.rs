use anyhow::{Context, Result};
use clap::Parser;
use dashmap::DashMap;
use env_logger::Builder;
use garden_common::color::{blend, lookup_color};
use garden_common::{FrameSnapshot, GardenConfig};
use image::{ImageBuffer, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn, LevelFilter};
use minimp4::Mp4Muxer;
use openh264::encoder::{BitRate, Encoder, EncoderConfig, FrameRate};
use openh264::formats::YUVBuffer;
use palette::{FromColor, Hsv, Srgb};
use rand::prelude::*;
use rayon::prelude::*;
use std::fs::{self, File};
use std::io::{BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Command-line arguments for the visualizer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input snapshot file path (.bin)
    #[arg(short, long)]
    input: PathBuf,

    /// Output video file path (.mp4)
    #[arg(short, long, default_value = "node_garden_video.mp4")]
    output: PathBuf,

    /// Width of the output video in pixels
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Height of the output video in pixels (calculated from aspect ratio if not provided)
    #[arg(long)]
    height: Option<u32>,

    /// Frames per second for the output video
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Optional path to the config.toml file to get exact surface dimensions
    #[arg(long)]
    config: Option<PathBuf>,

    /// Surface width in simulation units (used if config is not provided)
    #[arg(long, default_value_t = 1280.0)]
    surface_width: f32,

    /// Surface height in simulation units (used if config is not provided)
    #[arg(long, default_value_t = 720.0)]
    surface_height: f32,

    /// Node color - use "palette" for per-node colors, or a specific color name
    /// (black, white, red, green, blue, yellow, cyan, magenta)
    #[arg(long, default_value = "palette")]
    node_color: String,

    /// Connection line color - name of the color for proximity lines
    #[arg(long, default_value = "cyan")]
    line_color: String,

    /// Background color - name of the color for the background
    #[arg(long, default_value = "black")]
    bg_color: String,

    /// Chunk size for parallel frame rendering
    #[arg(long, default_value_t = 10)]
    chunk_size: usize,
}

// Struct to represent a video frame
struct Frame {
    index: usize,
    image: RgbaImage,
}

/// Parse a color name to RGBA values, defaulting to black.
fn parse_color(color_name: &str) -> [u8; 4] {
    lookup_color(color_name).unwrap_or_else(|| {
        warn!("Color '{}' not recognized, using black.", color_name);
        [0, 0, 0, 255]
    })
}

/// Generate a color palette with a specified number of colors
fn generate_color_palette(count: usize) -> Vec<[u8; 4]> {
    let mut colors = Vec::with_capacity(count);
    let mut rng = rand::rng();

    for i in 0..count {
        // Use HSV color space for better distribution
        let hue = (i as f32) / (count as f32);
        let saturation = 0.7 + rng.random_range(-0.1..0.1);
        let value = 0.8 + rng.random_range(-0.1..0.1);

        let hsv = Hsv::new(hue * 360.0, saturation, value);
        let rgb = Srgb::from_color(hsv);

        colors.push([
            (rgb.red * 255.0) as u8,
            (rgb.green * 255.0) as u8,
            (rgb.blue * 255.0) as u8,
            255,
        ]);
    }

    // Shuffle the colors to make adjacent indices less similar
    colors.shuffle(&mut rng);

    colors
}

/// Draw one snapshot as a video frame: proximity lines first (opacity from
/// the edge weight), then the nodes on top.
fn draw_frame(
    snapshot: &FrameSnapshot,
    frame_index: usize,
    width: u32,
    height: u32,
    pixels_per_unit: f32,
    bg_color: [u8; 4],
    line_color: [u8; 4],
    color_palette: &[[u8; 4]],
) -> Frame {
    let mut image = ImageBuffer::from_pixel(width, height, Rgba(bg_color));

    let to_px = |(x, y): (f32, f32)| (x * pixels_per_unit, y * pixels_per_unit);

    if let Some(edges) = &snapshot.edges {
        for edge in edges {
            let a = snapshot.positions.get(edge.a as usize);
            let b = snapshot.positions.get(edge.b as usize);
            if let (Some(&a), Some(&b)) = (a, b) {
                // Blend toward the background in proportion to the weight so
                // near-threshold pairs fade out
                let color = blend(bg_color, line_color, edge.weight);
                draw_line_segment_mut(&mut image, to_px(a), to_px(b), Rgba(color));
            }
        }
    }

    for (i, &(x, y)) in snapshot.positions.iter().enumerate() {
        let px = (x * pixels_per_unit).round() as i32;
        let py = (y * pixels_per_unit).round() as i32;

        // Only draw if within bounds
        if px >= 0 && px < width as i32 && py >= 0 && py < height as i32 {
            let radius = snapshot.radii.get(i).copied().unwrap_or(2.0);
            let radius_px = ((radius * pixels_per_unit).round() as i32).max(1);
            let color = color_palette[i % color_palette.len()];
            draw_filled_circle_mut(&mut image, (px, py), radius_px, Rgba(color));
        }
    }

    Frame { index: frame_index, image }
}

/// RGB to YUV 4:2:0 conversion for video encoding (BT.601)
fn rgb_to_yuv420(image: &RgbaImage) -> Vec<u8> {
    let width = image.width() as usize;
    let height = image.height() as usize;

    // Y plane is full size, U and V are quarter size
    let y_plane_size = width * height;
    let mut yuv = vec![0u8; y_plane_size + y_plane_size / 2];

    for y in 0..height {
        for x in 0..width {
            let pixel = image.get_pixel(x as u32, y as u32);
            let (r, g, b) = (pixel[0] as f32, pixel[1] as f32, pixel[2] as f32);
            yuv[y * width + x] = (0.299 * r + 0.587 * g + 0.114 * b).round() as u8;
        }
    }

    // U and V planes are downsampled by 2 in each dimension: average each 2x2 block
    let u_plane_offset = y_plane_size;
    let v_plane_offset = y_plane_size + y_plane_size / 4;
    let uv_width = width / 2;

    for y in (0..height).step_by(2) {
        for x in (0..width).step_by(2) {
            let mut sum_u = 0f32;
            let mut sum_v = 0f32;
            let mut count = 0;

            for dy in 0..2 {
                for dx in 0..2 {
                    if y + dy < height && x + dx < width {
                        let pixel = image.get_pixel((x + dx) as u32, (y + dy) as u32);
                        let (r, g, b) = (pixel[0] as f32, pixel[1] as f32, pixel[2] as f32);
                        sum_u += -0.169 * r - 0.331 * g + 0.5 * b + 128.0;
                        sum_v += 0.5 * r - 0.419 * g - 0.081 * b + 128.0;
                        count += 1;
                    }
                }
            }

            let uv_idx = (y / 2) * uv_width + x / 2;
            yuv[u_plane_offset + uv_idx] = (sum_u / count as f32).round() as u8;
            yuv[v_plane_offset + uv_idx] = (sum_v / count as f32).round() as u8;
        }
    }

    yuv
}

/// Reads all snapshots from a bincode file: a u32 count header followed by
/// each snapshot in sequence.
fn read_snapshots(path: &PathBuf) -> Result<Vec<FrameSnapshot>> {
    let input_file =
        File::open(path).with_context(|| format!("Failed to open input file: {}", path.display()))?;
    let mut reader = BufReader::new(input_file);

    let snapshot_count: u32 = bincode::deserialize_from(&mut reader)
        .context("Failed to read snapshot count from header")?;
    info!("Found {} snapshots in the file", snapshot_count);

    let mut snapshots = Vec::with_capacity(snapshot_count as usize);
    for i in 0..snapshot_count {
        let snapshot: FrameSnapshot = bincode::deserialize_from(&mut reader)
            .with_context(|| format!("Failed to deserialize snapshot {}", i))?;
        snapshots.push(snapshot);
    }

    Ok(snapshots)
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logger
    Builder::from_default_env().filter(None, LevelFilter::Info).init();

    info!("Starting Node Garden Visualizer...");
    info!("Input file: {}", args.input.display());
    info!("Output video: {}", args.output.display());

    // --- Determine Surface Dimensions ---
    let (surface_width, surface_height) = if let Some(config_path) = &args.config {
        match GardenConfig::load(config_path) {
            Ok(config) => {
                info!("Loaded surface dimensions from {}", config_path.display());
                (config.surface.width, config.surface.height)
            }
            Err(e) => {
                warn!(
                    "Failed to load config file '{}': {}. Using default/provided dimensions.",
                    config_path.display(),
                    e
                );
                (args.surface_width, args.surface_height)
            }
        }
    } else {
        (args.surface_width, args.surface_height)
    };

    info!("Surface size: {:.1} x {:.1} units", surface_width, surface_height);

    // --- Calculate Output Dimensions and Scale ---
    let output_width_px = args.width;
    let aspect_ratio = surface_width / surface_height;
    let output_height_px = args
        .height
        .unwrap_or_else(|| (output_width_px as f32 / aspect_ratio) as u32);

    // Use the smaller scale so everything fits
    let scale_x = output_width_px as f32 / surface_width;
    let scale_y = output_height_px as f32 / surface_height;
    let pixels_per_unit = scale_x.min(scale_y);

    info!("Output video dimensions: {}x{} px", output_width_px, output_height_px);
    info!("Scale: {:.4} pixels per unit", pixels_per_unit);

    // --- Read Snapshots ---
    let snapshots = read_snapshots(&args.input)?;
    if snapshots.is_empty() {
        warn!("Input file contains no snapshots. Exiting.");
        return Ok(());
    }

    let snapshots_with_edges = snapshots.iter().filter(|s| s.edges.is_some()).count();
    if snapshots_with_edges == 0 {
        warn!("No snapshots contain edge data; the video will show nodes only.");
        warn!("Enable save_edges_in_snapshot in the engine config to record connections.");
    }

    // --- Set up Colors ---
    let bg_color = parse_color(&args.bg_color);
    let line_color = parse_color(&args.line_color);

    let particle_count = snapshots[0].particle_count as usize;
    let color_palette: Vec<[u8; 4]> = if args.node_color.eq_ignore_ascii_case("palette") {
        info!("Using color palette mode for node coloring");
        generate_color_palette(particle_count.max(1))
    } else {
        let single_color = parse_color(&args.node_color);
        info!("Using single color for all nodes: {:?}", single_color);
        vec![single_color]
    };

    // --- Render Frames in Parallel ---
    let progress_bar = ProgressBar::new(snapshots.len() as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} frames ({percent}%) [{eta}]")
            .expect("Invalid progress bar template")
            .progress_chars("#>-"),
    );
    progress_bar.set_message("Rendering frames");

    let start_time = Instant::now();
    let frames_map: Arc<DashMap<usize, RgbaImage>> = Arc::new(DashMap::new());

    snapshots
        .par_chunks(args.chunk_size)
        .enumerate()
        .for_each(|(chunk_idx, chunk)| {
            let start_idx = chunk_idx * args.chunk_size;
            for (i, snapshot) in chunk.iter().enumerate() {
                let frame = draw_frame(
                    snapshot,
                    start_idx + i,
                    output_width_px,
                    output_height_px,
                    pixels_per_unit,
                    bg_color,
                    line_color,
                    &color_palette,
                );
                frames_map.insert(frame.index, frame.image);
            }
            progress_bar.inc(chunk.len() as u64);
        });

    progress_bar.finish_with_message(format!("Rendered {} frames", frames_map.len()));

    // --- Encode Frames in Order ---
    info!("Setting up video encoder...");
    let mut encoder = Encoder::with_api_config(
        openh264::OpenH264API::from_source(),
        EncoderConfig::new()
            .max_frame_rate(FrameRate::from_hz(args.fps as f32))
            .bitrate(BitRate::from_bps(5_000_000)),
    )
    .context("Failed to initialize H.264 encoder")?;

    let encode_progress = ProgressBar::new(frames_map.len() as u64);
    encode_progress.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.green/blue}] {pos}/{len} encoded ({percent}%) [{eta}]")
            .expect("Invalid progress bar template")
            .progress_chars("#>-"),
    );
    encode_progress.set_message("Encoding frames");

    let mut sorted_keys: Vec<_> = frames_map.iter().map(|entry| *entry.key()).collect();
    sorted_keys.sort_unstable();

    // Convert batches to YUV in parallel, then encode sequentially to keep
    // the bitstream in frame order
    const ENCODE_BATCH_SIZE: usize = 30;
    let mut h264_data = Vec::new();
    let mut frame_count = 0usize;

    for batch in sorted_keys.chunks(ENCODE_BATCH_SIZE) {
        let yuv_frames: Vec<_> = batch
            .par_iter()
            .filter_map(|&key| frames_map.remove(&key).map(|(_, image)| (key, rgb_to_yuv420(&image))))
            .collect();

        for (key, yuv_data) in yuv_frames {
            let yuv_source =
                YUVBuffer::from_vec(yuv_data, output_width_px as usize, output_height_px as usize);
            let bitstream = encoder
                .encode(&yuv_source)
                .with_context(|| format!("Failed to encode frame {}", key))?;
            bitstream.write_vec(&mut h264_data);
            frame_count += 1;
            encode_progress.inc(1);
        }
    }

    encode_progress.finish_with_message(format!("Encoded {} frames successfully", frame_count));

    // --- Mux into MP4 ---
    info!("Creating MP4 file...");
    let mut video_buffer = Cursor::new(Vec::new());
    let mut mp4muxer = Mp4Muxer::new(&mut video_buffer);

    let video_description = format!("Node garden - {} particles", particle_count);
    mp4muxer.init_video(output_width_px as i32, output_height_px as i32, false, &video_description);
    mp4muxer.write_video(&h264_data);
    mp4muxer.close();

    video_buffer.seek(SeekFrom::Start(0))?;
    let mut video_bytes = Vec::new();
    video_buffer.read_to_end(&mut video_bytes)?;

    fs::write(&args.output, &video_bytes)
        .with_context(|| format!("Failed to write video file to {}", args.output.display()))?;

    let duration = start_time.elapsed();
    info!(
        "Video generation completed in {:.2?} ({:.1} frames per second)",
        duration,
        frame_count as f64 / duration.as_secs_f64()
    );
    info!("Output saved to: {}", args.output.display());

    Ok(())
}

// Unit tests
#[cfg(test)]
mod tests {
    use super::*;
    use garden_common::Edge;

    fn test_snapshot() -> FrameSnapshot {
        FrameSnapshot {
            frame: 0,
            particle_count: 3,
            positions: vec![(0.0, 0.0), (50.0, 0.0), (200.0, 0.0)],
            radii: vec![3.0, 3.0, 3.0],
            edges: Some(vec![Edge { a: 0, b: 1, weight: 0.5 }]),
        }
    }

    #[test]
    fn palette_has_requested_size() {
        assert_eq!(generate_color_palette(7).len(), 7);
    }

    #[test]
    fn draw_frame_marks_node_and_edge_pixels() {
        let snapshot = test_snapshot();
        let bg = [0, 0, 0, 255];
        let line = [0, 255, 255, 255];
        let frame = draw_frame(&snapshot, 0, 256, 256, 1.0, bg, line, &[[255, 255, 255, 255]]);

        assert_eq!(frame.index, 0);
        // Node at (50, 0) drawn in the node color
        assert_eq!(frame.image.get_pixel(50, 0).0, [255, 255, 255, 255]);
        // Edge midpoint blended at weight 0.5
        assert_eq!(frame.image.get_pixel(25, 0).0, [0, 128, 128, 255]);
        // Far corner untouched
        assert_eq!(frame.image.get_pixel(255, 255).0, bg);
    }

    #[test]
    fn yuv_buffer_has_420_layout() {
        let image = RgbaImage::from_pixel(16, 16, Rgba([255, 255, 255, 255]));
        let yuv = rgb_to_yuv420(&image);
        assert_eq!(yuv.len(), 16 * 16 + (16 * 16) / 2);
        // White is full luma, neutral chroma
        assert_eq!(yuv[0], 255);
        assert_eq!(yuv[16 * 16], 128);
    }
}
