use garden_common::color::blend;
use garden_common::Vec2;
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};

/// The drawing collaborator the simulation renders through each frame.
///
/// `stroke_line` takes a weight in [0, 1]; a weight of 0 must draw nothing
/// (the proximity graph emits zero-weight lines for pairs exactly at the
/// connection threshold).
pub trait Surface {
    fn width(&self) -> f32;
    fn height(&self) -> f32;
    fn clear(&mut self);
    fn fill_circle(&mut self, center: Vec2, radius: f32);
    fn stroke_line(&mut self, from: Vec2, to: Vec2, weight: f32);
}

/// An `RgbaImage`-backed surface rendered with imageproc primitives.
///
/// imageproc writes opaque pixels, so line weight is rendered as opacity by
/// pre-blending the stroke color toward the background.
pub struct ImageSurface {
    image: RgbaImage,
    background: [u8; 4],
    fill: [u8; 4],
    stroke: [u8; 4],
}

impl ImageSurface {
    pub fn new(width: u32, height: u32, background: [u8; 4], fill: [u8; 4], stroke: [u8; 4]) -> Self {
        let image = RgbaImage::from_pixel(width, height, Rgba(background));
        Self { image, background, fill, stroke }
    }

    /// The rendered frame, e.g. for saving as a PNG.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}

impl Surface for ImageSurface {
    fn width(&self) -> f32 {
        self.image.width() as f32
    }

    fn height(&self) -> f32 {
        self.image.height() as f32
    }

    fn clear(&mut self) {
        for pixel in self.image.pixels_mut() {
            *pixel = Rgba(self.background);
        }
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32) {
        draw_filled_circle_mut(
            &mut self.image,
            (center.x.round() as i32, center.y.round() as i32),
            radius.round() as i32,
            Rgba(self.fill),
        );
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, weight: f32) {
        if weight <= 0.0 {
            return;
        }
        let color = blend(self.background, self.stroke, weight);
        draw_line_segment_mut(&mut self.image, (from.x, from.y), (to.x, to.y), Rgba(color));
    }
}
