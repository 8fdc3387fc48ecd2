/// Named colors shared by the engine surface and the visualizer (RGBA format).
pub const COLOR_MAP: &[(&str, [u8; 4])] = &[
    ("black", [0, 0, 0, 255]),
    ("white", [255, 255, 255, 255]),
    ("red", [255, 0, 0, 255]),
    ("green", [0, 255, 0, 255]),
    ("blue", [0, 0, 255, 255]),
    ("yellow", [255, 255, 0, 255]),
    ("cyan", [0, 255, 255, 255]),
    ("magenta", [255, 0, 255, 255]),
];

/// Looks up a named color. Returns `None` if the name is not recognized;
/// callers decide on a fallback (and log it, since this crate does not).
pub fn lookup_color(color_name: &str) -> Option<[u8; 4]> {
    COLOR_MAP
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(color_name))
        .map(|&(_, color)| color)
}

/// Blends `over` onto `base` with the given opacity in [0, 1].
///
/// The raster backends write opaque pixels, so line opacity is emulated by
/// pre-blending the stroke color toward the background.
pub fn blend(base: [u8; 4], over: [u8; 4], alpha: f32) -> [u8; 4] {
    let a = alpha.clamp(0.0, 1.0);
    let mix = |b: u8, o: u8| (b as f32 + (o as f32 - b as f32) * a).round() as u8;
    [
        mix(base[0], over[0]),
        mix(base[1], over[1]),
        mix(base[2], over[2]),
        255,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_up_named_colors_case_insensitively() {
        assert_eq!(lookup_color("cyan"), Some([0, 255, 255, 255]));
        assert_eq!(lookup_color("CYAN"), Some([0, 255, 255, 255]));
        assert_eq!(lookup_color("chartreuse"), None);
    }

    #[test]
    fn blend_endpoints() {
        let base = [0, 0, 0, 255];
        let over = [0, 255, 255, 255];
        assert_eq!(blend(base, over, 0.0), [0, 0, 0, 255]);
        assert_eq!(blend(base, over, 1.0), [0, 255, 255, 255]);
    }

    #[test]
    fn blend_interpolates_and_clamps() {
        let base = [0, 0, 0, 255];
        let over = [0, 255, 255, 255];
        assert_eq!(blend(base, over, 0.5), [0, 128, 128, 255]);
        assert_eq!(blend(base, over, 2.0), [0, 255, 255, 255]);
        assert_eq!(blend(base, over, -1.0), [0, 0, 0, 255]);
    }
}
