//! Label font selection and text metrics
//!
//! Labels prefer a bold TrueType face, fall back to a second named face and
//! finally to the built-in 8x8 bitmap font, so rendering never fails because
//! a font is missing.

use font8x8::{BASIC_FONTS, UnicodeFonts};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use rusttype::{Font, Scale, point};
use std::fmt;
use std::path::Path;

/// Pixel height of TrueType label text
pub const LABEL_FONT_SIZE: f32 = 14.0;

/// Preferred bold sans-serif face
pub const PREFERRED_FONT: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf";

/// Locations tried for the secondary face (Arial)
pub const SECONDARY_FONTS: &[&str] = &[
    "arial.ttf",
    "/usr/share/fonts/truetype/msttcorefonts/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

const BITMAP_GLYPH_SIZE: i32 = 8;
const BITMAP_SCALE: i32 = 2;

/// Ink bounds of a rendered string relative to the drawing origin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextMetrics {
    pub width: i32,
    pub height: i32,
    pub left: i32,
    pub top: i32,
}

impl TextMetrics {
    fn from_bounds(bounds: Option<(i32, i32, i32, i32)>) -> Self {
        match bounds {
            Some((min_x, min_y, max_x, max_y)) => Self {
                width: max_x - min_x,
                height: max_y - min_y,
                left: min_x,
                top: min_y,
            },
            None => Self { width: 0, height: 0, left: 0, top: 0 },
        }
    }
}

fn union(acc: Option<(i32, i32, i32, i32)>, b: (i32, i32, i32, i32)) -> Option<(i32, i32, i32, i32)> {
    Some(match acc {
        None => b,
        Some(a) => (a.0.min(b.0), a.1.min(b.1), a.2.max(b.2), a.3.max(b.3)),
    })
}

/// Font used for the numbered tags
pub enum LabelFont {
    TrueType { font: Font<'static>, scale: Scale },
    Bitmap { scale: i32 },
}

impl fmt::Debug for LabelFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelFont::TrueType { scale, .. } => f.debug_struct("TrueType").field("size", &scale.y).finish(),
            LabelFont::Bitmap { scale } => f.debug_struct("Bitmap").field("scale", scale).finish(),
        }
    }
}

impl LabelFont {
    /// Preferred face, then the secondary face, then the built-in bitmap font
    pub fn load() -> Self {
        Self::from_candidates(std::iter::once(PREFERRED_FONT).chain(SECONDARY_FONTS.iter().copied()))
    }

    /// First candidate that parses as a font, else the built-in bitmap font
    pub fn from_candidates<I, P>(candidates: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        for candidate in candidates {
            let path = candidate.as_ref();
            match std::fs::read(path).ok().and_then(Font::try_from_vec) {
                Some(font) => {
                    log::debug!("Using label font {}", path.display());
                    return Self::TrueType { font, scale: Scale::uniform(LABEL_FONT_SIZE) };
                }
                None => log::debug!("Label font {} unavailable", path.display()),
            }
        }

        log::debug!("Falling back to built-in bitmap font for labels");
        Self::builtin()
    }

    /// The built-in 8x8 bitmap font
    pub fn builtin() -> Self {
        Self::Bitmap { scale: BITMAP_SCALE }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, LabelFont::Bitmap { .. })
    }

    /// Ink bounds of `text` when drawn with its origin at (0, 0)
    pub fn measure(&self, text: &str) -> TextMetrics {
        match self {
            LabelFont::TrueType { font, scale } => {
                let v_metrics = font.v_metrics(*scale);
                let bounds = font
                    .layout(text, *scale, point(0.0, v_metrics.ascent))
                    .filter_map(|glyph| glyph.pixel_bounding_box())
                    .map(|bb| (bb.min.x, bb.min.y, bb.max.x, bb.max.y))
                    .fold(None, union);
                TextMetrics::from_bounds(bounds)
            }
            LabelFont::Bitmap { scale } => {
                let bounds = bitmap_pixels(text)
                    .map(|(x, y)| (x * scale, y * scale, (x + 1) * scale, (y + 1) * scale))
                    .fold(None, union);
                TextMetrics::from_bounds(bounds)
            }
        }
    }

    /// Draw `text` so that its ink box starts at (x, y)
    pub fn draw(&self, image: &mut RgbaImage, x: i32, y: i32, text: &str, color: Rgba<u8>) {
        let metrics = self.measure(text);
        let origin_x = x - metrics.left;
        let origin_y = y - metrics.top;

        match self {
            LabelFont::TrueType { font, scale } => {
                draw_text_mut(image, color, origin_x, origin_y, *scale, font, text);
            }
            LabelFont::Bitmap { scale } => {
                let (width, height) = (image.width() as i32, image.height() as i32);
                for (gx, gy) in bitmap_pixels(text) {
                    for sy in 0..*scale {
                        for sx in 0..*scale {
                            let px = origin_x + gx * scale + sx;
                            let py = origin_y + gy * scale + sy;
                            if px >= 0 && py >= 0 && px < width && py < height {
                                image.put_pixel(px as u32, py as u32, color);
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Unscaled set pixels of `text` in the 8x8 font, laid out left to right
fn bitmap_pixels(text: &str) -> impl Iterator<Item = (i32, i32)> + '_ {
    text.chars().enumerate().flat_map(|(index, ch)| {
        let glyph = BASIC_FONTS.get(ch).or_else(|| BASIC_FONTS.get('?')).unwrap_or([0; 8]);
        let cursor_x = index as i32 * BITMAP_GLYPH_SIZE;
        glyph.into_iter().enumerate().flat_map(move |(row, bits)| {
            (0..BITMAP_GLYPH_SIZE)
                .filter(move |col| (bits >> col) & 1 == 1)
                .map(move |col| (cursor_x + col, row as i32))
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fonts_fall_back_to_builtin() {
        let font = LabelFont::from_candidates(["/nonexistent/Bold.ttf", "/nonexistent/arial.ttf"]);
        assert!(font.is_builtin());
    }

    #[test]
    fn test_unparseable_font_falls_back() {
        let path = std::env::temp_dir().join("browser-control-not-a-font.ttf");
        std::fs::write(&path, b"definitely not a font").unwrap();

        let font = LabelFont::from_candidates([&path]);
        assert!(font.is_builtin());

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_load_never_panics() {
        let font = LabelFont::load();
        let metrics = font.measure("42");
        assert!(metrics.width > 0);
        assert!(metrics.height > 0);
    }

    #[test]
    fn test_bitmap_metrics_grow_with_digits() {
        let font = LabelFont::builtin();
        let one = font.measure("1");
        let many = font.measure("188");

        assert!(one.width > 0 && one.height > 0);
        assert!(many.width > one.width);
        assert!(many.width <= 3 * BITMAP_GLYPH_SIZE * BITMAP_SCALE);
        assert!(many.height <= BITMAP_GLYPH_SIZE * BITMAP_SCALE);
    }

    #[test]
    fn test_bitmap_draw_stays_in_measured_box() {
        let font = LabelFont::builtin();
        let metrics = font.measure("7");
        let mut image = RgbaImage::from_pixel(40, 40, Rgba([0, 0, 0, 255]));
        let white = Rgba([255, 255, 255, 255]);

        font.draw(&mut image, 5, 6, "7", white);

        for (x, y, pixel) in image.enumerate_pixels() {
            if *pixel == white {
                assert!((5..5 + metrics.width).contains(&(x as i32)));
                assert!((6..6 + metrics.height).contains(&(y as i32)));
            }
        }
        assert!(image.pixels().any(|p| *p == white));
    }

    #[test]
    fn test_empty_text_measures_zero() {
        assert_eq!(LabelFont::builtin().measure("").width, 0);
    }
}
